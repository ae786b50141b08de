//! Per-sender counts, message lengths and weekday profiles.
//!
//! Every function borrows the canonical table and returns a fresh summary
//! table. Rows without a resolved sender are left out of per-sender groupings.

use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ChatStatsError, Result};
use crate::models::{CanonicalTable, SenderCount, SenderLength, WeekdayCount};

/// Weekday names in reporting order
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Messages per sender, most active first.
///
/// Senders with equal counts keep the order in which they first appear.
#[must_use]
pub fn message_count(table: &CanonicalTable) -> Vec<SenderCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (sender, _) in table.attributed() {
        let count = counts.entry(sender).or_insert_with(|| {
            order.push(sender);
            0
        });
        *count += 1;
    }

    let mut result: Vec<SenderCount> = order
        .into_iter()
        .map(|sender| SenderCount {
            sender_name: sender.to_string(),
            count: counts[sender],
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Mean message length per sender, longest first.
///
/// Messages without text are measured as the placeholder `"None"`, i.e. four
/// characters. This mirrors how the dashboard has always computed the figure.
pub fn average_message_length(table: &CanonicalTable) -> Result<Vec<SenderLength>> {
    table.require_text("average_message_length")?;

    let mut sums: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (sender, message) in table.attributed() {
        let entry = sums.entry(sender).or_default();
        entry.0 += message.text_or_placeholder().chars().count();
        entry.1 += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let mut result: Vec<SenderLength> = sums
        .into_iter()
        .map(|(sender, (total, rows))| SenderLength {
            sender_name: sender.to_string(),
            length: total as f64 / rows as f64,
        })
        .collect();
    result.sort_by(|a, b| b.length.total_cmp(&a.length));
    Ok(result)
}

/// Messages per weekday, Monday through Sunday.
///
/// With `user`, only that sender's messages count. Weekdays without messages
/// are reported as zero; a selection with no messages at all yields no rows.
#[must_use]
pub fn weekly_activity(table: &CanonicalTable, user: Option<&str>) -> Vec<WeekdayCount> {
    let user = user.filter(|u| !u.is_empty());
    let mut counts = [0usize; 7];
    let mut total = 0usize;

    for message in table.messages() {
        if user.is_some_and(|u| message.sender() != Some(u)) {
            continue;
        }
        counts[message.timestamp.weekday().num_days_from_monday() as usize] += 1;
        total += 1;
    }

    if total == 0 {
        return Vec::new();
    }

    WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(weekday, count)| WeekdayCount {
            weekday: (*weekday).to_string(),
            count,
        })
        .collect()
}

/// Distinct resolved sender names, sorted; feeds the dashboard's user picker
#[must_use]
pub fn participants(table: &CanonicalTable) -> Vec<String> {
    let mut names: Vec<String> = table.attributed().map(|(sender, _)| sender.to_string()).collect();
    names.sort();
    names.dedup();
    names
}

/// The first `n` names of a [`message_count`] result
#[must_use]
pub fn top_senders(counts: &[SenderCount], n: usize) -> Vec<String> {
    counts.iter().take(n).map(|c| c.sender_name.clone()).collect()
}

/// Sender with the highest value; the first one wins ties.
pub(crate) fn arg_max<'a, T>(
    rows: impl IntoIterator<Item = &'a T>,
    sender: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> usize,
    what: &str,
) -> Result<String>
where
    T: 'a,
{
    let mut best: Option<&T> = None;
    for row in rows {
        if best.map_or(true, |b| value(row) > value(b)) {
            best = Some(row);
        }
    }
    best.map(|row| sender(row).to_string())
        .ok_or_else(|| ChatStatsError::EmptySelection(what.to_string()))
}

/// Sender with the most messages
pub fn most_active_sender(counts: &[SenderCount]) -> Result<String> {
    arg_max(counts, |c| c.sender_name.as_str(), |c| c.count, "no messages with a known sender")
}
