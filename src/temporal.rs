//! Monthly activity bucketing.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::models::{CanonicalTable, MonthCount, UserMonthCount};

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Month containing `timestamp`
    #[must_use]
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// The following month
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every month from `self` to `end`, both included
    pub fn through(self, end: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |m| Some(m.succ())).take_while(move |m| *m <= end)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Whose activity `message_activity` breaks out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSelection {
    /// Group-wide totals only
    Group,
    /// Every sender in the table
    All,
    /// The listed senders, whether or not they wrote anything
    Only(Vec<String>),
}

/// Result of [`message_activity`]; the shape depends on the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActivityTable {
    /// One row per month
    Group(Vec<MonthCount>),
    /// One row per (user, month), gap-filled
    PerUser(Vec<UserMonthCount>),
}

/// Monthly message counts.
///
/// For [`UserSelection::Group`] only months that have messages appear. For
/// per-user selections every month between the first and the last message of
/// the whole table is reported for every user, with zero for silent months.
#[must_use]
pub fn message_activity(table: &CanonicalTable, users: &UserSelection) -> ActivityTable {
    let users: Vec<&str> = match users {
        UserSelection::Group => return ActivityTable::Group(group_activity(table)),
        UserSelection::All => {
            let mut seen = BTreeSet::new();
            table
                .attributed()
                .map(|(sender, _)| sender)
                .filter(|sender| seen.insert(*sender))
                .collect()
        }
        UserSelection::Only(names) => names.iter().map(String::as_str).collect(),
    };

    let months: Vec<YearMonth> = match month_bounds(table) {
        Some((first, last)) => first.through(last).collect(),
        None => return ActivityTable::PerUser(Vec::new()),
    };

    let mut counts: HashMap<(&str, YearMonth), usize> = HashMap::new();
    for (sender, message) in table.attributed() {
        *counts.entry((sender, YearMonth::of(&message.timestamp))).or_default() += 1;
    }

    let (counts, months) = (&counts, &months);
    let records = users
        .iter()
        .flat_map(|user| {
            months.iter().map(move |month| UserMonthCount {
                month_year: month.to_string(),
                user: (*user).to_string(),
                message_count: counts.get(&(*user, *month)).copied().unwrap_or(0),
            })
        })
        .collect();

    ActivityTable::PerUser(records)
}

fn group_activity(table: &CanonicalTable) -> Vec<MonthCount> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for message in table.messages() {
        *counts.entry(YearMonth::of(&message.timestamp)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(month, message_count)| MonthCount {
            month_year: month.to_string(),
            message_count,
        })
        .collect()
}

fn month_bounds(table: &CanonicalTable) -> Option<(YearMonth, YearMonth)> {
    let first = table.messages().iter().map(|m| m.timestamp).min()?;
    let last = table.messages().iter().map(|m| m.timestamp).max()?;
    Some((YearMonth::of(&first), YearMonth::of(&last)))
}

/// Month x sender counts in long form, for stacked charts.
///
/// Users are listed by name, months chronologically. Only months in which
/// someone wrote appear; within those, every active sender gets a row.
#[must_use]
pub fn message_activity_stack(table: &CanonicalTable) -> Vec<UserMonthCount> {
    let mut counts: HashMap<(&str, YearMonth), usize> = HashMap::new();
    let mut users = BTreeSet::new();
    let mut months = BTreeSet::new();
    for (sender, message) in table.attributed() {
        let month = YearMonth::of(&message.timestamp);
        users.insert(sender);
        months.insert(month);
        *counts.entry((sender, month)).or_default() += 1;
    }

    let (counts, months) = (&counts, &months);
    users
        .iter()
        .flat_map(|user| {
            months.iter().map(move |month| UserMonthCount {
                month_year: month.to_string(),
                user: (*user).to_string(),
                message_count: counts.get(&(*user, *month)).copied().unwrap_or(0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth { year, month }
    }

    #[test]
    fn test_year_month_range_crosses_year() {
        let months: Vec<String> = ym(2023, 11).through(ym(2024, 2)).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_year_month_single() {
        assert_eq!(ym(2024, 5).through(ym(2024, 5)).count(), 1);
        assert_eq!(ym(2024, 6).through(ym(2024, 5)).count(), 0);
    }
}
