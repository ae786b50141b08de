//! Media type and link distribution per sender.

use regex::RegexBuilder;
use std::collections::BTreeMap;

use crate::aggregate::arg_max;
use crate::error::Result;
use crate::models::{CanonicalTable, LinkCount, MessageKind, TypeCount};

/// Messages per (sender, media category), sorted by sender then category.
///
/// Type codes outside the known categories are skipped entirely.
#[must_use]
pub fn message_type_distribution(table: &CanonicalTable) -> Vec<TypeCount> {
    let mut counts: BTreeMap<(&str, MessageKind), usize> = BTreeMap::new();
    for (sender, message) in table.attributed() {
        if let Some(kind) = message.kind() {
            *counts.entry((sender, kind)).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((sender, kind), count)| TypeCount {
            sender_name: sender.to_string(),
            message_type_label: kind,
            count,
        })
        .collect()
}

/// Messages containing an `http://` or `https://` link, per sender
pub fn count_link_messages(table: &CanonicalTable) -> Result<Vec<LinkCount>> {
    table.require_text("count_link_messages")?;
    let link = RegexBuilder::new(r"https?://").case_insensitive(true).build()?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (sender, message) in table.attributed() {
        let has_link = message.text_data.as_deref().is_some_and(|text| link.is_match(text));
        *counts.entry(sender).or_default() += usize::from(has_link);
    }

    Ok(counts
        .into_iter()
        .map(|(sender, link_message_count)| LinkCount {
            sender_name: sender.to_string(),
            link_message_count,
        })
        .collect())
}

/// Sender with the most messages of `kind`
pub fn top_sender_for_kind(distribution: &[TypeCount], kind: MessageKind) -> Result<String> {
    arg_max(
        distribution.iter().filter(|row| row.message_type_label == kind),
        |row| row.sender_name.as_str(),
        |row| row.count,
        &format!("no {} messages", kind.label()),
    )
}

/// Sender with the most link messages
pub fn top_link_sender(links: &[LinkCount]) -> Result<String> {
    arg_max(
        links,
        |row| row.sender_name.as_str(),
        |row| row.link_message_count,
        "no link counts",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatStatsError;
    use crate::models::Message;
    use chrono::NaiveDate;

    fn message(sender: &str, code: &str, text: Option<&str>) -> Message {
        Message {
            sender_name: Some(sender.to_string()),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 5)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
            message_type: code.to_string(),
            text_data: text.map(str::to_string),
            sentiment: None,
            score: None,
        }
    }

    fn table() -> CanonicalTable {
        CanonicalTable::new(
            vec![
                message("Bob", "1", None),
                message("Ana", "13", None),
                message("Ana", "1", None),
                message("Ana", "20", None),
                message("Bob", "0", Some("see HTTPS://example.org")),
                message("Bob", "0", Some("and http://a.b http://c.d")),
                message("Ana", "0", Some("no links, just https")),
                message("Bob", "99", None),
            ],
            true,
            false,
        )
    }

    #[test]
    fn test_type_distribution_skips_unknown_codes() {
        let dist = message_type_distribution(&table());
        let flat: Vec<(&str, &str, usize)> = dist
            .iter()
            .map(|r| (r.sender_name.as_str(), r.message_type_label.label(), r.count))
            .collect();
        assert_eq!(
            flat,
            vec![("Ana", "image", 2), ("Ana", "sticker", 1), ("Bob", "image", 1)]
        );
    }

    #[test]
    fn test_link_messages_counted_once_per_message() {
        let links = count_link_messages(&table()).unwrap();
        assert_eq!(links[0].sender_name, "Ana");
        assert_eq!(links[0].link_message_count, 0);
        assert_eq!(links[1].sender_name, "Bob");
        assert_eq!(links[1].link_message_count, 2);
    }

    #[test]
    fn test_top_senders() {
        let table = table();
        let dist = message_type_distribution(&table);
        assert_eq!(top_sender_for_kind(&dist, MessageKind::Image).unwrap(), "Ana");
        assert!(matches!(
            top_sender_for_kind(&dist, MessageKind::Map),
            Err(ChatStatsError::EmptySelection(_))
        ));
        assert_eq!(top_link_sender(&count_link_messages(&table).unwrap()).unwrap(), "Bob");
    }
}
