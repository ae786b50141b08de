//! Raw export rows to canonical table.

use chrono::DateTime;
use tracing::{debug, info, warn};

use crate::config::GroupConfig;
use crate::error::{ChatStatsError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{CanonicalTable, Message, RawMessage, RawTable, Sentiment, OTHER_SENDER};

/// Resolves sender identifiers and applies the group's "Other" policy
#[derive(Debug, Clone, Copy)]
pub struct TableLoader<'a> {
    config: &'a GroupConfig,
}

impl<'a> TableLoader<'a> {
    pub const fn new(config: &'a GroupConfig) -> Self {
        Self { config }
    }

    /// Build the canonical table.
    ///
    /// Identifiers missing from `jidMap` keep the row with no sender name; those
    /// rows are invisible to per-sender groupings but still count towards
    /// group-wide totals.
    pub fn load(&self, raw: RawTable) -> Result<CanonicalTable> {
        let total = raw.rows.len();
        let mut unmapped = 0usize;
        let mut messages = Vec::with_capacity(total);

        for row in raw.rows {
            let message = self.resolve(row, raw.has_sentiment)?;
            if message.sender_name.is_none() {
                unmapped += 1;
            }
            if self.config.exclude_other && message.sender().is_some_and(is_other) {
                continue;
            }
            messages.push(message);
        }

        let dropped = total - messages.len();
        if unmapped > 0 {
            warn!(unmapped, "Rows with sender identifiers missing from jidMap");
        }
        if dropped > 0 {
            debug!(dropped, "Excluded rows attributed to Other");
        }

        let metrics = MetricsCollector::default();
        metrics.record_rows_loaded(messages.len());
        metrics.record_rows_dropped(dropped, "exclude_other");

        info!(
            group = %self.config.group_name,
            rows = messages.len(),
            has_sentiment = raw.has_sentiment,
            "Loaded canonical table"
        );

        Ok(CanonicalTable::new(messages, raw.has_text, raw.has_sentiment))
    }

    fn resolve(&self, row: RawMessage, has_sentiment: bool) -> Result<Message> {
        let timestamp = DateTime::from_timestamp_millis(row.timestamp)
            .ok_or(ChatStatsError::InvalidTimestamp(row.timestamp))?
            .naive_utc();

        let sender_name = self.config.jid_map.get(&row.sender_jid_row_id).map(|name| {
            if self.config.other.contains(name) {
                OTHER_SENDER.to_string()
            } else {
                name.clone()
            }
        });

        let (sentiment, score) = if has_sentiment {
            let sentiment = row.sentiment.as_deref().map(Sentiment::parse).transpose()?.flatten();
            (sentiment, row.score)
        } else {
            (None, None)
        };

        Ok(Message {
            sender_name,
            timestamp,
            message_type: row.message_type,
            text_data: row.text_data,
            sentiment,
            score,
        })
    }
}

/// Case-insensitive match against the "Other" bucket
pub fn is_other(name: &str) -> bool {
    name.eq_ignore_ascii_case(OTHER_SENDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn raw(sender: &str, text: Option<&str>) -> RawMessage {
        RawMessage {
            sender_jid_row_id: sender.to_string(),
            timestamp: 1_704_103_200_000,
            message_type: "0".to_string(),
            text_data: text.map(str::to_string),
            sentiment: None,
            score: None,
        }
    }

    fn config(exclude_other: bool) -> GroupConfig {
        let mut jid_map = BTreeMap::new();
        jid_map.insert("1".to_string(), "Ana".to_string());
        jid_map.insert("2".to_string(), "Bob".to_string());
        jid_map.insert("3".to_string(), "Spam Bot".to_string());
        GroupConfig {
            group_name: "Test".to_string(),
            jid_map,
            other: vec!["Spam Bot".to_string()],
            exclude_other,
            sender_aliases: BTreeMap::new(),
        }
    }

    fn table() -> RawTable {
        RawTable {
            rows: vec![raw("1", Some("hi")), raw("3", Some("buy")), raw("9", None)],
            has_text: true,
            has_sentiment: false,
        }
    }

    #[test]
    fn test_maps_and_relabels_senders() {
        let config = config(false);
        let loaded = TableLoader::new(&config).load(table()).unwrap();

        let names: Vec<Option<&str>> = loaded.messages().iter().map(Message::sender).collect();
        assert_eq!(names, vec![Some("Ana"), Some("Other"), None]);
        assert_eq!(loaded.messages()[0].timestamp.to_string(), "2024-01-01 10:00:00");
    }

    #[test]
    fn test_exclude_other_keeps_unmapped_rows() {
        let config = config(true);
        let loaded = TableLoader::new(&config).load(table()).unwrap();

        let names: Vec<Option<&str>> = loaded.messages().iter().map(Message::sender).collect();
        assert_eq!(names, vec![Some("Ana"), None]);
    }

    #[test]
    fn test_sentiment_dropped_without_columns() {
        let config = config(false);
        let mut input = table();
        input.rows[0].sentiment = Some("positive".to_string());
        let loaded = TableLoader::new(&config).load(input).unwrap();
        assert!(!loaded.has_sentiment());
        assert_eq!(loaded.messages()[0].sentiment, None);
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let config = config(false);
        let mut input = table();
        input.rows[0].timestamp = i64::MAX;
        assert!(matches!(
            TableLoader::new(&config).load(input),
            Err(ChatStatsError::InvalidTimestamp(_))
        ));
    }
}
