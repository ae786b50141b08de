//! CSV reading for exported chat tables.
//!
//! The export is one row per message. Only the projection the aggregators need
//! is kept; extra columns are ignored. `text_data` is optional, and the
//! `sentiment`/`score` pair is picked up only when both columns exist.

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ChatStatsError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{RawMessage, RawTable};

const SENDER_COLUMN: &str = "sender_jid_row_id";
const TIMESTAMP_COLUMN: &str = "timestamp";
const TYPE_COLUMN: &str = "message_type";
const TEXT_COLUMN: &str = "text_data";
const SENTIMENT_COLUMN: &str = "sentiment";
const SCORE_COLUMN: &str = "score";

/// Positions of the projected columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    sender: usize,
    timestamp: usize,
    message_type: usize,
    text: Option<usize>,
    sentiment: Option<(usize, usize)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ChatStatsError::missing_column(name, "the table loader"))
        };

        Ok(Self {
            sender: require(SENDER_COLUMN)?,
            timestamp: require(TIMESTAMP_COLUMN)?,
            message_type: require(TYPE_COLUMN)?,
            text: find(TEXT_COLUMN),
            sentiment: find(SENTIMENT_COLUMN).zip(find(SCORE_COLUMN)),
        })
    }

    fn parse(&self, record: &StringRecord, line: usize) -> Result<RawMessage> {
        let timestamp = cell(record, self.timestamp)
            .ok_or_else(|| ChatStatsError::Schema(format!("row {line}: empty timestamp")))
            .and_then(|raw| parse_epoch_millis(raw, line))?;

        let (sentiment, score) = match self.sentiment {
            Some((label_idx, score_idx)) => {
                let score = cell(record, score_idx)
                    .map(|raw| {
                        raw.parse::<f64>().map_err(|_| {
                            ChatStatsError::Schema(format!("row {line}: invalid score `{raw}`"))
                        })
                    })
                    .transpose()?;
                (cell(record, label_idx).map(str::to_string), score)
            }
            None => (None, None),
        };

        Ok(RawMessage {
            sender_jid_row_id: normalize_code(cell(record, self.sender).unwrap_or_default()),
            timestamp,
            message_type: normalize_code(cell(record, self.message_type).unwrap_or_default()),
            text_data: self.text.and_then(|idx| text_cell(record, idx)).map(str::to_string),
            sentiment,
            score,
        })
    }
}

/// Non-empty cell content; empty cells are absent values
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|value| !value.trim().is_empty())
}

/// Message text is kept verbatim, whitespace included; only empty cells are absent
fn text_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|value| !value.is_empty())
}

/// Integral codes sometimes arrive float-formatted (`12.0`); fold them back to `12`.
fn normalize_code(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) => int.to_string(),
        _ => raw.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_epoch_millis(raw: &str, line: usize) -> Result<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|ms| ms.round() as i64))
        .map_err(|_| ChatStatsError::Schema(format!("row {line}: invalid timestamp `{raw}`")))
}

/// Read an exported chat table from any CSV source
pub fn read_messages<R: Read>(source: R) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(source);
    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;
    debug!(
        has_text = layout.text.is_some(),
        has_sentiment = layout.sentiment.is_some(),
        "Resolved export columns"
    );

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // +2: header line and 1-based numbering
        rows.push(layout.parse(&record, index + 2)?);
    }

    MetricsCollector::default().record_rows_read(rows.len());

    Ok(RawTable {
        rows,
        has_text: layout.text.is_some(),
        has_sentiment: layout.sentiment.is_some(),
    })
}

/// Read an exported chat table from a CSV file
pub fn read_messages_csv(path: &Path) -> Result<RawTable> {
    let file = File::open(path)?;
    let table = read_messages(file)?;
    info!(path = %path.display(), rows = table.rows.len(), "Read message export");
    Ok(table)
}
