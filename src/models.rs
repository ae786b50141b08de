//! Data models for message handling and aggregation
//!
//! This module contains all data structures used throughout the crate: the raw
//! rows read from an export, the canonical table every aggregator consumes, and
//! the flat summary rows the aggregators produce.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ChatStatsError, Result};

/// Display name every identity listed under `other` is collapsed into.
pub const OTHER_SENDER: &str = "Other";

/// Stand-in text measured for messages without text.
///
/// Absent text is stringified before its length is taken, so a missing body
/// contributes four characters to the sender's average.
pub const MISSING_TEXT_PLACEHOLDER: &str = "None";

/// One row of the exported chat table, before sender resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Opaque sender identifier from the export
    pub sender_jid_row_id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Message type code as it appears in the export
    pub message_type: String,
    /// Message text, absent for pure media messages
    pub text_data: Option<String>,
    /// Sentiment label attached by the enrichment step
    pub sentiment: Option<String>,
    /// Polarity score attached by the enrichment step
    pub score: Option<f64>,
}

/// Raw rows plus the optional columns the source actually carried
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Rows in file order
    pub rows: Vec<RawMessage>,
    /// True if the source has a `text_data` column
    pub has_text: bool,
    /// True if the source has both `sentiment` and `score` columns
    pub has_sentiment: bool,
}

/// Sentiment label attached by the enrichment step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Clearly positive polarity
    Positive,
    /// Clearly negative polarity
    Negative,
    /// Everything in between
    Neutral,
}

impl Sentiment {
    /// Parse a label from the export; empty cells are `None`.
    pub fn parse(label: &str) -> Result<Option<Self>> {
        match label.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "positive" => Ok(Some(Self::Positive)),
            "negative" => Ok(Some(Self::Negative)),
            "neutral" => Ok(Some(Self::Neutral)),
            other => Err(ChatStatsError::Schema(format!(
                "unknown sentiment label `{other}`"
            ))),
        }
    }

    /// Positive or negative; neutral rows never enter ratio computations.
    #[must_use]
    pub const fn is_polar(self) -> bool {
        matches!(self, Self::Positive | Self::Negative)
    }
}

/// Media categories recognised by the type distribution.
///
/// Variants are declared in label order so sorting by kind sorts by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Deleted message placeholder
    Deleted,
    /// Photo or image
    Image,
    /// Shared location
    Map,
    /// Sticker
    Sticker,
}

impl MessageKind {
    /// Map an export type code to its category. Unknown codes map to nothing.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" | "13" => Some(Self::Image),
            "5" | "16" => Some(Self::Map),
            "20" => Some(Self::Sticker),
            "15" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Column label used in summary tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Image => "image",
            Self::Map => "map",
            Self::Sticker => "sticker",
        }
    }
}

/// One row of the canonical table
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Resolved display name; `None` when the identifier was not mapped
    pub sender_name: Option<String>,
    /// When the message was sent (UTC)
    pub timestamp: NaiveDateTime,
    /// Raw type code
    pub message_type: String,
    /// Message text
    pub text_data: Option<String>,
    /// Sentiment label, if the table carries sentiment
    pub sentiment: Option<Sentiment>,
    /// Polarity score, if the table carries sentiment
    pub score: Option<f64>,
}

impl Message {
    /// Media category of this message, if its code is mapped
    #[must_use]
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_code(&self.message_type)
    }

    /// Text as measured by the length aggregator
    #[must_use]
    pub fn text_or_placeholder(&self) -> &str {
        self.text_data.as_deref().unwrap_or(MISSING_TEXT_PLACEHOLDER)
    }

    /// Sender name, if resolved
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }
}

/// The cleaned message set every aggregator reads
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    messages: Vec<Message>,
    has_text: bool,
    has_sentiment: bool,
}

impl CanonicalTable {
    /// Build a table from already-resolved messages
    #[must_use]
    pub const fn new(messages: Vec<Message>, has_text: bool, has_sentiment: bool) -> Self {
        Self {
            messages,
            has_text,
            has_sentiment,
        }
    }

    /// All rows in load order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if the source carried a text column
    #[must_use]
    pub const fn has_text(&self) -> bool {
        self.has_text
    }

    /// True if the source carried the sentiment/score pair
    #[must_use]
    pub const fn has_sentiment(&self) -> bool {
        self.has_sentiment
    }

    /// Fail with a schema error unless the text column exists
    pub fn require_text(&self, operation: &str) -> Result<()> {
        if self.has_text {
            Ok(())
        } else {
            Err(ChatStatsError::missing_column("text_data", operation))
        }
    }

    /// Fail with a schema error unless the sentiment columns exist
    pub fn require_sentiment(&self, operation: &str) -> Result<()> {
        if self.has_sentiment {
            Ok(())
        } else {
            Err(ChatStatsError::missing_column("sentiment", operation))
        }
    }

    /// Rows whose sender was resolved, paired with that sender
    pub fn attributed(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.messages
            .iter()
            .filter_map(|m| m.sender().map(|name| (name, m)))
    }
}

/// Row count per sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderCount {
    /// Display name
    pub sender_name: String,
    /// Number of rows (or emojis, for emoji density)
    pub count: usize,
}

/// Mean message length per sender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SenderLength {
    /// Display name
    pub sender_name: String,
    /// Mean length in characters
    pub length: f64,
}

/// Messages sent on one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    /// Full English weekday name, e.g. `Monday`
    pub weekday: String,
    /// Number of messages
    pub count: usize,
}

/// Messages containing a link, per sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCount {
    /// Display name
    pub sender_name: String,
    /// Messages with an `http(s)://` link
    pub link_message_count: usize,
}

/// Messages of one media category, per sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    /// Display name
    pub sender_name: String,
    /// Media category
    pub message_type_label: MessageKind,
    /// Number of messages
    pub count: usize,
}

/// Group-wide messages in one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month_year: String,
    /// Number of messages
    pub message_count: usize,
}

/// Messages by one user in one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMonthCount {
    /// `YYYY-MM`
    pub month_year: String,
    /// Display name
    pub user: String,
    /// Number of messages
    pub message_count: usize,
}

/// Share of positive messages for one sender in one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentScore {
    /// Display name, or `average` for the collapsed series
    pub sender_name: String,
    /// `YYYY-MM`
    pub month_year: String,
    /// positive / (positive + negative)
    pub sentiment_score: f64,
}

/// Which side of the positive/negative split a ratio row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatioKind {
    /// Share of positive messages
    #[serde(rename = "positive_ratio")]
    Positive,
    /// Share of negative messages
    #[serde(rename = "negative_ratio")]
    Negative,
}

impl RatioKind {
    /// Column value used in summary tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive_ratio",
            Self::Negative => "negative_ratio",
        }
    }
}

/// Positive or negative share for one sender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRatio {
    /// Display name
    pub sender_name: String,
    /// Ratio side
    pub sentiment: RatioKind,
    /// Share in [0, 1]
    pub ratio: f64,
}

/// Mentions of one participant by another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionCount {
    /// Normalized name of the author
    pub sender: String,
    /// Normalized name of the mentioned participant
    pub mentioned: String,
    /// Number of matches
    pub count: usize,
}

/// One sender's most used emojis, padded to the table width
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiRankRow {
    /// Display name
    pub sender_name: String,
    /// Emojis by rank; `None` pads shorter lists
    pub emojis: Vec<Option<String>>,
}

/// Ragged emoji ranking padded to the widest sender list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmojiRanking {
    /// Rank headers: `1.`, `2.`, ...
    pub columns: Vec<String>,
    /// One row per sender
    pub rows: Vec<EmojiRankRow>,
}
