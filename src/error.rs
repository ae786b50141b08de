//! Error types for the chat-stats library.
//!
//! This module provides custom error types using `thiserror` so that callers can
//! tell configuration problems apart from missing input columns and empty
//! selections.

use thiserror::Error;

/// Errors that can occur while loading or aggregating a chat history.
#[derive(Error, Debug)]
pub enum ChatStatsError {
    /// Required configuration key missing or malformed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input table lacks a column the requested operation needs, or a cell
    /// could not be parsed
    #[error("Schema error: {0}")]
    Schema(String),

    /// An arg-max was requested over an empty result
    #[error("Nothing to select: {0}")]
    EmptySelection(String),

    /// Epoch milliseconds outside the representable calendar range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A search pattern could not be compiled
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatStatsError {
    /// Shorthand for a missing-column error.
    pub(crate) fn missing_column(column: &str, operation: &str) -> Self {
        Self::Schema(format!("column `{column}` is required by {operation}"))
    }
}

/// Convenience type alias for Result with ChatStatsError
pub type Result<T> = std::result::Result<T, ChatStatsError>;
