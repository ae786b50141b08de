//! Chat Stats - Group Chat Analytics
//!
//! A Rust library for turning an exported group-chat message table into the
//! summary tables behind a chat dashboard.
//!
//! # Features
//!
//! - Read CSV exports and resolve opaque sender ids to display names
//! - Per-sender counts, lengths, emoji use, links and media types
//! - Monthly and weekday activity with gap-free month ranges
//! - Alias-aware mention matrices
//! - Sentiment ratios and monthly sentiment trends
//! - Export to JSON and CSV

/// Per-sender counts, weekday activity and podium selections
pub mod aggregate;
/// Configuration management
pub mod config;
/// Emoji extraction and rankings
pub mod emoji;
/// Error types
pub mod error;
/// Report export to JSON and CSV
pub mod export;
/// Sender alias normalization
pub mod identity;
/// Raw rows to canonical table
pub mod loader;
/// Logging setup and utilities
pub mod logging;
/// Message types and link counts
pub mod media;
/// Mention matrix builder
pub mod mentions;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// CSV export reader
pub mod reader;
/// Dashboard report
pub mod report;
/// Sentiment ratios and trends
pub mod sentiment;
/// Monthly activity
pub mod temporal;

// Re-export key components for easier access
pub use config::{AppConfig, GroupConfig};
pub use error::{ChatStatsError, Result};
pub use export::{write_report, ExportFormat};
pub use identity::AliasTable;
pub use loader::TableLoader;
pub use mentions::{count_mentions, MentionMatrix, MentionMode};
pub use models::{CanonicalTable, Message, MessageKind, RawTable, Sentiment};
pub use reader::{read_messages, read_messages_csv};
pub use report::{DashboardReport, ReportOptions};
pub use temporal::{ActivityTable, UserSelection, YearMonth};
