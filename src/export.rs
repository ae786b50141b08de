//! File writing utilities for dashboard reports.
//!
//! The full report always goes to `report.json`. In CSV mode every flat summary
//! table is additionally written to its own file so chart tools can pick them
//! up directly.

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::{
    EmojiRanking, LinkCount, MentionCount, MonthCount, SenderCount, SenderLength, SentimentRatio,
    SentimentScore, TypeCount, UserMonthCount, WeekdayCount,
};
use crate::report::DashboardReport;
use crate::temporal::ActivityTable;

/// Output format for exported reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `report.json` only
    Json,
    /// `report.json` plus one CSV per table
    Csv,
}

impl ExportFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Parse a format name as used in settings and on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Write a report into `output_dir`.
///
/// # Returns
///
/// Paths of every file written, `report.json` first.
pub fn write_report(report: &DashboardReport, output_dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    create_dir_all(output_dir)?;

    let report_path = output_dir.join("report.json");
    write_json_file(report, &report_path)?;
    let mut written = vec![report_path];

    if format == ExportFormat::Csv {
        let mut table = |name: &str, write: &dyn Fn(&Path) -> Result<()>| -> Result<()> {
            let path = output_dir.join(format!("{name}.{}", format.extension()));
            write(&path)?;
            written.push(path);
            Ok(())
        };

        table("message_count", &|p: &Path| write_csv_rows(&report.message_count, p))?;
        table("monthly_activity", &|p: &Path| write_activity(&report.monthly_activity, p))?;
        table("monthly_activity_group", &|p: &Path| write_activity(&report.monthly_activity_group, p))?;
        table("monthly_activity_stack", &|p: &Path| write_csv_rows(&report.monthly_activity_stack, p))?;
        table("weekly_activity", &|p: &Path| write_csv_rows(&report.weekly_activity, p))?;
        table("message_types", &|p: &Path| write_csv_rows(&report.message_types, p))?;

        if let Some(lengths) = &report.average_message_length {
            table("average_message_length", &|p: &Path| write_csv_rows(lengths, p))?;
        }
        if let Some(density) = &report.emoji_density {
            table("emoji_density", &|p: &Path| write_csv_rows(density, p))?;
        }
        if let Some(ranking) = &report.top_emojis {
            table("top_emojis", &|p: &Path| write_emoji_ranking(ranking, p))?;
        }
        if let Some(matrix) = &report.mentions {
            table("mentions", &|p: &Path| write_csv_rows(&matrix.records(), p))?;
        }
        if let Some(matrix) = &report.direct_mentions {
            table("direct_mentions", &|p: &Path| write_csv_rows(&matrix.records(), p))?;
        }
        if let Some(links) = &report.link_messages {
            table("link_messages", &|p: &Path| write_csv_rows(links, p))?;
        }
        if let Some(sentiment) = &report.sentiment {
            table("sentiment_ratios", &|p: &Path| write_csv_rows(&sentiment.ratios, p))?;
            table("monthly_sentiment", &|p: &Path| write_csv_rows(&sentiment.monthly, p))?;
            table("monthly_sentiment_average", &|p: &Path| write_csv_rows(&sentiment.monthly_average, p))?;
        }
    }

    info!(dir = %output_dir.display(), files = written.len(), "Wrote dashboard report");
    Ok(written)
}

/// Write a serializable value as pretty JSON.
fn write_json_file<T: Serialize>(value: &T, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Column names of a flat summary record, in serialization order
trait CsvRecord: Serialize {
    const HEADER: &'static [&'static str];
}

macro_rules! csv_record {
    ($($record:ty => [$($column:literal),+]),+ $(,)?) => {
        $(impl CsvRecord for $record {
            const HEADER: &'static [&'static str] = &[$($column),+];
        })+
    };
}

csv_record! {
    SenderCount => ["sender_name", "count"],
    SenderLength => ["sender_name", "length"],
    WeekdayCount => ["weekday", "count"],
    LinkCount => ["sender_name", "link_message_count"],
    TypeCount => ["sender_name", "message_type_label", "count"],
    MonthCount => ["month_year", "message_count"],
    UserMonthCount => ["month_year", "user", "message_count"],
    SentimentScore => ["sender_name", "month_year", "sentiment_score"],
    SentimentRatio => ["sender_name", "sentiment", "ratio"],
    MentionCount => ["sender", "mentioned", "count"],
}

/// Write flat records; the header is written even when there are no rows.
fn write_csv_rows<T: CsvRecord>(rows: &[T], file_path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(file_path)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_activity(activity: &ActivityTable, file_path: &Path) -> Result<()> {
    match activity {
        ActivityTable::Group(rows) => write_csv_rows(rows, file_path),
        ActivityTable::PerUser(rows) => write_csv_rows(rows, file_path),
    }
}

/// Header: `sender_name, 1., 2., ...`; empty cells pad short lists.
fn write_emoji_ranking(ranking: &EmojiRanking, file_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(file_path)?;

    let header = std::iter::once("sender_name").chain(ranking.columns.iter().map(String::as_str));
    writer.write_record(header)?;

    for row in &ranking.rows {
        let cells = std::iter::once(row.sender_name.as_str())
            .chain(row.emojis.iter().map(|e| e.as_deref().unwrap_or("")));
        writer.write_record(cells)?;
    }

    writer.flush()?;
    Ok(())
}
