use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use chat_stats::aggregate::{message_count, most_active_sender, participants};
use chat_stats::config::{AppConfig, GroupConfig};
use chat_stats::export::{write_report, ExportFormat};
use chat_stats::loader::TableLoader;
use chat_stats::logging::{init_logging, OperationTimer};
use chat_stats::metrics::MetricsCollector;
use chat_stats::models::CanonicalTable;
use chat_stats::reader::read_messages_csv;
use chat_stats::report::{DashboardReport, ReportOptions};
use chat_stats::temporal::{message_activity, ActivityTable, UserSelection};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every subcommand; unset values fall back to settings
#[derive(Args)]
struct InputArgs {
    /// Message export (CSV)
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Group config (JSON)
    #[arg(short, long)]
    group_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard report and write it to disk
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format (json or csv)
        #[arg(short, long)]
        format: Option<String>,

        /// Emojis kept per sender
        #[arg(long)]
        top_emojis: Option<usize>,
    },
    /// Log the headline numbers of a chat
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes the log file on drop
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _guard = init_logging(
        Some(&config.get_log_level()),
        log_file,
        config.logging.format == "json",
    )?;

    info!("Starting chat-stats");

    // Parse command line arguments
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Report {
            input,
            output_dir,
            format,
            top_emojis,
        } => build_report(&config, input, output_dir.as_deref(), format.as_deref(), *top_emojis),
        Commands::Summary { input } => summarize(&config, input),
    };

    if let Err(e) = &result {
        MetricsCollector::default().record_error("command_failed", "main");
        warn!(error = %e, "Command failed");
    }
    result
}

/// Read the export and resolve it against the group config
fn load_table(config: &AppConfig, input: &InputArgs) -> Result<(CanonicalTable, GroupConfig)> {
    let messages_path = input
        .messages
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.messages_path));
    let group_path = input
        .group_config
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.group_config_path));

    let timer = OperationTimer::new("load_table");

    let group = GroupConfig::from_path(&group_path)
        .with_context(|| format!("Failed to read group config {}", group_path.display()))?;
    debug!(
        group = %group.group_name,
        identities = group.jid_map.len(),
        aliases = group.sender_aliases.len(),
        "Loaded group config"
    );

    let raw = read_messages_csv(&messages_path)
        .with_context(|| format!("Failed to read messages {}", messages_path.display()))?;
    let table = TableLoader::new(&group)
        .load(raw)
        .context("Failed to resolve senders")?;

    timer.finish();
    Ok((table, group))
}

/// Build the dashboard report and write it out
fn build_report(
    config: &AppConfig,
    input: &InputArgs,
    output_dir: Option<&Path>,
    format: Option<&str>,
    top_emojis: Option<usize>,
) -> Result<()> {
    let format_name = format.unwrap_or(config.report.format.as_str());
    let export_format = ExportFormat::parse(format_name)
        .with_context(|| format!("Invalid format: {format_name}. Must be json or csv"))?;

    // Use configuration output directory if not provided
    let effective_output_dir = output_dir.map_or_else(
        || PathBuf::from(&config.report.output_directory),
        Path::to_path_buf,
    );

    let options = ReportOptions {
        top_emojis: top_emojis.or(config.report.top_emojis),
        podium_size: config.report.podium_size,
    };

    let (table, group) = load_table(config, input)?;

    let timer = OperationTimer::new("build_report");
    let report =
        DashboardReport::build(&table, &group, &options).context("Failed to build report")?;
    timer.finish();

    let written = write_report(&report, &effective_output_dir, export_format)
        .with_context(|| format!("Failed to write report to {}", effective_output_dir.display()))?;
    for path in &written {
        info!("Wrote {}", path.display());
    }

    Ok(())
}

/// Log the headline numbers
fn summarize(config: &AppConfig, input: &InputArgs) -> Result<()> {
    let (table, group) = load_table(config, input)?;

    let counts = message_count(&table);
    let people = participants(&table);
    let months = match message_activity(&table, &UserSelection::Group) {
        ActivityTable::Group(rows) => rows.len(),
        ActivityTable::PerUser(_) => 0,
    };

    info!(
        group = %group.group_name,
        messages = table.len(),
        participants = people.len(),
        months,
        "Chat summary"
    );

    match most_active_sender(&counts) {
        Ok(sender) => info!("Most active sender: {}", sender),
        Err(e) => warn!("No most active sender: {}", e),
    }

    for row in &counts {
        info!("{}: {} messages", row.sender_name, row.count);
    }

    Ok(())
}
