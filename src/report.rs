//! Everything the dashboard shows, computed in one pass over the aggregators.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::aggregate::{
    average_message_length, message_count, participants, top_senders, weekly_activity,
};
use crate::config::GroupConfig;
use crate::emoji::{emoji_density, top_emojis};
use crate::error::{ChatStatsError, Result};
use crate::media::{count_link_messages, message_type_distribution, top_link_sender, top_sender_for_kind};
use crate::mentions::{count_mentions, MentionMatrix, MentionMode};
use crate::metrics::{timed, MetricsCollector, MetricsTimer};
use crate::models::{
    CanonicalTable, EmojiRanking, LinkCount, MessageKind, SenderCount, SenderLength,
    SentimentRatio, SentimentScore, TypeCount, UserMonthCount, WeekdayCount,
};
use crate::sentiment::{monthly_sentiment_score, sentiment_counts};
use crate::temporal::{message_activity, message_activity_stack, ActivityTable, UserSelection};

/// Knobs for [`DashboardReport::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Emojis kept per sender; `None` keeps all
    pub top_emojis: Option<usize>,
    /// How many senders make the podium
    pub podium_size: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_emojis: Some(3),
            podium_size: 3,
        }
    }
}

/// Sentiment tables, present only for enriched exports
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSection {
    pub ratios: Vec<SentimentRatio>,
    pub monthly: Vec<SentimentScore>,
    pub monthly_average: Vec<SentimentScore>,
}

/// All dashboard data for one group.
///
/// Sections that need the text column are `None` when the export has none;
/// "top" selections are `None` when nothing qualifies.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub group_name: String,
    pub total_messages: usize,
    pub participants: Vec<String>,
    pub podium: Vec<String>,
    pub message_count: Vec<SenderCount>,
    pub average_message_length: Option<Vec<SenderLength>>,
    pub monthly_activity: ActivityTable,
    pub monthly_activity_group: ActivityTable,
    pub monthly_activity_stack: Vec<UserMonthCount>,
    pub weekly_activity: Vec<WeekdayCount>,
    pub weekly_activity_by_user: BTreeMap<String, Vec<WeekdayCount>>,
    pub emoji_density: Option<Vec<SenderCount>>,
    pub top_emojis: Option<EmojiRanking>,
    pub mentions: Option<MentionMatrix>,
    pub direct_mentions: Option<MentionMatrix>,
    pub message_types: Vec<TypeCount>,
    pub top_media_senders: BTreeMap<String, String>,
    pub link_messages: Option<Vec<LinkCount>>,
    pub top_link_sender: Option<String>,
    pub sentiment: Option<SentimentSection>,
}

/// Run `f` only if the columns it needs exist
fn when<T>(enabled: bool, name: &'static str, f: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
    if enabled {
        timed(name, f).map(Some)
    } else {
        Ok(None)
    }
}

fn infallible<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
    let timer = MetricsTimer::new(MetricsCollector::default(), name);
    let value = f();
    timer.finish(true);
    value
}

impl DashboardReport {
    /// Compute every section of the dashboard
    pub fn build(table: &CanonicalTable, group: &GroupConfig, options: &ReportOptions) -> Result<Self> {
        let has_text = table.has_text();
        if !has_text {
            warn!("Export has no text column; text-based sections are skipped");
        }

        let counts = infallible("message_count", || message_count(table));
        let participants = participants(table);
        let aliases = group.alias_table();

        let weekly_activity_by_user = participants
            .iter()
            .map(|user| (user.clone(), weekly_activity(table, Some(user.as_str()))))
            .collect();

        let message_types = infallible("message_type_distribution", || message_type_distribution(table));
        let top_media_senders = [MessageKind::Image, MessageKind::Sticker, MessageKind::Map, MessageKind::Deleted]
            .into_iter()
            .filter_map(|kind| {
                top_sender_for_kind(&message_types, kind)
                    .ok()
                    .map(|sender| (kind.label().to_string(), sender))
            })
            .collect();

        let link_messages = when(has_text, "count_link_messages", || count_link_messages(table))?;
        let top_link_sender = link_messages.as_deref().and_then(|links| top_link_sender(links).ok());

        let sentiment = when(table.has_sentiment(), "sentiment", || {
            Ok::<_, ChatStatsError>(SentimentSection {
                ratios: sentiment_counts(table)?,
                monthly: monthly_sentiment_score(table, false)?,
                monthly_average: monthly_sentiment_score(table, true)?,
            })
        })?;

        let report = Self {
            group_name: group.group_name.clone(),
            total_messages: table.len(),
            podium: top_senders(&counts, options.podium_size),
            participants,
            average_message_length: when(has_text, "average_message_length", || {
                average_message_length(table)
            })?,
            monthly_activity: infallible("message_activity", || {
                message_activity(table, &UserSelection::All)
            }),
            monthly_activity_group: infallible("message_activity_group", || {
                message_activity(table, &UserSelection::Group)
            }),
            monthly_activity_stack: infallible("message_activity_stack", || message_activity_stack(table)),
            weekly_activity: infallible("weekly_activity", || weekly_activity(table, None)),
            weekly_activity_by_user,
            emoji_density: when(has_text, "emoji_density", || emoji_density(table))?,
            top_emojis: when(has_text, "top_emojis", || top_emojis(table, options.top_emojis))?,
            mentions: when(has_text, "count_mentions", || {
                count_mentions(table, &aliases, MentionMode::Any)
            })?,
            direct_mentions: when(has_text, "count_direct_mentions", || {
                count_mentions(table, &aliases, MentionMode::DirectHandle)
            })?,
            message_count: counts,
            message_types,
            top_media_senders,
            link_messages,
            top_link_sender,
            sentiment,
        };

        info!(
            group = %report.group_name,
            messages = report.total_messages,
            participants = report.participants.len(),
            "Built dashboard report"
        );
        Ok(report)
    }
}
