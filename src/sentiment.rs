//! Sentiment ratios and monthly sentiment trends.
//!
//! Only rows labelled positive or negative take part; neutral rows are ignored.
//! Both aggregators need the sentiment columns and fail with a schema error on
//! tables that were never enriched.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{CanonicalTable, RatioKind, Sentiment, SentimentRatio, SentimentScore};
use crate::temporal::YearMonth;

/// Score reported when a bucket has no positive or negative messages
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Sender name of the collapsed per-month series
pub const AVERAGE_SENDER: &str = "average";

/// Positive/negative tallies for one bucket
#[derive(Debug, Clone, Copy, Default)]
struct Polarity {
    positive: usize,
    negative: usize,
}

impl Polarity {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn positive_share(self) -> f64 {
        let total = self.positive + self.negative;
        if total == 0 {
            NEUTRAL_SCORE
        } else {
            self.positive as f64 / total as f64
        }
    }
}

/// Polar rows with a known sender
fn polar_rows(table: &CanonicalTable) -> impl Iterator<Item = (&str, &crate::models::Message, Sentiment)> {
    table.attributed().filter_map(|(sender, message)| {
        message
            .sentiment
            .filter(|s| s.is_polar())
            .map(|s| (sender, message, s))
    })
}

/// Positive and negative share per sender.
///
/// All `positive_ratio` rows come first (highest ratio first), followed by all
/// `negative_ratio` rows (highest ratio first).
pub fn sentiment_counts(table: &CanonicalTable) -> Result<Vec<SentimentRatio>> {
    table.require_sentiment("sentiment_counts")?;

    let mut per_sender: BTreeMap<&str, Polarity> = BTreeMap::new();
    for (sender, _, sentiment) in polar_rows(table) {
        per_sender.entry(sender).or_default().add(sentiment);
    }

    let mut positive: Vec<SentimentRatio> = Vec::with_capacity(per_sender.len());
    let mut negative: Vec<SentimentRatio> = Vec::with_capacity(per_sender.len());
    for (sender, polarity) in per_sender {
        let share = polarity.positive_share();
        positive.push(SentimentRatio {
            sender_name: sender.to_string(),
            sentiment: RatioKind::Positive,
            ratio: share,
        });
        negative.push(SentimentRatio {
            sender_name: sender.to_string(),
            sentiment: RatioKind::Negative,
            ratio: 1.0 - share,
        });
    }

    positive.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    negative.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    positive.extend(negative);
    Ok(positive)
}

/// Share of positive messages per sender and month.
///
/// With `average`, the per-sender scores of each month are collapsed into
/// their unweighted mean under the sender name `average`.
pub fn monthly_sentiment_score(table: &CanonicalTable, average: bool) -> Result<Vec<SentimentScore>> {
    table.require_sentiment("monthly_sentiment_score")?;

    let mut buckets: BTreeMap<(&str, YearMonth), Polarity> = BTreeMap::new();
    for (sender, message, sentiment) in polar_rows(table) {
        buckets
            .entry((sender, YearMonth::of(&message.timestamp)))
            .or_default()
            .add(sentiment);
    }

    if !average {
        return Ok(buckets
            .into_iter()
            .map(|((sender, month), polarity)| SentimentScore {
                sender_name: sender.to_string(),
                month_year: month.to_string(),
                sentiment_score: polarity.positive_share(),
            })
            .collect());
    }

    let mut per_month: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for ((_, month), polarity) in buckets {
        let slot = per_month.entry(month).or_default();
        slot.0 += polarity.positive_share();
        slot.1 += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let averaged = per_month
        .into_iter()
        .map(|(month, (sum, senders))| SentimentScore {
            sender_name: AVERAGE_SENDER.to_string(),
            month_year: month.to_string(),
            sentiment_score: sum / senders as f64,
        })
        .collect();
    Ok(averaged)
}
