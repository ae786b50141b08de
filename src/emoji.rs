//! Emoji extraction and per-sender emoji statistics.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::models::{CanonicalTable, EmojiRankRow, EmojiRanking, SenderCount};

/// Flag pairs, keycaps, then pictographs with optional skin tone, variation
/// selector, tag and ZWJ continuations.
const EMOJI_PATTERN: &str = concat!(
    r"[\x{1F1E6}-\x{1F1FF}]{2}",
    r"|[0-9#*]\x{FE0F}?\x{20E3}",
    r"|\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}\x{E0020}-\x{E007F}]*",
    r"(?:\x{200D}\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]*)*",
);

/// Finds emoji sequences in message text
#[derive(Debug, Clone)]
pub struct EmojiExtractor {
    pattern: Regex,
}

impl EmojiExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(EMOJI_PATTERN)?,
        })
    }

    /// Every emoji sequence in `text`, in order of appearance
    #[must_use]
    pub fn extract<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Number of emoji sequences in `text`
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }
}

/// Total emojis per sender, in sender name order
pub fn emoji_density(table: &CanonicalTable) -> Result<Vec<SenderCount>> {
    table.require_text("emoji_density")?;
    let extractor = EmojiExtractor::new()?;

    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for (sender, message) in table.attributed() {
        let found = message.text_data.as_deref().map_or(0, |text| extractor.count(text));
        *totals.entry(sender).or_default() += found;
    }

    Ok(totals
        .into_iter()
        .map(|(sender, count)| SenderCount {
            sender_name: sender.to_string(),
            count,
        })
        .collect())
}

/// Running frequency count that remembers first appearance for tie-breaks
#[derive(Default)]
struct Tally<'t> {
    counts: HashMap<&'t str, (usize, usize)>,
}

impl<'t> Tally<'t> {
    fn add(&mut self, emoji: &'t str) {
        let next = self.counts.len();
        self.counts.entry(emoji).or_insert((next, 0)).1 += 1;
    }

    /// Most frequent first; equal counts keep first-seen order
    fn most_common(self, limit: Option<usize>) -> Vec<String> {
        let mut ranked: Vec<(&str, usize, usize)> = self
            .counts
            .into_iter()
            .map(|(emoji, (first_seen, count))| (emoji, first_seen, count))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
        ranked
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(emoji, _, _)| emoji.to_string())
            .collect()
    }
}

/// Each sender's most used emojis.
///
/// `top_n = None` keeps every emoji. Shorter lists are padded with `None` up to
/// the widest sender's list.
pub fn top_emojis(table: &CanonicalTable, top_n: Option<usize>) -> Result<EmojiRanking> {
    table.require_text("top_emojis")?;
    let extractor = EmojiExtractor::new()?;

    let mut tallies: BTreeMap<&str, Tally<'_>> = BTreeMap::new();
    for (sender, message) in table.attributed() {
        let tally = tallies.entry(sender).or_default();
        if let Some(text) = message.text_data.as_deref() {
            for emoji in extractor.extract(text) {
                tally.add(emoji);
            }
        }
    }

    let ranked: Vec<(String, Vec<String>)> = tallies
        .into_iter()
        .map(|(sender, tally)| (sender.to_string(), tally.most_common(top_n)))
        .collect();

    let width = ranked.iter().map(|(_, emojis)| emojis.len()).max().unwrap_or(0);
    let columns = (1..=width).map(|rank| format!("{rank}.")).collect();
    let rows = ranked
        .into_iter()
        .map(|(sender_name, emojis)| {
            let mut slots: Vec<Option<String>> = emojis.into_iter().map(Some).collect();
            slots.resize(width, None);
            EmojiRankRow { sender_name, emojis: slots }
        })
        .collect();

    Ok(EmojiRanking { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_sequences() {
        let extractor = EmojiExtractor::new().unwrap();
        assert_eq!(extractor.extract("hi 😀 there 🎉🎉"), vec!["😀", "🎉", "🎉"]);
        // skin tone stays attached
        assert_eq!(extractor.extract("👍🏽"), vec!["👍🏽"]);
        // ZWJ family is one emoji
        assert_eq!(extractor.count("👨\u{200D}👩\u{200D}👧"), 1);
        // flag pair
        assert_eq!(extractor.extract("🇩🇪!"), vec!["🇩🇪"]);
        // plain digits are not emoji
        assert_eq!(extractor.count("call me at 12345 #1"), 0);
    }
}
