//! Who mentions whom.
//!
//! Builds a square matrix over the normalized participants of a chat. A cell
//! `[sender][mentioned]` holds how often `sender` wrote one of `mentioned`'s
//! names as a whole word. The diagonal is always zero.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::identity::AliasTable;
use crate::loader::is_other;
use crate::models::{CanonicalTable, MentionCount};

/// Which names count as a mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MentionMode {
    /// The participant's canonical name or any of its aliases
    #[default]
    Any,
    /// Only numeric handle aliases, i.e. `@491701234567` style tags
    DirectHandle,
}

impl MentionMode {
    /// Terms searched for when looking for mentions of `canonical`.
    ///
    /// An empty list means the participant cannot be mentioned in this mode.
    #[must_use]
    pub fn search_terms(self, canonical: &str, aliases: &AliasTable) -> Vec<String> {
        let terms: Vec<String> = match self {
            Self::Any => std::iter::once(canonical.to_string())
                .chain(aliases.aliases(canonical).iter().cloned())
                .collect(),
            Self::DirectHandle => aliases.numeric_aliases(canonical).cloned().collect(),
        };
        terms.into_iter().filter(|term| !term.is_empty()).collect()
    }

    fn pattern(self, canonical: &str, aliases: &AliasTable) -> Result<Option<Regex>> {
        let terms = self.search_terms(canonical, aliases);
        if terms.is_empty() {
            return Ok(None);
        }
        let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(true)
            .build()?;
        Ok(Some(pattern))
    }
}

/// Square mention counts; rows are authors, columns the mentioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionMatrix {
    participants: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl MentionMatrix {
    /// Participants in first-appearance order; the index of both axes
    #[must_use]
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p == name)
    }

    /// How often `sender` mentioned `mentioned`; `None` for unknown names
    #[must_use]
    pub fn get(&self, sender: &str, mentioned: &str) -> Option<usize> {
        Some(self.counts[self.index(sender)?][self.index(mentioned)?])
    }

    /// Raw rows, indexed like [`Self::participants`]
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Long form, one record per ordered pair of distinct participants
    #[must_use]
    pub fn records(&self) -> Vec<MentionCount> {
        let mut records = Vec::new();
        for (i, sender) in self.participants.iter().enumerate() {
            for (j, mentioned) in self.participants.iter().enumerate() {
                if i != j {
                    records.push(MentionCount {
                        sender: sender.clone(),
                        mentioned: mentioned.clone(),
                        count: self.counts[i][j],
                    });
                }
            }
        }
        records
    }

    /// Sum over all cells
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Count mentions between every pair of participants.
///
/// Rows from the `Other` bucket and rows without a sender are ignored. Each
/// sender's messages are searched once per other participant, so the cost
/// grows with participants squared times messages.
pub fn count_mentions(
    table: &CanonicalTable,
    aliases: &AliasTable,
    mode: MentionMode,
) -> Result<MentionMatrix> {
    table.require_text("count_mentions")?;

    let mut participants: Vec<String> = Vec::new();
    let mut texts: Vec<Vec<&str>> = Vec::new();
    for (sender, message) in table.attributed().filter(|(sender, _)| !is_other(sender)) {
        let normalized = aliases.normalize(sender);
        let idx = match participants.iter().position(|p| *p == normalized) {
            Some(idx) => idx,
            None => {
                participants.push(normalized);
                texts.push(Vec::new());
                participants.len() - 1
            }
        };
        if let Some(text) = message.text_data.as_deref() {
            texts[idx].push(text);
        }
    }

    let n = participants.len();
    let mut counts = vec![vec![0usize; n]; n];
    for (j, mentioned) in participants.iter().enumerate() {
        let Some(pattern) = mode.pattern(mentioned, aliases)? else {
            debug!(participant = %mentioned, ?mode, "No search terms, column stays empty");
            continue;
        };
        for (i, sender_texts) in texts.iter().enumerate() {
            if i == j {
                continue;
            }
            counts[i][j] = sender_texts
                .iter()
                .map(|text| pattern.find_iter(text).count())
                .sum();
        }
    }

    debug!(participants = n, ?mode, "Built mention matrix");
    Ok(MentionMatrix { participants, counts })
}
