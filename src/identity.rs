//! Sender identity resolution.
//!
//! Participants show up under many names: the display name from the export,
//! nicknames typed in messages, and numeric phone handles used for `@` tags.
//! [`AliasTable`] folds all of them onto one canonical, lower-cased name.

use std::collections::BTreeMap;

/// Canonical participant names and the aliases that resolve to them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    /// Canonical name to its aliases, both trimmed and lower-cased
    entries: BTreeMap<String, Vec<String>>,
}

/// Trim and lower-case, the form every comparison happens in
fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// True for handles made of digits only, e.g. `491701234567`
#[must_use]
pub fn is_numeric_handle(alias: &str) -> bool {
    !alias.is_empty() && alias.chars().all(|c| c.is_ascii_digit())
}

impl AliasTable {
    /// Build the table from the configured `senderAliases` mapping.
    ///
    /// Keys that fold to the same canonical name have their aliases merged.
    #[must_use]
    pub fn new(sender_aliases: &BTreeMap<String, Vec<String>>) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (canonical, aliases) in sender_aliases {
            let slot = entries.entry(fold(canonical)).or_default();
            for alias in aliases {
                let alias = fold(alias);
                if !alias.is_empty() && !slot.contains(&alias) {
                    slot.push(alias);
                }
            }
        }
        Self { entries }
    }

    /// Resolve a raw name to its canonical participant name.
    ///
    /// Exact canonical names win over aliases, so every canonical name is a
    /// fixed point. Unknown names pass through trimmed and lower-cased and act
    /// as their own participant.
    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        let name = fold(name);
        if self.entries.contains_key(&name) {
            return name;
        }
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.contains(&name))
            .map_or(name, |(canonical, _)| canonical.clone())
    }

    /// All aliases of a canonical name, excluding the name itself
    #[must_use]
    pub fn aliases(&self, canonical: &str) -> &[String] {
        self.entries.get(canonical).map_or(&[], Vec::as_slice)
    }

    /// Aliases of a canonical name that are numeric handles
    pub fn numeric_aliases<'a>(&'a self, canonical: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.aliases(canonical)
            .iter()
            .filter(|alias| is_numeric_handle(alias))
    }

    /// True if no aliases are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> AliasTable {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            "anna".to_string(),
            vec!["Annie".to_string(), "491701234567".to_string()],
        );
        aliases.insert("Ben".to_string(), vec!["benny".to_string(), "anna".to_string()]);
        AliasTable::new(&aliases)
    }

    #[test]
    fn test_normalize_alias_to_canonical() {
        let table = table();
        assert_eq!(table.normalize("  ANNIE "), "anna");
        assert_eq!(table.normalize("491701234567"), "anna");
        assert_eq!(table.normalize("Benny"), "ben");
    }

    #[test]
    fn test_canonical_beats_alias() {
        // "anna" is also listed as one of ben's aliases
        assert_eq!(table().normalize("Anna"), "anna");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(table().normalize(" Carla "), "carla");
    }

    #[test]
    fn test_numeric_aliases() {
        let table = table();
        let numeric: Vec<&String> = table.numeric_aliases("anna").collect();
        assert_eq!(numeric, vec!["491701234567"]);
        assert_eq!(table.numeric_aliases("ben").count(), 0);
        assert_eq!(table.numeric_aliases("nobody").count(), 0);
    }

    #[test]
    fn test_is_numeric_handle() {
        assert!(is_numeric_handle("0049170"));
        assert!(!is_numeric_handle(""));
        assert!(!is_numeric_handle("+49170"));
        assert!(!is_numeric_handle("anna1"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(name in "\\PC{0,12}") {
            let table = table();
            let once = table.normalize(&name);
            prop_assert_eq!(table.normalize(&once), once);
        }
    }
}
