use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use config::{Config, Environment, File};

use crate::error::ChatStatsError;
use crate::identity::AliasTable;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub messages_path: String,
    pub group_config_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_directory: String,
    pub format: String, // "json" or "csv"
    /// Emojis kept per sender; `None` keeps all of them
    pub top_emojis: Option<usize>,
    pub podium_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                messages_path: "./data/group-chat.csv".to_string(),
                group_config_path: "./data/config.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            report: ReportConfig {
                output_directory: "./output".to_string(),
                format: "json".to_string(),
                top_emojis: Some(3),
                podium_size: 3,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        // Start with default values
        for (key, value) in AppConfig::default() {
            builder = builder.set_default(key, value)?;
        }

        let config = builder
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            // Add environment variables with prefix, e.g. CHAT_STATS_LOGGING__LEVEL
            .add_source(Environment::with_prefix("CHAT_STATS").prefix_separator("_").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.data.messages_path.trim().is_empty() {
            return Err(anyhow::anyhow!("data.messages_path must not be empty"));
        }
        if self.data.group_config_path.trim().is_empty() {
            return Err(anyhow::anyhow!("data.group_config_path must not be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        let valid_formats = ["json", "csv"];
        if !valid_formats.contains(&self.report.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid report format: {}. Must be one of: {:?}",
                self.report.format,
                valid_formats
            ));
        }

        if self.report.top_emojis == Some(0) {
            return Err(anyhow::anyhow!("top_emojis must be greater than 0 when set"));
        }

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

impl IntoIterator for AppConfig {
    type Item = (String, config::Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, config::Value>;

    fn into_iter(self) -> Self::IntoIter {
        let mut map = std::collections::HashMap::new();

        // Flatten the configuration into key-value pairs
        map.insert("data.messages_path".to_string(), config::Value::from(self.data.messages_path));
        map.insert("data.group_config_path".to_string(), config::Value::from(self.data.group_config_path));

        map.insert("logging.level".to_string(), config::Value::from(self.logging.level));
        if let Some(file_path) = self.logging.file_path {
            map.insert("logging.file_path".to_string(), config::Value::from(file_path));
        }
        map.insert("logging.format".to_string(), config::Value::from(self.logging.format));

        map.insert("report.output_directory".to_string(), config::Value::from(self.report.output_directory));
        map.insert("report.format".to_string(), config::Value::from(self.report.format));
        if let Some(top) = self.report.top_emojis {
            map.insert("report.top_emojis".to_string(), config::Value::from(top as u64));
        }
        map.insert("report.podium_size".to_string(), config::Value::from(self.report.podium_size as u64));

        map.into_iter()
    }
}

/// Per-group settings: who is who, and who counts as "Other".
///
/// Read once from the group's JSON file and passed by reference to the loader
/// and the mention builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Display label for the group
    #[serde(default)]
    pub group_name: String,
    /// Raw sender identifier to display name
    pub jid_map: BTreeMap<String, String>,
    /// Display names collapsed into `Other`
    pub other: Vec<String>,
    /// Drop `Other` rows entirely
    pub exclude_other: bool,
    /// Canonical name to alternative names and numeric handles
    #[serde(default)]
    pub sender_aliases: BTreeMap<String, Vec<String>>,
}

const REQUIRED_GROUP_KEYS: [&str; 3] = ["jidMap", "other", "excludeOther"];

impl GroupConfig {
    /// Parse a group config from JSON text
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ChatStatsError::Config(format!("group config is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a group config from an already-decoded JSON value
    pub fn from_value(value: Value) -> crate::error::Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(ChatStatsError::Config("group config must be a JSON object".to_string()));
        };

        if let Some(missing) = REQUIRED_GROUP_KEYS.iter().find(|key| !object.contains_key(**key)) {
            return Err(ChatStatsError::Config(format!("missing required key `{missing}`")));
        }

        serde_json::from_value(value)
            .map_err(|e| ChatStatsError::Config(format!("malformed group config: {e}")))
    }

    /// Read and parse a group config file
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Alias lookup derived from `sender_aliases`
    #[must_use]
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::new(&self.sender_aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.messages_path, "./data/group-chat.csv");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.report.top_emojis, Some(3));
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.report.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_group_config_camel_case_keys() {
        let group = GroupConfig::from_json_str(
            r#"{"groupName": "Hiking", "jidMap": {"7": "Ana"}, "other": [], "excludeOther": true}"#,
        )
        .unwrap();
        assert_eq!(group.group_name, "Hiking");
        assert_eq!(group.jid_map.get("7").map(String::as_str), Some("Ana"));
        assert!(group.exclude_other);
        assert!(group.sender_aliases.is_empty());
    }
}
