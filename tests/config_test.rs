//! Tests for application settings and group configs

use chat_stats::config::{AppConfig, GroupConfig};
use chat_stats::error::ChatStatsError;
use std::io::Write;
use tempfile::NamedTempFile;

const GROUP_JSON: &str = r#"{
    "groupName": "Climbing crew",
    "jidMap": {"3": "Ana", "7": "Ben", "9": "Spam Bot"},
    "other": ["Spam Bot"],
    "excludeOther": false,
    "senderAliases": {"Ben": ["Benji", "491700000007"]}
}"#;

#[test]
fn test_default_app_config() {
    let config = AppConfig::default();

    assert_eq!(config.data.messages_path, "./data/group-chat.csv");
    assert_eq!(config.data.group_config_path, "./data/config.json");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
    assert_eq!(config.report.output_directory, "./output");
    assert_eq!(config.report.format, "json");
    assert_eq!(config.report.top_emojis, Some(3));
    assert_eq!(config.report.podium_size, 3);
}

#[test]
fn test_default_app_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.report.format = "xlsx".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.report.top_emojis = Some(0);
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.report.top_emojis = None;
    assert!(config.validate().is_ok());

    let mut config = AppConfig::default();
    config.data.messages_path = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_flattens_to_dotted_keys() {
    let keys: Vec<String> = AppConfig::default().into_iter().map(|(k, _)| k).collect();
    assert!(keys.contains(&"data.messages_path".to_string()));
    assert!(keys.contains(&"report.top_emojis".to_string()));
    assert!(!keys.contains(&"logging.file_path".to_string()));
}

#[test]
fn test_group_config_parses_all_keys() {
    let group = GroupConfig::from_json_str(GROUP_JSON).unwrap();

    assert_eq!(group.group_name, "Climbing crew");
    assert_eq!(group.jid_map.get("7").map(String::as_str), Some("Ben"));
    assert_eq!(group.other, vec!["Spam Bot"]);
    assert!(!group.exclude_other);

    let aliases = group.alias_table();
    assert_eq!(aliases.normalize("BENJI"), "ben");
    assert_eq!(aliases.normalize("491700000007"), "ben");
}

#[test]
fn test_group_config_optional_keys_default() {
    let group = GroupConfig::from_json_str(r#"{"jidMap": {}, "other": [], "excludeOther": true}"#).unwrap();
    assert_eq!(group.group_name, "");
    assert!(group.sender_aliases.is_empty());
    assert!(group.alias_table().is_empty());
}

#[test]
fn test_group_config_missing_required_key() {
    for json in [
        r#"{"other": [], "excludeOther": false}"#,
        r#"{"jidMap": {}, "excludeOther": false}"#,
        r#"{"jidMap": {}, "other": []}"#,
    ] {
        let result = GroupConfig::from_json_str(json);
        assert!(matches!(result, Err(ChatStatsError::Config(_))), "{json}");
    }
}

#[test]
fn test_group_config_malformed() {
    assert!(matches!(
        GroupConfig::from_json_str(r#"{"jidMap": [], "other": [], "excludeOther": false}"#),
        Err(ChatStatsError::Config(_))
    ));
    assert!(matches!(
        GroupConfig::from_json_str(r#"{"jidMap": {}, "other": [], "excludeOther": "yes"}"#),
        Err(ChatStatsError::Config(_))
    ));
    assert!(matches!(GroupConfig::from_json_str("[1, 2]"), Err(ChatStatsError::Config(_))));
    assert!(matches!(GroupConfig::from_json_str("{not json"), Err(ChatStatsError::Config(_))));
}

#[test]
fn test_group_config_from_path() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GROUP_JSON.as_bytes()).unwrap();

    let group = GroupConfig::from_path(file.path()).unwrap();
    assert_eq!(group.jid_map.len(), 3);

    let missing = file.path().with_extension("missing");
    assert!(matches!(GroupConfig::from_path(&missing), Err(ChatStatsError::Io(_))));
}
