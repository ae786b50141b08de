use std::fs;
use tempfile::tempdir;

use chat_stats::config::GroupConfig;
use chat_stats::export::{write_report, ExportFormat};
use chat_stats::loader::TableLoader;
use chat_stats::reader::read_messages;
use chat_stats::report::{DashboardReport, ReportOptions};

// 2024-01-01T00:00:00Z
const JAN_1: i64 = 1_704_067_200_000;
const DAY: i64 = 86_400_000;

fn group() -> GroupConfig {
    GroupConfig::from_json_str(
        r#"{
            "groupName": "Book club",
            "jidMap": {"1": "Ana", "2": "Ben", "3": "Cleo"},
            "other": [],
            "excludeOther": false,
            "senderAliases": {"Ben": ["Benji", "491700000002"]}
        }"#,
    )
    .unwrap()
}

fn report(csv: &str) -> DashboardReport {
    let raw = read_messages(csv.as_bytes()).unwrap();
    let config = group();
    let table = TableLoader::new(&config).load(raw).unwrap();
    DashboardReport::build(&table, &config, &ReportOptions::default()).unwrap()
}

fn enriched_export() -> String {
    let rows = [
        ("1", 0, "0", "chapter 3 was great benji 😀👍", "positive", "0.9"),
        ("1", 1, "0", "see https://example.org/review", "neutral", "0.2"),
        ("2", 2, "1", "", "neutral", "0.1"),
        ("2", 40, "0", "@491700000002 ha me", "negative", "0.6"),
        ("3", 70, "20", "", "", ""),
        ("3", 71, "0", "Ana 🎉🎉", "positive", "0.8"),
    ];
    let mut csv = String::from("sender_jid_row_id,timestamp,message_type,text_data,sentiment,score\n");
    for (sender, day, kind, text, sentiment, score) in rows {
        csv.push_str(&format!(
            "{sender},{},{kind},{text},{sentiment},{score}\n",
            JAN_1 + day * DAY
        ));
    }
    csv
}

#[test]
fn test_report_sections() {
    let report = report(&enriched_export());

    assert_eq!(report.group_name, "Book club");
    assert_eq!(report.total_messages, 6);
    assert_eq!(report.participants, vec!["Ana", "Ben", "Cleo"]);
    assert_eq!(report.podium, vec!["Ana", "Ben", "Cleo"]);
    assert_eq!(report.weekly_activity.len(), 7);
    assert_eq!(report.weekly_activity_by_user.len(), 3);

    let mentions = report.mentions.as_ref().unwrap();
    assert_eq!(mentions.get("ana", "ben"), Some(1));
    assert_eq!(mentions.get("cleo", "ana"), Some(1));
    // A sender naming their own handle is not a mention
    assert_eq!(mentions.get("ben", "ben"), Some(0));

    assert_eq!(report.top_link_sender.as_deref(), Some("Ana"));
    assert_eq!(report.top_media_senders.get("image").map(String::as_str), Some("Ben"));
    assert_eq!(report.top_media_senders.get("sticker").map(String::as_str), Some("Cleo"));
    assert!(!report.top_media_senders.contains_key("map"));

    let sentiment = report.sentiment.as_ref().unwrap();
    assert_eq!(sentiment.ratios.len(), 6);
    assert!(sentiment.monthly_average.iter().all(|s| s.sender_name == "average"));
}

#[test]
fn test_text_sections_skipped_without_text() {
    let csv = format!(
        "sender_jid_row_id,timestamp,message_type\n1,{JAN_1},0\n2,{},13\n",
        JAN_1 + DAY
    );
    let report = report(&csv);

    assert_eq!(report.total_messages, 2);
    assert!(report.average_message_length.is_none());
    assert!(report.emoji_density.is_none());
    assert!(report.mentions.is_none());
    assert!(report.link_messages.is_none());
    assert!(report.top_link_sender.is_none());
    assert!(report.sentiment.is_none());
    assert_eq!(report.top_media_senders.get("image").map(String::as_str), Some("Ben"));
}

#[test]
fn test_write_json_report() {
    let report = report(&enriched_export());
    let dir = tempdir().unwrap();

    let written = write_report(&report, dir.path(), ExportFormat::Json).unwrap();
    assert_eq!(written, vec![dir.path().join("report.json")]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(json["group_name"], "Book club");
    assert_eq!(json["total_messages"], 6);
    assert_eq!(json["message_count"][0]["sender_name"], "Ana");
    assert_eq!(json["monthly_activity"][0]["month_year"], "2024-01");
    assert_eq!(json["sentiment"]["ratios"][0]["sentiment"], "positive_ratio");
}

#[test]
fn test_write_csv_tables() {
    let report = report(&enriched_export());
    let dir = tempdir().unwrap();
    let out = dir.path().join("nested").join("out");

    let written = write_report(&report, &out, ExportFormat::Csv).unwrap();
    assert_eq!(written[0], out.join("report.json"));
    for name in ["message_count.csv", "monthly_activity.csv", "mentions.csv", "top_emojis.csv"] {
        assert!(written.contains(&out.join(name)), "missing {name}");
    }

    let counts = fs::read_to_string(out.join("message_count.csv")).unwrap();
    let mut lines = counts.lines();
    assert_eq!(lines.next(), Some("sender_name,count"));
    assert_eq!(lines.next(), Some("Ana,2"));

    let activity = fs::read_to_string(out.join("monthly_activity.csv")).unwrap();
    assert_eq!(activity.lines().next(), Some("month_year,user,message_count"));
    // Jan..Mar for three users
    assert_eq!(activity.lines().count(), 1 + 3 * 3);

    let emojis = fs::read_to_string(out.join("top_emojis.csv")).unwrap();
    assert_eq!(emojis.lines().next(), Some("sender_name,1.,2."));
    assert!(emojis.lines().any(|l| l == "Cleo,🎉,"));
}

#[test]
fn test_empty_export_writes_headers() {
    let report = report("sender_jid_row_id,timestamp,message_type,text_data\n");
    assert_eq!(report.total_messages, 0);
    assert!(report.podium.is_empty());

    let dir = tempdir().unwrap();
    write_report(&report, dir.path(), ExportFormat::Csv).unwrap();

    let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("message_count.csv"), "sender_name,count\n");
    assert_eq!(read("monthly_activity.csv"), "month_year,user,message_count\n");
    assert_eq!(read("weekly_activity.csv"), "weekday,count\n");
    assert_eq!(read("mentions.csv"), "sender,mentioned,count\n");
    assert_eq!(read("top_emojis.csv"), "sender_name\n");
}
