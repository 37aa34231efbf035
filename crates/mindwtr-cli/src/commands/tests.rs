use clap::Parser;
use mindwtr_core::config::{LoggingConfig, SchedulingConfig, Settings};
use serde_json::{Value, json};

use super::*;

fn settings(timezone: &str) -> Settings {
    Settings {
        logging: LoggingConfig {
            level: "info".to_string(),
        },
        scheduling: SchedulingConfig {
            timezone: timezone.to_string(),
            strategy: RecurrenceStrategy::Strict,
        },
    }
}

fn run_args(args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("mindwtr").chain(args.iter().copied()))
        .expect("valid arguments");
    run(cli.command, &settings("UTC"))
}

#[test]
fn build_weekly_days() {
    let output = run_args(&["build", "--freq", "weekly", "--by-day", "MO,WE,FR"]).expect("build");
    assert_eq!(output, "FREQ=WEEKLY;BYDAY=MO,WE,FR");
}

#[test]
fn build_monthly_variants() {
    let output = run_args(&["build", "--freq", "monthly", "--by-day=-1FR", "--interval", "2"])
        .expect("build");
    assert_eq!(output, "FREQ=MONTHLY;INTERVAL=2;BYDAY=-1FR");

    let output = run_args(&["build", "--freq", "MONTHLY", "--month-day", "31"]).expect("build");
    assert_eq!(output, "FREQ=MONTHLY;BYMONTHDAY=31");
}

#[test]
fn build_rejects_bad_input() {
    assert!(run_args(&["build", "--freq", "hourly"]).is_err());
    assert!(run_args(&["build", "--freq", "weekly", "--by-day", "MO,XX"]).is_err());
    assert!(run_args(&["build", "--freq", "weekly", "--by-day", "2TU"]).is_err());
    assert!(run_args(&["build", "--freq", "daily", "--interval", "0"]).is_err());
    assert!(
        run_args(&[
            "build",
            "--freq",
            "monthly",
            "--by-day=-1FR",
            "--month-day",
            "15"
        ])
        .is_err()
    );
}

#[test]
fn parse_prints_rule_json() {
    let output = run_args(&["parse", "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU"]).expect("parse");
    let value: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(
        value,
        json!({
            "frequency": "weekly",
            "interval": 2,
            "byDay": ["TU"],
            "byMonthDay": []
        })
    );
}

#[test_log::test]
fn parse_lenient_and_strict() {
    let output = run_args(&["parse", "garbage;;;not-a-rule"]).expect("lenient parse");
    let value: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(value["frequency"], Value::Null);

    let err = run_args(&["parse", "--strict", "garbage;;;not-a-rule"]).expect_err("strict parse");
    assert!(err.to_string().contains("clause 1"));
}

#[test]
fn next_strict_and_fluid() {
    let output = run_args(&[
        "next",
        "--anchor",
        "2024-01-03",
        "--rule",
        "FREQ=WEEKLY;BYDAY=MO,WE,FR",
        "--completed-at",
        "2024-01-20",
    ])
    .expect("next");
    assert_eq!(output, "2024-01-05");

    let output = run_args(&[
        "next",
        "--anchor",
        "2024-01-10",
        "--rule",
        "FREQ=MONTHLY",
        "--strategy",
        "fluid",
        "--completed-at",
        "2024-03-15T12:00:00Z",
    ])
    .expect("next");
    assert_eq!(output, "2024-04-15");
}

#[test]
fn next_rejects_unusable_rule() {
    assert!(run_args(&["next", "--anchor", "2024-01-03", "--rule", "garbage"]).is_err());
    let bad_strategy = Cli::try_parse_from([
        "mindwtr",
        "next",
        "--anchor",
        "2024-01-03",
        "--rule",
        "FREQ=DAILY",
        "--strategy",
        "lazy",
    ]);
    assert!(bad_strategy.is_err());
}

#[test]
fn normalize_legacy_and_null() {
    let output = run_args(&["normalize", r#""weekly""#]).expect("normalize");
    let value: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(
        value,
        json!({ "rule": "weekly", "strategy": "strict", "rrule": "FREQ=WEEKLY" })
    );

    let output = run_args(&["normalize", r#"{"rrule":"nonsense"}"#]).expect("normalize");
    assert_eq!(output, "null");

    assert!(run_args(&["normalize", "not json"]).is_err());
}

#[test]
fn complete_updates_data_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    let data = json!({
        "tasks": [{
            "id": "water",
            "title": "Water plants",
            "status": "next",
            "dueDate": "2024-01-31",
            "recurrence": "monthly"
        }],
        "settings": {}
    });
    std::fs::write(&path, data.to_string()).expect("write data");

    let output = run_args(&[
        "complete",
        "--data",
        path.to_str().expect("utf-8 path"),
        "--task",
        "water",
        "--at",
        "2024-01-31T18:00:00Z",
    ])
    .expect("complete");
    assert_eq!(output, "water: rescheduled to 2024-02-29");

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read back")).expect("json");
    assert_eq!(written["tasks"][0]["dueDate"], "2024-02-29");
    assert_eq!(written["tasks"][0]["recurrence"]["rrule"], "FREQ=MONTHLY");
    assert_eq!(written["tasks"][0]["updatedAt"], "2024-01-31T18:00:00.000Z");
}

#[test]
fn complete_unknown_task_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    std::fs::write(&path, r#"{"tasks":[]}"#).expect("write data");

    let err = run_args(&[
        "complete",
        "--data",
        path.to_str().expect("utf-8 path"),
        "--task",
        "missing",
    ])
    .expect_err("unknown task");
    assert!(err.to_string().contains("missing"));
}

#[test]
fn unknown_configured_zone_fails() {
    let cli =
        Cli::try_parse_from(["mindwtr", "build", "--freq", "daily"]).expect("valid arguments");
    assert!(run(cli.command, &settings("Mars/Olympus_Mons")).is_err());
}
