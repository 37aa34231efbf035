//! Tests for configuration module.

use std::io::Write;

use super::*;

fn toml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}

#[test_log::test]
fn test_defaults_apply_without_file_values() {
    tracing::debug!("Testing configuration defaults");

    let file = toml_file("");
    let settings = Settings::load_from(Some(file.path())).expect("defaults should load");

    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.scheduling.timezone, "UTC");
    assert_eq!(settings.scheduling.strategy, RecurrenceStrategy::Strict);
}

#[test]
fn test_file_values_override_defaults() {
    let file = toml_file(
        r#"
[logging]
level = "trace"

[scheduling]
timezone = "Europe/Berlin"
strategy = "fluid"
"#,
    );
    let settings = Settings::load_from(Some(file.path())).expect("file should load");

    assert_eq!(settings.logging.level, "trace");
    assert_eq!(settings.scheduling.strategy, RecurrenceStrategy::Fluid);
    assert_eq!(
        settings.scheduling.zone().expect("valid zone"),
        chrono_tz::Europe::Berlin
    );
}

#[test]
fn test_unknown_timezone_is_rejected() {
    let file = toml_file(
        r#"
[scheduling]
timezone = "Mars/Olympus_Mons"
"#,
    );

    assert!(Settings::load_from(Some(file.path())).is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");

    assert!(Settings::load_from(Some(&missing)).is_err());
}

#[test]
fn test_zone_error_names_the_zone() {
    let scheduling = SchedulingConfig {
        timezone: "Nowhere/Special".to_string(),
        strategy: RecurrenceStrategy::Strict,
    };

    let err = scheduling.zone().expect_err("zone should not resolve");
    assert!(err.to_string().contains("Nowhere/Special"));
}
