#![cfg(unix)]

mod common;

use std::{
    path::Path,
    time::{Duration, Instant}
};

use common::{
    CLEAN, ECHO_DIALECT, ECHO_SQL, FAIL_WITH_PATH, FakeLinter, HANG, ONE_VIOLATION, RECORD_AND_HANG
};
use sql_lint_gateway::{
    error::{AppErrorKind, error_message},
    linter::{SqlFluff, parse_output, summarize, validate_dialect}
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_lint_parses_violations() {
    let fake = FakeLinter::new(ONE_VIOLATION);
    let reports = fake
        .linter(TIMEOUT)
        .lint("select  1", "ansi")
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].violations.len(), 1);
    assert_eq!(reports[0].violations[0].code.as_deref(), Some("LT01"));
    assert_eq!(
        summarize(&reports),
        vec!["Line 1: Expected only single space. (Code: LT01)".to_string()]
    );
}

#[tokio::test]
async fn test_lint_passes_dialect_argument() {
    let fake = FakeLinter::new(ECHO_DIALECT);
    let reports = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "postgres")
        .await
        .unwrap();

    assert_eq!(reports[0].violations[0].code.as_deref(), Some("postgres"));
}

#[tokio::test]
async fn test_lint_stages_sql_in_file() {
    let fake = FakeLinter::new(ECHO_SQL);
    let reports = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap();

    assert_eq!(
        reports[0].violations[0].description.as_deref(),
        Some("SELECT 1")
    );
    let path = reports[0].filepath.as_deref().unwrap();
    assert!(path.ends_with(".sql"));
}

#[tokio::test]
async fn test_temp_file_removed_after_lint() {
    let fake = FakeLinter::new(ONE_VIOLATION);
    let reports = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap();

    let path = reports[0].filepath.clone().unwrap();
    assert!(!Path::new(&path).exists());
}

#[tokio::test]
async fn test_temp_file_removed_after_failure() {
    let fake = FakeLinter::new(FAIL_WITH_PATH);
    let err = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap_err();

    let msg = error_message(&err);
    assert!(msg.contains("exit code 70"));
    let path = msg.rsplit(": ").next().unwrap().trim();
    assert!(path.ends_with(".sql"));
    assert!(!Path::new(path).exists());
}

#[tokio::test]
async fn test_temp_file_removed_after_timeout() {
    let fake = FakeLinter::new(RECORD_AND_HANG);
    let err = fake
        .linter(Duration::from_millis(500))
        .lint("SELECT 1", "ansi")
        .await
        .unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Timeout);

    let recorded = std::fs::read_to_string(fake.dir().join("staged")).unwrap();
    let path = recorded.trim();
    assert!(path.ends_with(".sql"));
    assert!(!Path::new(path).exists());
}

#[tokio::test]
async fn test_clean_run() {
    let fake = FakeLinter::new(CLEAN);
    let reports = fake
        .linter(TIMEOUT)
        .lint("SELECT id FROM users\n", "ansi")
        .await
        .unwrap();

    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_empty_output_means_no_reports() {
    let fake = FakeLinter::new("exit 0\n");
    let reports = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap();

    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_unexpected_exit_code_is_failure() {
    let fake = FakeLinter::new("echo 'dialect not found' >&2\nexit 2\n");
    let err = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Internal);
    let msg = error_message(&err);
    assert!(msg.contains("Linter process failed"));
    assert!(msg.contains("exit code 2"));
    assert!(msg.contains("dialect not found"));
}

#[tokio::test]
async fn test_invalid_json_output() {
    let fake = FakeLinter::new("echo 'not json'\nexit 1\n");
    let err = fake
        .linter(TIMEOUT)
        .lint("SELECT 1", "ansi")
        .await
        .unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Internal);
    let msg = error_message(&err);
    assert!(msg.contains("Failed to parse linter JSON output"));
    assert!(msg.contains("not json"));
}

#[tokio::test]
async fn test_timeout_kills_linter() {
    let fake = FakeLinter::new(HANG);
    let started = Instant::now();
    let err = fake
        .linter(Duration::from_millis(200))
        .lint("SELECT 1", "ansi")
        .await
        .unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Timeout);
    assert!(error_message(&err).contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_missing_linter_binary() {
    let linter = SqlFluff::new(
        &["/nonexistent/bin/sqlfluff".to_string()],
        TIMEOUT
    )
    .unwrap();
    let err = linter.lint("SELECT 1", "ansi").await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Internal);
    assert!(error_message(&err).contains("Failed to start linter"));
}

#[tokio::test]
async fn test_invalid_dialect_rejected_before_spawn() {
    let linter = SqlFluff::new(
        &["/nonexistent/bin/sqlfluff".to_string()],
        TIMEOUT
    )
    .unwrap();
    let err = linter.lint("SELECT 1", "--rules").await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::BadRequest);
}

#[test]
fn test_empty_command_rejected() {
    assert!(SqlFluff::new(&[], TIMEOUT).is_err());
}

#[test]
fn test_command_with_leading_args() {
    let command = vec![
        "python".to_string(),
        "-m".to_string(),
        "sqlfluff".to_string(),
    ];
    let linter = SqlFluff::new(&command, TIMEOUT).unwrap();
    assert_eq!(linter.program(), "python");
    assert_eq!(linter.timeout(), TIMEOUT);
}

#[test]
fn test_validate_dialect() {
    assert!(validate_dialect("ansi").is_ok());
    assert!(validate_dialect("sparksql").is_ok());
    assert!(validate_dialect("my_dialect2").is_ok());
    assert!(validate_dialect("").is_err());
    assert!(validate_dialect("-x").is_err());
    assert!(validate_dialect("ansi postgres").is_err());
}

#[test]
fn test_parse_output_start_line_no() {
    let reports = parse_output(
        r#"[{"filepath":"a.sql","violations":[{"start_line_no":3,"start_line_pos":1,"code":"AM04","description":"Query produces an unknown number of result columns.","name":"ambiguous.column_count","warning":false}]}]"#
    )
    .unwrap();

    assert_eq!(
        summarize(&reports),
        vec![
            "Line 3: Query produces an unknown number of result columns. (Code: AM04)"
                .to_string()
        ]
    );
}

#[test]
fn test_parse_output_missing_fields() {
    let reports = parse_output(r#"[{"violations":[{}]}]"#).unwrap();
    assert_eq!(
        summarize(&reports),
        vec!["Line ?: Unknown (Code: N/A)".to_string()]
    );
}

#[test]
fn test_parse_output_multiple_files() {
    let reports = parse_output(
        r#"[{"filepath":"a.sql","violations":[{"line_no":1,"code":"A","description":"a"}]},
            {"filepath":"b.sql","violations":[]},
            {"filepath":"c.sql","violations":[{"line_no":2,"code":"C","description":"c"}]}]"#
    )
    .unwrap();

    let details = summarize(&reports);
    assert_eq!(details.len(), 2);
    assert_eq!(details[1], "Line 2: c (Code: C)");
}

#[test]
fn test_parse_output_whitespace_only() {
    assert!(parse_output("  \n").unwrap().is_empty());
}
