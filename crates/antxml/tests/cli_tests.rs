// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI tests for antxml
//!
//! Flag parsing goes through `Config::try_parse_from`; end-to-end behavior
//! (output and exit status) runs the built binary.

use antxml::{Config, OutputFormat};
use antxml_collector::TestResults;
use antxml_parser::{TestStatus, TestSuite};
use clap::Parser;
use similar_asserts::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const FAILING_REPORT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<testsuite name=\"com.google.SimpleTest\" tests=\"2\" failures=\"1\" time=\"0.006\">\n\
  <testcase classname=\"com.google.SimpleTest\" name=\"testThatFails\" time=\"0.006\">\n\
    <failure message=\"expected:&lt;1&gt; but was:&lt;2&gt;\" type=\"java.lang.AssertionError\">java.lang.AssertionError\n\
\tat com.google.SimpleTest.testThatFails(SimpleTest.java:11)\n\
</failure>\n\
  </testcase>\n\
  <testcase classname=\"com.google.SimpleTest\" name=\"testThatPasses\" time=\"0\"/>\n\
</testsuite>\n";

fn write(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directories");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

fn run_to_string(config: &Config) -> anyhow::Result<String> {
    let mut out = Vec::new();
    antxml::run(config, &mut out)?;
    Ok(String::from_utf8(out).expect("Output should be UTF-8"))
}

fn antxml_command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_antxml"));
    command
        .env_remove("ANTXML_FORMAT")
        .env_remove("ANTXML_ENCODING")
        .env_remove("RUST_LOG");
    command
}

// ============================================================================
// Flag parsing
// ============================================================================

#[test]
fn test_path_is_required() {
    let err = Config::try_parse_from(["antxml"]).expect_err("Should require a path");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_extra_positional_is_rejected() {
    let result = Config::try_parse_from(["antxml", "a.xml", "b.xml"]);
    assert!(result.is_err());
}

#[test]
fn test_format_values() {
    let config =
        Config::try_parse_from(["antxml", "--format", "json", "a.xml"]).expect("parse json");
    assert_eq!(config.format, OutputFormat::Json);

    let config =
        Config::try_parse_from(["antxml", "--format", "debug", "a.xml"]).expect("parse debug");
    assert_eq!(config.format, OutputFormat::Debug);

    assert!(Config::try_parse_from(["antxml", "--format", "yaml", "a.xml"]).is_err());
}

#[test]
fn test_all_flags_together() {
    let config = Config::try_parse_from([
        "antxml",
        "--collect",
        "--encoding",
        "utf-8",
        "-v",
        "outputs",
    ])
    .expect("parse should succeed");
    assert!(config.collect);
    assert!(config.verbose);
    assert_eq!(config.encoding.as_deref(), Some("utf-8"));
    assert_eq!(config.path, PathBuf::from("outputs"));
    assert_eq!(config.log_level(), tracing::Level::DEBUG);
}

#[test]
fn test_combined_short_flags() {
    let config = Config::try_parse_from(["antxml", "-vq", "a.xml"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(config.quiet);
    // Verbose wins when both are given
    assert_eq!(config.log_level(), tracing::Level::DEBUG);
}

// ============================================================================
// Running the command in-process
// ============================================================================

#[test]
fn test_run_parses_report_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(dir.path(), "TEST-SimpleTest.xml", FAILING_REPORT.as_bytes());
    let config = Config {
        path: report,
        format: OutputFormat::Json,
        ..Default::default()
    };

    let output = run_to_string(&config).expect("Should run");
    let suites: Vec<TestSuite> = serde_json::from_str(&output).expect("Should be JSON");
    assert_eq!(suites.len(), 1);
    let cases = &suites[0].test_cases;
    assert_eq!(cases[0].status, TestStatus::Failed);
    assert_eq!(cases[1].status, TestStatus::Passed);
    assert_eq!(
        cases[0].failures[0]
            .code_references()
            .map(|r| r.path.as_str())
            .collect::<Vec<_>>(),
        vec!["com/google/SimpleTest.java"]
    );
}

#[test]
fn test_run_uses_requested_encoding() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(
        dir.path(),
        "TEST-latin1.xml",
        b"<testsuite name=\"Caf\xe9Test\"/>",
    );
    let config = Config {
        path: report,
        format: OutputFormat::Json,
        encoding: Some("windows-1252".to_string()),
        ..Default::default()
    };

    let output = run_to_string(&config).expect("Should run");
    let suites: Vec<TestSuite> = serde_json::from_str(&output).expect("Should be JSON");
    assert_eq!(suites[0].name, "CaféTest");
}

#[test]
fn test_run_collects_directory() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "build-log.txt", b"Started\n");
    write(
        dir.path(),
        "tests/target/surefire-reports/TEST-com.google.SimpleTest.xml",
        FAILING_REPORT.as_bytes(),
    );
    write(dir.path(), "tests/broken.xml", b"<one>\n</two");

    let config = Config {
        path: dir.path().to_path_buf(),
        collect: true,
        format: OutputFormat::Json,
        ..Default::default()
    };
    let output = run_to_string(&config).expect("Should run");
    let results: TestResults = serde_json::from_str(&output).expect("Should be JSON");
    assert_eq!(results.build_log, Some(dir.path().join("build-log.txt")));
    assert_eq!(results.test_suites.len(), 1);
    assert_eq!(results.failing_cases().count(), 1);
}

#[test]
fn test_run_reports_parse_errors() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(
        dir.path(),
        "nested.xml",
        b"<testsuite name=\"a\"><testsuite name=\"b\"/></testsuite>",
    );
    let config = Config {
        path: report,
        ..Default::default()
    };

    let err = run_to_string(&config).expect_err("Should fail");
    let message = format!("{err:#}");
    assert!(message.contains("Failed to parse"), "{message}");
    assert!(
        message.contains("Element <testsuite> should not contain element <testsuite>."),
        "{message}"
    );
}

// ============================================================================
// Binary behavior
// ============================================================================

#[test]
fn test_binary_without_arguments_is_a_usage_error() {
    let output = antxml_command().output().expect("Should run binary");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "{stderr}");
}

#[test]
fn test_binary_prints_debug_form() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(dir.path(), "TEST-SimpleTest.xml", FAILING_REPORT.as_bytes());

    let output = antxml_command()
        .arg("-q")
        .arg(&report)
        .output()
        .expect("Should run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("TestSuite {"), "{stdout}");
    assert!(stdout.contains("testThatFails"));
}

#[test]
fn test_binary_runtime_error_exits_with_one() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(dir.path(), "empty.xml", b"");

    let output = antxml_command()
        .arg(&report)
        .output()
        .expect("Should run binary");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No testsuites or testsuite element found."),
        "{stderr}"
    );
}

#[test]
fn test_binary_format_from_environment() {
    let dir = TempDir::new().expect("temp dir");
    let report = write(dir.path(), "TEST-SimpleTest.xml", FAILING_REPORT.as_bytes());

    let output = antxml_command()
        .env("ANTXML_FORMAT", "json")
        .arg("-q")
        .arg(&report)
        .output()
        .expect("Should run binary");
    assert!(output.status.success());
    let suites: Vec<TestSuite> =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(suites[0].name, "com.google.SimpleTest");
}
