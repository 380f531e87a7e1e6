// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Output rendering

use crate::config::OutputFormat;
use antxml_collector::TestResults;
use antxml_parser::TestSuite;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Write;

/// Errors that can occur while writing results
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Error serializing to JSON
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing to the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write parsed suites
///
/// The debug form prints each suite on its own; JSON prints one array.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_suites<W: Write>(
    out: &mut W,
    suites: &[TestSuite],
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Debug => {
            for suite in suites {
                writeln!(out, "{suite:#?}")?;
            }
        }
        OutputFormat::Json => write_json(out, suites)?,
    }
    Ok(())
}

/// Write the results of a directory collection
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_results<W: Write>(
    out: &mut W,
    results: &TestResults,
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Debug => write_debug(out, results),
        OutputFormat::Json => write_json(out, results),
    }
}

fn write_debug<W: Write, T: Debug + ?Sized>(out: &mut W, value: &T) -> Result<(), ReportError> {
    writeln!(out, "{value:#?}")?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use antxml_parser::{TestCase, TestStatus};
    use similar_asserts::assert_eq;
    use std::path::PathBuf;

    fn sample_suites() -> Vec<TestSuite> {
        vec![
            TestSuite {
                name: "first".to_string(),
                total_count: 1,
                test_cases: vec![TestCase {
                    name: "works".to_string(),
                    class_name: "com.example.FirstTest".to_string(),
                    status: TestStatus::Passed,
                    ..Default::default()
                }],
                ..Default::default()
            },
            TestSuite {
                name: "second".to_string(),
                ..Default::default()
            },
        ]
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), ReportError>,
    {
        let mut out = Vec::new();
        write(&mut out).expect("Should write");
        String::from_utf8(out).expect("Output should be UTF-8")
    }

    #[test]
    fn test_debug_prints_each_suite() {
        let suites = sample_suites();
        let output = render(|out| write_suites(out, &suites, OutputFormat::Debug));
        let expected = format!("{:#?}\n{:#?}\n", suites[0], suites[1]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_json_prints_one_array() {
        let suites = sample_suites();
        let output = render(|out| write_suites(out, &suites, OutputFormat::Json));
        let parsed: Vec<TestSuite> = serde_json::from_str(&output).expect("Should be JSON");
        assert_eq!(parsed, suites);
        assert!(output.ends_with("]\n"));
    }

    #[test]
    fn test_empty_suite_list() {
        assert_eq!(render(|out| write_suites(out, &[], OutputFormat::Debug)), "");
        assert_eq!(render(|out| write_suites(out, &[], OutputFormat::Json)), "[]\n");
    }

    #[test]
    fn test_results_json() {
        let results = TestResults {
            build_log: Some(PathBuf::from("logs/build-log.txt")),
            test_suites: sample_suites(),
        };
        let output = render(|out| write_results(out, &results, OutputFormat::Json));
        let parsed: TestResults = serde_json::from_str(&output).expect("Should be JSON");
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_results_debug() {
        let results = TestResults::default();
        let output = render(|out| write_results(out, &results, OutputFormat::Debug));
        assert!(output.starts_with("TestResults {"));
    }
}
