// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Directory-based report collection
//!
//! CI jobs typically upload a build log next to one or more directories of
//! JUnit reports, for example:
//!
//! ```text
//! 012345/
//!   build-log.txt
//!   tests/target/surefire-reports/TEST-com.google.Something.xml
//! ```
//!
//! [`DirectoryCollector`] walks such a tree and gathers everything into a
//! single [`TestResults`].

use crate::error::CollectError;
use antxml_parser::{AntXmlParser, ParseOptions, TestCase, TestSuite};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default file name of the build log
pub const DEFAULT_BUILD_LOG_NAME: &str = "build-log.txt";

/// Default marker a path component must contain for reports to be picked up
pub const DEFAULT_TEST_DIR_MARKER: &str = "test";

/// Default report file extension
pub const DEFAULT_REPORT_EXTENSION: &str = ".xml";

/// Everything found under a collection root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    /// Path of the build log, if one was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_log: Option<PathBuf>,
    /// Suites of every successfully parsed report, in walk order
    pub test_suites: Vec<TestSuite>,
}

impl TestResults {
    /// Total number of test cases across all suites
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.test_suites.iter().map(|s| s.test_cases.len()).sum()
    }

    /// Failed and errored cases across all suites, with their suite
    pub fn failing_cases(&self) -> impl Iterator<Item = (&TestSuite, &TestCase)> {
        self.test_suites.iter().flat_map(|suite| {
            suite
                .test_cases
                .iter()
                .filter(|case| case.is_failure())
                .map(move |case| (suite, case))
        })
    }
}

/// Rules for recognizing files during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Exact file name of the build log
    pub build_log_name: String,
    /// Substring one path component must contain for a report to count
    pub test_dir_marker: String,
    /// Suffix a report file name must end with
    pub report_extension: String,
    /// Options passed to the report parser
    pub parse_options: ParseOptions,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            build_log_name: DEFAULT_BUILD_LOG_NAME.to_string(),
            test_dir_marker: DEFAULT_TEST_DIR_MARKER.to_string(),
            report_extension: DEFAULT_REPORT_EXTENSION.to_string(),
            parse_options: ParseOptions::default(),
        }
    }
}

impl CollectorOptions {
    /// Set the build log file name
    #[must_use]
    pub fn with_build_log_name(mut self, name: impl Into<String>) -> Self {
        self.build_log_name = name.into();
        self
    }

    /// Set the test directory marker
    #[must_use]
    pub fn with_test_dir_marker(mut self, marker: impl Into<String>) -> Self {
        self.test_dir_marker = marker.into();
        self
    }

    /// Set the report file extension
    #[must_use]
    pub fn with_report_extension(mut self, extension: impl Into<String>) -> Self {
        self.report_extension = extension.into();
        self
    }

    /// Set the parser options
    #[must_use]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }
}

/// Walks a directory tree and parses every report it finds
#[derive(Debug, Clone, Default)]
pub struct DirectoryCollector {
    parser: AntXmlParser,
    options: CollectorOptions,
}

impl DirectoryCollector {
    /// Create a collector with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector with the given options
    #[must_use]
    pub fn with_options(options: CollectorOptions) -> Self {
        Self {
            parser: AntXmlParser::with_options(options.parse_options),
            options,
        }
    }

    /// Options used by this collector
    #[must_use]
    pub fn options(&self) -> &CollectorOptions {
        &self.options
    }

    /// Walk `root` and collect the build log and all report suites
    ///
    /// Entries are visited in file-name order. When several build logs are
    /// present, the last one visited is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Root`] if `root` itself cannot be read, and
    /// [`CollectError::Parse`] if a report fails with a non-recoverable
    /// parse error. Unreadable entries and malformed reports are logged and
    /// skipped.
    pub fn collect(&self, root: impl AsRef<Path>) -> Result<TestResults, CollectError> {
        let root = root.as_ref();
        info!(root = %root.display(), "Collecting test results");

        let mut results = TestResults::default();
        let mut reports = 0usize;
        let mut skipped = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(CollectError::Root {
                        path: root.to_path_buf(),
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.is_build_log(path) {
                debug!(path = %path.display(), "Found build log");
                results.build_log = Some(path.to_path_buf());
            }
            if self.is_report(path) {
                reports += 1;
                match self.parse_report(path)? {
                    Some(suites) => results.test_suites.extend(suites),
                    None => skipped += 1,
                }
            }
        }

        info!(
            reports,
            skipped,
            suites = results.test_suites.len(),
            build_log = results.build_log.is_some(),
            "Collected test results"
        );
        Ok(results)
    }

    fn is_build_log(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name == self.options.build_log_name.as_str())
    }

    /// A report has the report extension and sits under a test directory
    fn is_report(&self, path: &Path) -> bool {
        let has_extension = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.options.report_extension));
        has_extension
            && path.components().any(|component| {
                component
                    .as_os_str()
                    .to_string_lossy()
                    .contains(&self.options.test_dir_marker)
            })
    }

    /// Parse one report, returning `None` if it was skipped
    fn parse_report(&self, path: &Path) -> Result<Option<Vec<TestSuite>>, CollectError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to open report");
                return Ok(None);
            }
        };

        match self.parser.parse(file, encoding_rs::UTF_8) {
            Ok(suites) => {
                debug!(path = %path.display(), suites = suites.len(), "Parsed report");
                Ok(Some(suites))
            }
            Err(err) if err.is_recoverable() => {
                warn!(path = %path.display(), error = %err, "Failed to parse report, skipping");
                Ok(None)
            }
            Err(source) => Err(CollectError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
