//! Test result model
//!
//! Plain data records produced by the parser. Records are built once while
//! the matching element is open and never mutated afterwards.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A `<testsuite>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Value of the `tests` attribute
    pub total_count: i32,
    /// Value of the `errors` attribute
    pub error_count: i32,
    /// Value of the `failures` attribute
    pub failure_count: i32,
    /// Value of the `skipped` attribute
    pub skipped_count: i32,
    /// Elapsed time in whole milliseconds
    pub elapsed_time_millis: i64,
    /// Host the suite ran on, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Start time of the suite, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    /// Properties in document order
    pub properties: Vec<Property>,
    /// Test cases in document order
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    /// Cases that ended in FAILED or ERROR
    #[must_use]
    pub fn failing_cases(&self) -> Vec<&TestCase> {
        self.test_cases.iter().filter(|c| c.is_failure()).collect()
    }

    /// Number of cases that passed
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.test_cases
            .iter()
            .filter(|c| c.status == TestStatus::Passed)
            .count()
    }
}

/// A `<property>` of a suite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

/// Terminal status of a test case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// No failure, error or skip was recorded
    #[default]
    Passed,
    /// An assertion failed
    Failed,
    /// An unexpected exception was thrown
    Error,
    /// The test did not run
    Skipped,
}

/// A `<testcase>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test method name
    pub name: String,
    /// Fully qualified class name
    pub class_name: String,
    /// Elapsed time in whole milliseconds
    pub elapsed_time_millis: i64,
    /// Status of the last `<failure>`, `<error>` or `<skipped>` child seen
    pub status: TestStatus,
    /// Reason given by `<skipped>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_message: Option<String>,
    /// One entry per `<failure>` child
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StackTrace>,
    /// The `<error>` child, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StackTrace>,
}

impl TestCase {
    /// Check if the case failed or errored
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Error)
    }

    /// All stack traces of the case, failures first
    pub fn stack_traces(&self) -> impl Iterator<Item = &StackTrace> {
        self.failures.iter().chain(self.error.iter())
    }
}

/// Body of a `<failure>` or `<error>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTrace {
    /// Value of the `message` attribute
    pub exception_message: String,
    /// Value of the `type` attribute
    pub exception_type: String,
    /// Element body exactly as it appeared in the report
    pub content: String,
    /// `content` split into text and code references
    pub stack_content: Vec<StackContent>,
}

impl StackTrace {
    /// Concatenate the original text of every segment
    ///
    /// For a parsed trace this always equals [`StackTrace::content`].
    #[must_use]
    pub fn reconstruct(&self) -> String {
        self.stack_content.iter().map(StackContent::text).collect()
    }

    /// Code references in the order they appear
    pub fn code_references(&self) -> impl Iterator<Item = &CodeReference> {
        self.stack_content.iter().filter_map(|segment| match segment {
            StackContent::CodeReference(reference) => Some(reference),
            StackContent::Text(_) => None,
        })
    }
}

/// One segment of a decomposed stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackContent {
    /// Text that is not a code reference
    Text(String),
    /// A resolved `file:line` reference
    CodeReference(CodeReference),
}

impl StackContent {
    /// The original text covered by this segment
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::CodeReference(reference) => &reference.text,
        }
    }
}

/// A source location extracted from a stack frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeReference {
    /// The `File.java:88` text as it appeared in the frame
    pub text: String,
    /// Package directory joined with the file name, e.g. `org/junit/Assert.java`
    pub path: String,
    /// Line number, always positive
    pub line_number: u32,
}
