// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! antxml-parser: Ant XML test report parsing
//!
//! This library crate parses the XML reports written by Ant's JUnit task
//! (and the many tools that copy its format) into plain test result records.
//! Failure and error bodies are split into text and resolved `file:line`
//! code references so that stack frames can be linked back to source files.
//!
//! # Example
//!
//! ```
//! use antxml_parser::{AntXmlParser, TestStatus};
//!
//! let xml = concat!(
//!     r#"<testsuite name="com.example.MathTest" tests="1" failures="1" time="0.006">"#,
//!     r#"<testcase name="adds" classname="com.example.MathTest" time="0.006">"#,
//!     r#"<failure type="java.lang.AssertionError">java.lang.AssertionError"#,
//!     "\n\tat com.example.MathTest.adds(MathTest.java:12)\n",
//!     "</failure></testcase></testsuite>",
//! );
//!
//! let suites = AntXmlParser::new().parse_str(xml).unwrap();
//! let case = &suites[0].test_cases[0];
//! assert_eq!(case.status, TestStatus::Failed);
//!
//! let reference = case.failures[0].code_references().next().unwrap();
//! assert_eq!(reference.path, "com/example/MathTest.java");
//! assert_eq!(reference.line_number, 12);
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod stack;
pub mod tokenizer;

pub use error::{ErrorKind, ParseError};
pub use model::{CodeReference, Property, StackContent, StackTrace, TestCase, TestStatus, TestSuite};
pub use parser::{AntXmlParser, ParseOptions, parse};
pub use stack::{StackDecomposer, decompose};
pub use tokenizer::EntityPolicy;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ParseError;
    pub use crate::model::{StackContent, StackTrace, TestCase, TestStatus, TestSuite};
    pub use crate::parser::{AntXmlParser, ParseOptions};
}
