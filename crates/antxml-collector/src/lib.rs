// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! antxml-collector: Test report discovery for CI output directories
//!
//! Walks a directory tree, records the build log and parses every Ant XML
//! report found under a test directory. A broken report is logged and
//! skipped so that one bad file never hides the results of the others.
//!
//! ```rust,no_run
//! use antxml_collector::DirectoryCollector;
//!
//! let results = DirectoryCollector::new().collect("build/outputs").expect("collect");
//! for (suite, case) in results.failing_cases() {
//!     println!("{}: {}.{}", suite.name, case.class_name, case.name);
//! }
//! ```

#![warn(missing_docs)]

pub mod collector;
pub mod error;

pub use collector::{CollectorOptions, DirectoryCollector, TestResults};
pub use error::CollectError;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collector::{CollectorOptions, DirectoryCollector, TestResults};
    pub use crate::error::CollectError;
}
