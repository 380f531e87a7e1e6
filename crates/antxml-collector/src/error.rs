//! Error types for antxml-collector

use antxml_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a directory collection
///
/// Problems confined to a single file (unreadable file, malformed or
/// structurally invalid report) are logged and skipped instead.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The collection root could not be read
    #[error("Cannot walk {}: {source}", path.display())]
    Root {
        /// The root passed to the collector
        path: PathBuf,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },

    /// A report failed in a way that is not specific to bad input
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Report file being parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: ParseError,
    },
}
