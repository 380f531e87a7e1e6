// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for antxml-parser

use thiserror::Error;

/// Errors that can occur while parsing an Ant XML report
///
/// Every variant aborts the parse of the current document; no partial suite
/// list is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum ParseError {
    /// An element appeared where the report grammar does not allow it
    #[error("Element <{parent}> should not contain element <{child}>.")]
    UnexpectedElement {
        /// The enclosing element (`root` for the document itself)
        parent: String,
        /// The offending child element
        child: String,
    },

    /// The document has neither a `<testsuites>` nor a `<testsuite>` root
    #[error("No testsuites or testsuite element found.")]
    NoRootElement,

    /// The tokenizer rejected the document at a known position
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed {
        /// Byte offset into the input where the problem was detected
        position: u64,
        /// Description of the syntax or encoding problem
        message: String,
    },

    /// The tokenizer failed without position information
    #[error("Tokenizer failure: {0}")]
    Tokenization(#[source] std::io::Error),

    /// A numeric attribute could not be parsed
    #[error("Invalid value {value:?} for attribute '{attribute}' of <{element}>")]
    AttributeFormat {
        /// Element carrying the attribute
        element: String,
        /// Attribute name
        attribute: String,
        /// Raw attribute value
        value: String,
    },
}

/// Coarse classification of [`ParseError`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Grammar violation or missing root element
    StructuralViolation,
    /// Syntax error reported with a source position
    MalformedDocument,
    /// Tokenizer-level failure without a position
    TokenizationFailure,
    /// Numeric attribute that does not parse
    AttributeFormat,
}

impl ParseError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedElement { .. } | Self::NoRootElement => ErrorKind::StructuralViolation,
            Self::Malformed { .. } => ErrorKind::MalformedDocument,
            Self::Tokenization(_) => ErrorKind::TokenizationFailure,
            Self::AttributeFormat { .. } => ErrorKind::AttributeFormat,
        }
    }

    /// Whether the error describes bad input that a batch caller may log and skip
    ///
    /// Attribute format and tokenization failures are treated as unexpected
    /// and should be propagated instead.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StructuralViolation | ErrorKind::MalformedDocument
        )
    }

    pub(crate) fn unexpected_element(parent: &str, child: &str) -> Self {
        Self::UnexpectedElement {
            parent: parent.to_string(),
            child: child.to_string(),
        }
    }
}
