// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stack trace decomposition
//!
//! Splits the body of a `<failure>` or `<error>` element into text segments
//! and code references. Only frames of the form
//! `<TAB>at package.Class.method(File.java:42)` are resolved; every other
//! line is kept verbatim.
//!
//! # Example
//!
//! ```
//! use antxml_parser::model::StackContent;
//! use antxml_parser::stack::decompose;
//!
//! let segments = decompose("boom\n\tat org.junit.Assert.fail(Assert.java:88)\n");
//! assert_eq!(segments.len(), 3);
//! match &segments[1] {
//!     StackContent::CodeReference(r) => assert_eq!(r.path, "org/junit/Assert.java"),
//!     other => panic!("unexpected segment {other:?}"),
//! }
//! ```

use crate::model::{CodeReference, StackContent};

/// Prefix of every resolvable frame line
pub const FRAME_PREFIX: &str = "\tat ";

/// Result of classifying a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// The line is not a resolvable frame
    Text(&'a str),
    /// The line is a frame with a `file:line` location
    Frame {
        /// Line text up to and including `(`
        leading: &'a str,
        /// The resolved location
        reference: CodeReference,
        /// Line text from `)` to the end of the line
        trailing: &'a str,
    },
}

/// Classify one line of a stack trace
///
/// `line` must not contain its line terminator. Any line that does not fully
/// resolve comes back as [`LineClass::Text`] holding the whole line.
#[must_use]
pub fn classify_line(line: &str) -> LineClass<'_> {
    match resolve_frame(line) {
        Some((open, close, reference)) => LineClass::Frame {
            leading: &line[..=open],
            reference,
            trailing: &line[close..],
        },
        None => LineClass::Text(line),
    }
}

/// Returns the byte offsets of the last `(` and `)` plus the resolved reference
fn resolve_frame(line: &str) -> Option<(usize, usize, CodeReference)> {
    if !line.starts_with(FRAME_PREFIX) {
        return None;
    }
    let open = line.rfind('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }

    let file_and_line = &line[open + 1..close];
    let (file_name, number) = file_and_line.split_once(':')?;
    if file_name.is_empty() || number.contains(':') {
        return None;
    }
    let line_number = parse_line_number(number)?;

    // "package.Class.method"; the method name itself is not needed
    let class_and_method = &line[FRAME_PREFIX.len()..open];
    let (class_name, _method) = class_and_method.rsplit_once('.')?;
    let path = match class_name.rsplit_once('.') {
        Some((package, _simple_name)) => format!("{}/{}", package.replace('.', "/"), file_name),
        None => file_name.to_string(),
    };

    Some((
        open,
        close,
        CodeReference {
            text: file_and_line.to_string(),
            path,
            line_number,
        },
    ))
}

fn parse_line_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Split a line produced by `split_inclusive('\n')` into body and terminator
fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, &raw[body.len()..])
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, &raw[body.len()..])
    } else {
        (raw, "")
    }
}

// ============================================================================
// Decomposer
// ============================================================================

/// Incremental stack trace decomposer
///
/// Lines are fed one at a time together with their terminator; text between
/// code references is buffered so adjacent text lines end up in one segment.
#[derive(Debug, Default)]
pub struct StackDecomposer {
    segments: Vec<StackContent>,
    pending: String,
}

impl StackDecomposer {
    /// Create an empty decomposer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one line
    ///
    /// `terminator` is the line ending that followed `line` in the input
    /// (`"\n"`, `"\r\n"`, or `""` for an unterminated last line).
    pub fn push_line(&mut self, line: &str, terminator: &str) {
        match classify_line(line) {
            LineClass::Frame {
                leading,
                reference,
                trailing,
            } => {
                self.pending.push_str(leading);
                self.flush();
                self.segments.push(StackContent::CodeReference(reference));
                self.pending.push_str(trailing);
            }
            LineClass::Text(text) => self.pending.push_str(text),
        }
        self.pending.push_str(terminator);
    }

    /// Segments emitted so far, excluding buffered text
    #[must_use]
    pub fn segments(&self) -> &[StackContent] {
        &self.segments
    }

    /// Flush buffered text and return all segments
    #[must_use]
    pub fn finish(mut self) -> Vec<StackContent> {
        self.flush();
        self.segments
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.segments
                .push(StackContent::Text(std::mem::take(&mut self.pending)));
        }
    }
}

/// Decompose a complete stack trace body
///
/// Concatenating the text of the returned segments reproduces `content`
/// exactly.
#[must_use]
pub fn decompose(content: &str) -> Vec<StackContent> {
    let mut decomposer = StackDecomposer::new();
    for raw in content.split_inclusive('\n') {
        let (line, terminator) = split_terminator(raw);
        decomposer.push_line(line, terminator);
    }
    decomposer.finish()
}
