// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Hardened pull tokenizer
//!
//! A thin adapter over `quick-xml`'s pull reader that yields owned tokens
//! (start element, end element, character data, end of document) decoded
//! from the caller's character encoding.
//!
//! The reader never loads an external DTD and never dereferences an external
//! entity. Besides the five predefined entities and numeric character
//! references, only general entities declared with a literal value in the
//! document's internal subset are expanded. Any other reference is
//! unresolved; [`EntityPolicy`] decides whether it is dropped or rejected.

use crate::error::ParseError;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do with an entity reference that cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityPolicy {
    /// Expand the reference to nothing
    #[default]
    Drop,
    /// Fail the parse with a malformed-document error
    Reject,
}

/// Per-call tokenizer configuration
#[derive(Debug, Clone, Copy)]
pub struct TokenizerConfig {
    /// Character encoding of the input bytes
    pub encoding: &'static Encoding,
    /// Handling of undeclared and external entity references
    pub unresolved_entities: EntityPolicy,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            unresolved_entities: EntityPolicy::default(),
        }
    }
}

/// A single tokenizer event with owned data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An opening tag with its attributes in document order
    Start {
        /// Element name
        name: String,
        /// `(name, value)` pairs, unescaped
        attributes: Vec<(String, String)>,
    },
    /// A closing tag
    End {
        /// Element name
        name: String,
    },
    /// Character data, unescaped (CDATA sections included verbatim)
    Text(String),
    /// End of the document
    Eof,
}

/// Longest replacement text accepted for an internal entity
const MAX_ENTITY_LEN: usize = 64 * 1024;

/// Pull tokenizer over a byte stream
pub struct Tokenizer<'a> {
    reader: Reader<Box<dyn BufRead + 'a>>,
    config: TokenizerConfig,
    buf: Vec<u8>,
    pending_end: Option<String>,
    entities: HashMap<String, String>,
}

impl<'a> Tokenizer<'a> {
    /// Open a tokenizer on `input`
    ///
    /// ASCII-compatible encodings are decoded as tokens are produced. Other
    /// encodings (UTF-16) are transcoded to UTF-8 up front.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Tokenization` if the input cannot be read while
    /// transcoding, and `ParseError::Malformed` if it is not valid in the
    /// declared encoding.
    pub fn open<R: Read + 'a>(input: R, config: TokenizerConfig) -> Result<Self, ParseError> {
        if config.encoding.is_ascii_compatible() {
            return Ok(Self::from_buf_read(Box::new(BufReader::new(input)), config));
        }

        debug!(
            encoding = config.encoding.name(),
            "Transcoding input to UTF-8"
        );
        let mut input = input;
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(ParseError::Tokenization)?;
        let (text, had_errors) = config.encoding.decode_with_bom_removal(&bytes);
        if had_errors {
            return Err(ParseError::Malformed {
                position: 0,
                message: format!("input is not valid {}", config.encoding.name()),
            });
        }
        let utf8 = TokenizerConfig {
            encoding: UTF_8,
            ..config
        };
        Ok(Self::from_buf_read(
            Box::new(Cursor::new(text.into_owned().into_bytes())),
            utf8,
        ))
    }

    fn from_buf_read(input: Box<dyn BufRead + 'a>, config: TokenizerConfig) -> Self {
        let mut reader = Reader::from_reader(input);
        let reader_config = reader.config_mut();
        reader_config.trim_text(false);
        reader_config.expand_empty_elements = true;
        reader_config.check_end_names = true;

        Self {
            reader,
            config,
            buf: Vec::new(),
            pending_end: None,
            entities: HashMap::new(),
        }
    }

    /// Byte offset of the reader in the input
    #[must_use]
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Read the next token
    ///
    /// Comments, processing instructions and the XML declaration are
    /// skipped. A document type declaration produces no token; its internal
    /// entity declarations are remembered for the rest of the document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Malformed` for syntax, well-formedness, encoding
    /// and (under [`EntityPolicy::Reject`]) entity errors, and
    /// `ParseError::Tokenization` for I/O failures of the input stream.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Token::End { name });
        }

        let config = self.config;
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => {
                    return Err(convert_error(err, self.reader.error_position() as u64));
                }
            };
            let position = self.reader.buffer_position() as u64;

            match event {
                Event::Start(start) => {
                    let (name, attributes) = read_start(&start, config, &self.entities, position)?;
                    return Ok(Token::Start { name, attributes });
                }
                Event::Empty(start) => {
                    let (name, attributes) = read_start(&start, config, &self.entities, position)?;
                    self.pending_end = Some(name.clone());
                    return Ok(Token::Start { name, attributes });
                }
                Event::End(end) => {
                    let name = decode(end.name().as_ref(), config.encoding, position)?.into_owned();
                    return Ok(Token::End { name });
                }
                Event::Text(text) => {
                    let raw = decode(&text, config.encoding, position)?;
                    let unescaped =
                        unescape(&raw, config.unresolved_entities, &self.entities, position)?;
                    return Ok(Token::Text(unescaped.into_owned()));
                }
                Event::CData(data) => {
                    let raw = decode(&data, config.encoding, position)?;
                    return Ok(Token::Text(raw.into_owned()));
                }
                Event::DocType(doctype) => {
                    let declaration = decode(&doctype, config.encoding, position)?;
                    declare_entities(&mut self.entities, &declaration, position);
                }
                Event::Eof => return Ok(Token::Eof),
                _ => {}
            }
        }
    }
}

fn read_start(
    start: &BytesStart<'_>,
    config: TokenizerConfig,
    entities: &HashMap<String, String>,
    position: u64,
) -> Result<(String, Vec<(String, String)>), ParseError> {
    let name = decode(start.name().as_ref(), config.encoding, position)?.into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| ParseError::Malformed {
            position,
            message: err.to_string(),
        })?;
        let key = decode(attr.key.as_ref(), config.encoding, position)?.into_owned();
        let raw = decode(&attr.value, config.encoding, position)?;
        let value = unescape(&raw, config.unresolved_entities, entities, position)?.into_owned();
        attributes.push((key, value));
    }
    Ok((name, attributes))
}

fn decode<'b>(
    bytes: &'b [u8],
    encoding: &'static Encoding,
    position: u64,
) -> Result<Cow<'b, str>, ParseError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| ParseError::Malformed {
            position,
            message: format!("invalid {} byte sequence", encoding.name()),
        })
}

/// `<!ENTITY name "literal">` declarations in a DOCTYPE's internal subset
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) declarations are
/// skipped.
fn internal_entity_declarations(doctype: &str) -> Vec<(&str, &str)> {
    let Some(subset_start) = doctype.find('[') else {
        return Vec::new();
    };
    let mut rest = &doctype[subset_start + 1..];
    let mut declarations = Vec::new();
    while let Some(at) = rest.find("<!ENTITY") {
        rest = rest[at + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_end);
        rest = after.trim_start();
        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(close) = rest[1..].find(quote) else {
            break;
        };
        if !name.is_empty() {
            declarations.push((name, &rest[1..=close]));
        }
        rest = &rest[close + 2..];
    }
    declarations
}

fn declare_entities(entities: &mut HashMap<String, String>, doctype: &str, position: u64) {
    for (name, literal) in internal_entity_declarations(doctype) {
        // The first declaration of a name is binding
        if entities.contains_key(name) || resolve_predefined_entity(name).is_some() {
            continue;
        }
        let known = &*entities;
        let expanded = unescape_with(literal, |entity| {
            resolve_predefined_entity(entity).or_else(|| known.get(entity).map(String::as_str))
        });
        match expanded {
            Ok(value) if value.len() <= MAX_ENTITY_LEN => {
                debug!(entity = name, position, "Declared internal entity");
                let value = value.into_owned();
                entities.insert(name.to_string(), value);
            }
            Ok(value) => warn!(
                entity = name,
                position,
                len = value.len(),
                "Ignoring internal entity that expands past the size limit"
            ),
            Err(err) => warn!(
                entity = name,
                position,
                error = %err,
                "Ignoring internal entity with unusable replacement text"
            ),
        }
    }
}

fn unescape<'b>(
    raw: &'b str,
    policy: EntityPolicy,
    entities: &HashMap<String, String>,
    position: u64,
) -> Result<Cow<'b, str>, ParseError> {
    let resolved = unescape_with(raw, |entity| match resolve_predefined_entity(entity) {
        Some(value) => Some(value),
        None if entities.contains_key(entity) => entities.get(entity).map(String::as_str),
        None if policy == EntityPolicy::Drop => {
            warn!(entity, position, "Dropping unresolved entity reference");
            Some("")
        }
        None => None,
    });
    resolved.map_err(|err| ParseError::Malformed {
        position,
        message: err.to_string(),
    })
}

fn convert_error(err: quick_xml::Error, position: u64) -> ParseError {
    match err {
        quick_xml::Error::Io(io) => ParseError::Tokenization(
            Arc::try_unwrap(io)
                .unwrap_or_else(|shared| std::io::Error::new(shared.kind(), shared.to_string())),
        ),
        other => ParseError::Malformed {
            position,
            message: other.to_string(),
        },
    }
}
