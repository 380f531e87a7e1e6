//! Ant XML report parsing
//!
//! Recursive descent over the token stream of a single report document:
//!
//! ```text
//! root        := testsuites | testsuite
//! testsuites  := testsuite*
//! testsuite   := properties? (testcase | system-out | system-err)*
//! properties  := property*
//! testcase    := (failure | error | skipped | system-out | system-err)*
//! ```
//!
//! Each element is handled by one function that returns a plain record.
//! Elements outside this grammar abort the parse.
//!
//! # Example
//!
//! ```
//! use antxml_parser::parser::AntXmlParser;
//! use antxml_parser::model::TestStatus;
//!
//! let xml = r#"<testsuite name="S" tests="1" time="0.068">
//!   <testcase name="t" classname="a.B" time="0.017"/>
//! </testsuite>"#;
//! let suites = AntXmlParser::new().parse_str(xml).unwrap();
//! assert_eq!(suites[0].elapsed_time_millis, 68);
//! assert_eq!(suites[0].test_cases[0].status, TestStatus::Passed);
//! ```

use crate::error::ParseError;
use crate::model::{Property, StackTrace, TestCase, TestStatus, TestSuite};
use crate::stack::decompose;
use crate::tokenizer::{EntityPolicy, Token, Tokenizer, TokenizerConfig};
use chrono::{DateTime, NaiveDateTime};
use encoding_rs::{Encoding, UTF_8};
use std::io::Read;
use tracing::{debug, trace, warn};

/// Parent name used in errors about the document's top-level element
const ROOT: &str = "root";

// ============================================================================
// Options and facade
// ============================================================================

/// Options applied to every document parsed by an [`AntXmlParser`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Handling of entity references that cannot be resolved
    pub unresolved_entities: EntityPolicy,
}

impl ParseOptions {
    /// Fail on unresolved entity references instead of dropping them
    #[must_use]
    pub fn reject_unresolved_entities(mut self) -> Self {
        self.unresolved_entities = EntityPolicy::Reject;
        self
    }
}

/// Parser for Ant (JUnit task) XML reports
///
/// The parser only holds immutable options. Every call opens its own
/// tokenizer, so one parser can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct AntXmlParser {
    options: ParseOptions,
}

impl AntXmlParser {
    /// Create a parser with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Options used by this parser
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse every test suite in a report
    ///
    /// The whole stream is consumed before the suites are returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the document is malformed, does not follow
    /// the report grammar, or carries a numeric attribute that does not
    /// parse. No suites are returned in that case.
    pub fn parse<R: Read>(
        &self,
        input: R,
        encoding: &'static Encoding,
    ) -> Result<Vec<TestSuite>, ParseError> {
        let config = TokenizerConfig {
            encoding,
            unresolved_entities: self.options.unresolved_entities,
        };
        let mut tokens = Tokenizer::open(input, config)?;
        let suites = parse_document(&mut tokens)?;
        debug!(suites = suites.len(), "Parsed Ant XML report");
        Ok(suites)
    }

    /// Parse a report held in memory
    ///
    /// # Errors
    ///
    /// See [`AntXmlParser::parse`].
    pub fn parse_str(&self, xml: &str) -> Result<Vec<TestSuite>, ParseError> {
        self.parse(xml.as_bytes(), UTF_8)
    }
}

/// Parse a report with default options
///
/// # Errors
///
/// See [`AntXmlParser::parse`].
pub fn parse<R: Read>(
    input: R,
    encoding: &'static Encoding,
) -> Result<Vec<TestSuite>, ParseError> {
    AntXmlParser::new().parse(input, encoding)
}

// ============================================================================
// Grammar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    TestSuites,
    TestSuite,
    Properties,
    Property,
    TestCase,
    Failure,
    Error,
    Skipped,
    SystemOut,
    SystemErr,
}

impl Element {
    fn from_name(name: &str) -> Option<Self> {
        let element = match name {
            "testsuites" => Self::TestSuites,
            "testsuite" => Self::TestSuite,
            "properties" => Self::Properties,
            "property" => Self::Property,
            "testcase" => Self::TestCase,
            "failure" => Self::Failure,
            "error" => Self::Error,
            "skipped" => Self::Skipped,
            "system-out" => Self::SystemOut,
            "system-err" => Self::SystemErr,
            _ => return None,
        };
        Some(element)
    }

    fn name(self) -> &'static str {
        match self {
            Self::TestSuites => "testsuites",
            Self::TestSuite => "testsuite",
            Self::Properties => "properties",
            Self::Property => "property",
            Self::TestCase => "testcase",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Skipped => "skipped",
            Self::SystemOut => "system-out",
            Self::SystemErr => "system-err",
        }
    }
}

type Attributes = Vec<(String, String)>;

fn parse_document(tokens: &mut Tokenizer<'_>) -> Result<Vec<TestSuite>, ParseError> {
    let mut suites = None;
    loop {
        match tokens.next_token()? {
            Token::Start { name, attributes } => {
                if suites.is_some() {
                    return Err(ParseError::unexpected_element(ROOT, &name));
                }
                suites = Some(match Element::from_name(&name) {
                    Some(Element::TestSuites) => parse_suites(tokens)?,
                    Some(Element::TestSuite) => vec![parse_suite(tokens, attributes)?],
                    _ => return Err(ParseError::unexpected_element(ROOT, &name)),
                });
            }
            Token::Eof => return suites.ok_or(ParseError::NoRootElement),
            Token::End { .. } | Token::Text(_) => {}
        }
    }
}

/// Pull tokens until the end tag of `parent`, handing every child start tag to `on_child`
fn for_each_child<'a, F>(
    tokens: &mut Tokenizer<'a>,
    parent: Element,
    mut on_child: F,
) -> Result<(), ParseError>
where
    F: FnMut(&mut Tokenizer<'a>, &str, Attributes) -> Result<(), ParseError>,
{
    loop {
        match tokens.next_token()? {
            Token::Start { name, attributes } => on_child(tokens, &name, attributes)?,
            Token::End { name } if name == parent.name() => return Ok(()),
            Token::End { .. } | Token::Text(_) => {}
            Token::Eof => return Err(unexpected_eof(tokens, parent)),
        }
    }
}

/// Pull tokens until the end tag of `element`, handing all character data to `on_text`
///
/// Nested elements are tolerated; only their text is kept.
fn drain_element<F>(
    tokens: &mut Tokenizer<'_>,
    element: Element,
    mut on_text: F,
) -> Result<(), ParseError>
where
    F: FnMut(String),
{
    loop {
        match tokens.next_token()? {
            Token::Text(text) => on_text(text),
            Token::End { name } if name == element.name() => return Ok(()),
            Token::Start { .. } | Token::End { .. } => {}
            Token::Eof => return Err(unexpected_eof(tokens, element)),
        }
    }
}

fn unexpected_eof(tokens: &Tokenizer<'_>, element: Element) -> ParseError {
    ParseError::Malformed {
        position: tokens.position(),
        message: format!("unexpected end of document inside <{}>", element.name()),
    }
}

fn parse_suites(tokens: &mut Tokenizer<'_>) -> Result<Vec<TestSuite>, ParseError> {
    let mut suites = Vec::new();
    for_each_child(tokens, Element::TestSuites, |tokens, name, attributes| {
        match Element::from_name(name) {
            Some(Element::TestSuite) => {
                suites.push(parse_suite(tokens, attributes)?);
                Ok(())
            }
            _ => Err(ParseError::unexpected_element(Element::TestSuites.name(), name)),
        }
    })?;
    Ok(suites)
}

fn parse_suite(tokens: &mut Tokenizer<'_>, attributes: Attributes) -> Result<TestSuite, ParseError> {
    let element = Element::TestSuite;
    let mut suite = TestSuite::default();
    for (key, value) in attributes {
        match key.as_str() {
            "name" => suite.name = value,
            "tests" => suite.total_count = parse_count(element, &key, &value)?,
            "errors" => suite.error_count = parse_count(element, &key, &value)?,
            "failures" => suite.failure_count = parse_count(element, &key, &value)?,
            "skipped" => suite.skipped_count = parse_count(element, &key, &value)?,
            "time" => suite.elapsed_time_millis = parse_millis(element, &key, &value)?,
            "hostname" => suite.hostname = Some(value),
            "timestamp" => suite.timestamp = parse_timestamp(&value),
            _ => {}
        }
    }

    for_each_child(tokens, element, |tokens, name, attributes| {
        match Element::from_name(name) {
            Some(Element::Properties) => parse_properties(tokens, &mut suite.properties),
            Some(Element::TestCase) => {
                suite.test_cases.push(parse_test_case(tokens, attributes)?);
                Ok(())
            }
            Some(child @ (Element::SystemOut | Element::SystemErr)) => {
                drain_element(tokens, child, drop)
            }
            _ => Err(ParseError::unexpected_element(element.name(), name)),
        }
    })?;

    trace!(
        suite = %suite.name,
        cases = suite.test_cases.len(),
        "Parsed test suite"
    );
    Ok(suite)
}

fn parse_properties(
    tokens: &mut Tokenizer<'_>,
    properties: &mut Vec<Property>,
) -> Result<(), ParseError> {
    for_each_child(tokens, Element::Properties, |tokens, name, attributes| {
        match Element::from_name(name) {
            Some(Element::Property) => {
                properties.push(parse_property(tokens, attributes)?);
                Ok(())
            }
            _ => Err(ParseError::unexpected_element(Element::Properties.name(), name)),
        }
    })
}

fn parse_property(
    tokens: &mut Tokenizer<'_>,
    attributes: Attributes,
) -> Result<Property, ParseError> {
    let mut property = Property::default();
    for (key, value) in attributes {
        match key.as_str() {
            "name" => property.name = value,
            "value" => property.value = value,
            _ => {}
        }
    }
    for_each_child(tokens, Element::Property, |_, name, _| {
        Err(ParseError::unexpected_element(Element::Property.name(), name))
    })?;
    Ok(property)
}

fn parse_test_case(
    tokens: &mut Tokenizer<'_>,
    attributes: Attributes,
) -> Result<TestCase, ParseError> {
    let element = Element::TestCase;
    let mut case = TestCase::default();
    for (key, value) in attributes {
        match key.as_str() {
            "name" => case.name = value,
            "classname" => case.class_name = value,
            "time" => case.elapsed_time_millis = parse_millis(element, &key, &value)?,
            _ => {}
        }
    }

    // Status follows the last failure/error/skipped child in document order
    for_each_child(tokens, element, |tokens, name, attributes| {
        match Element::from_name(name) {
            Some(Element::Failure) => {
                case.status = TestStatus::Failed;
                case.failures
                    .push(parse_stack_trace(tokens, Element::Failure, attributes)?);
            }
            Some(Element::Error) => {
                case.status = TestStatus::Error;
                case.error = Some(parse_stack_trace(tokens, Element::Error, attributes)?);
            }
            Some(Element::Skipped) => {
                case.status = TestStatus::Skipped;
                case.skipped_message = Some(parse_skipped(tokens, attributes)?);
            }
            Some(child @ (Element::SystemOut | Element::SystemErr)) => {
                drain_element(tokens, child, drop)?;
            }
            _ => return Err(ParseError::unexpected_element(element.name(), name)),
        }
        Ok(())
    })?;

    trace!(
        case = %case.name,
        class = %case.class_name,
        status = ?case.status,
        "Parsed test case"
    );
    Ok(case)
}

fn parse_stack_trace(
    tokens: &mut Tokenizer<'_>,
    element: Element,
    attributes: Attributes,
) -> Result<StackTrace, ParseError> {
    let mut trace = StackTrace::default();
    for (key, value) in attributes {
        match key.as_str() {
            "message" => trace.exception_message = value,
            "type" => trace.exception_type = value,
            _ => {}
        }
    }

    let mut content = String::new();
    drain_element(tokens, element, |text| content.push_str(&text))?;
    trace.stack_content = decompose(&content);
    trace.content = content;
    Ok(trace)
}

fn parse_skipped(tokens: &mut Tokenizer<'_>, attributes: Attributes) -> Result<String, ParseError> {
    let mut body = String::new();
    drain_element(tokens, Element::Skipped, |text| body.push_str(&text))?;
    if body.is_empty() {
        if let Some((_, message)) = attributes.into_iter().find(|(key, _)| key == "message") {
            return Ok(message);
        }
    }
    Ok(body)
}

// ============================================================================
// Attribute values
// ============================================================================

fn attribute_error(element: Element, attribute: &str, value: &str) -> ParseError {
    ParseError::AttributeFormat {
        element: element.name().to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

fn parse_count(element: Element, attribute: &str, value: &str) -> Result<i32, ParseError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| attribute_error(element, attribute, value))
}

fn parse_millis(element: Element, attribute: &str, value: &str) -> Result<i64, ParseError> {
    seconds_to_millis(value.trim()).ok_or_else(|| attribute_error(element, attribute, value))
}

/// Convert fractional seconds to whole milliseconds, truncating toward zero
fn seconds_to_millis(seconds: &str) -> Option<i64> {
    let as_float = seconds.parse::<f64>().ok().filter(|s| s.is_finite())?;
    exact_millis(seconds).or_else(|| {
        let millis = (as_float * 1000.0).trunc();
        // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive
        (millis >= i64::MIN as f64 && millis < i64::MAX as f64).then_some(millis as i64)
    })
}

/// Decimal-digit conversion for plain `[+-]digits[.digits]` values
fn exact_millis(seconds: &str) -> Option<i64> {
    let (negative, unsigned) = match seconds.as_bytes().first() {
        Some(b'-') => (true, &seconds[1..]),
        Some(b'+') => (false, &seconds[1..]),
        _ => (false, seconds),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut millis = whole.checked_mul(1000)?;
    let mut scale = 100;
    for digit in fraction.bytes().take(3) {
        millis = millis.checked_add(i64::from(digit - b'0') * scale)?;
        scale /= 10;
    }
    Some(if negative { -millis } else { millis })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        });
    if parsed.is_none() {
        warn!(timestamp = value, "Ignoring unparseable suite timestamp");
    }
    parsed
}
