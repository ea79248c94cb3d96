//! Value trees for query strings.
//!
//! This crate parses `application/x-www-form-urlencoded` text into a
//! [`Value`] and builds it back, under one of three [`Strategy`] choices.
//! The nested strategy reads bracket keys such as `user[tags][]` into
//! sequences and mappings:
//!
//! ```
//! use qsnest_tree::{Strategy, Value, build, parse};
//!
//! let value = parse("colors[]=orange&colors[]=rebeccapurple", Strategy::Nested).unwrap();
//! assert_eq!(value.get("colors[1]").and_then(Value::as_str), Some("rebeccapurple"));
//! assert_eq!(
//!     build(&value, Strategy::Nested).unwrap(),
//!     "colors[]=orange&colors[]=rebeccapurple"
//! );
//! ```
//!
//! Parsing never fails on malformed input; problems it recovered from are
//! returned as [`Diagnostic`]s by [`parse_with_options`]. Errors are reserved
//! for resource guards and for values that cannot be rendered.

mod builder;
mod diagnostic;
mod error;
mod json;
mod serializer;
mod strategy;
mod value;

pub use builder::TreeBuilder;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{Error, ErrorKind, Limit};
pub use qsnest_format::{
    AdjacentContainers, BuildOptions, KeyPath, ParseOptions, PushMode, Segment, SequenceStyle,
};
pub use qsnest_tokenizer::Span;
pub use strategy::{Strategy, UnknownStrategy};
pub use value::{Mapping, Sequence, Value};

/// A parsed value together with the problems recovered along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// The parsed value.
    pub value: Value,
    /// Recovered problems, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a query string with default options.
pub fn parse(source: &str, strategy: Strategy) -> Result<Value, Error> {
    parse_with_options(source, strategy, &ParseOptions::default()).map(|parsed| parsed.value)
}

/// Parse a query string, keeping diagnostics.
pub fn parse_with_options(
    source: &str,
    strategy: Strategy,
    options: &ParseOptions,
) -> Result<Parsed, Error> {
    let max_length = options.max_length.min(u32::MAX as usize);
    if source.len() > max_length {
        return Err(Error::limit(Limit::Length, max_length));
    }
    match strategy {
        Strategy::Simplistic => strategy::parse_simplistic(source, options),
        Strategy::Collapsing => strategy::parse_collapsing(source, options),
        Strategy::Nested => strategy::parse_nested(source, options),
    }
}

/// Build a query string with default options.
pub fn build(value: &Value, strategy: Strategy) -> Result<String, Error> {
    build_with_options(value, strategy, &BuildOptions::default())
}

/// Build a query string.
pub fn build_with_options(
    value: &Value,
    strategy: Strategy,
    options: &BuildOptions,
) -> Result<String, Error> {
    match strategy {
        Strategy::Simplistic => strategy::build_simplistic(value, options),
        Strategy::Collapsing => strategy::build_collapsing(value, options),
        Strategy::Nested => serializer::serialize_nested(value, options),
    }
}
