//! Parsing strategies.
//!
//! Three ways to read the same pairs:
//! - `simplistic` keeps every pair, in order, as `[key, value]`
//! - `collapsing` keeps a flat mapping where the first occurrence of a key wins
//! - `nested` interprets bracket keys and builds a tree
//!
//! The flat strategies decode keys and values but never look at brackets.

use std::fmt;
use std::str::FromStr;

use qsnest_format::{BuildOptions, KeyPath, ParseOptions, QueryWriter};
use qsnest_tokenizer::{Pair, tokenize};
use tracing::debug;

use crate::Parsed;
use crate::builder::TreeBuilder;
use crate::diagnostic::{Diagnostic, decode_recovering};
use crate::error::{Error, Limit};
use crate::value::{Mapping, Sequence, Value};

/// How a query string maps to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Ordered list of `[key, value]` pairs.
    Simplistic,
    /// Flat mapping, first occurrence wins.
    Collapsing,
    /// Bracket keys build nested sequences and mappings.
    #[default]
    Nested,
}

impl Strategy {
    /// All strategies, in documentation order.
    pub const ALL: [Strategy; 3] = [Strategy::Simplistic, Strategy::Collapsing, Strategy::Nested];

    /// The strategy's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Simplistic => "simplistic",
            Strategy::Collapsing => "collapsing",
            Strategy::Nested => "nested",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// A strategy name that is not one of `simplistic`, `collapsing` or `nested`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown strategy `{}`, expected simplistic, collapsing or nested",
            self.0
        )
    }
}

impl std::error::Error for UnknownStrategy {}

/// Decoded key and value of one pair.
fn decode_pair(pair: &Pair<'_>, diagnostics: &mut Vec<Diagnostic>) -> (String, Option<String>) {
    let key = decode_recovering(pair.key, pair.key_span, diagnostics);
    let value = pair
        .value
        .zip(pair.value_span)
        .map(|(text, span)| decode_recovering(text, span, diagnostics));
    (key, value)
}

fn check_pairs(count: usize, options: &ParseOptions) -> Result<(), Error> {
    if count > options.max_pairs {
        return Err(Error::limit(Limit::Pairs, options.max_pairs));
    }
    Ok(())
}

pub(crate) fn parse_simplistic(source: &str, options: &ParseOptions) -> Result<Parsed, Error> {
    let mut diagnostics = Vec::new();
    let mut pairs = Sequence::default();
    for (count, pair) in tokenize(source).enumerate() {
        check_pairs(count + 1, options)?;
        let (key, value) = decode_pair(&pair, &mut diagnostics);
        pairs.push(Value::seq([Value::from(key), Value::from(value)]));
    }
    Ok(Parsed {
        value: Value::Sequence(pairs),
        diagnostics,
    })
}

pub(crate) fn parse_collapsing(source: &str, options: &ParseOptions) -> Result<Parsed, Error> {
    let mut diagnostics = Vec::new();
    let mut map = Mapping::default();
    for (count, pair) in tokenize(source).enumerate() {
        check_pairs(count + 1, options)?;
        let (key, value) = decode_pair(&pair, &mut diagnostics);
        if map.contains_key(&key) {
            debug!("Ignoring repeated key {:?}", key);
            continue;
        }
        map.insert(key, Value::from(value));
    }
    Ok(Parsed {
        value: Value::Mapping(map),
        diagnostics,
    })
}

pub(crate) fn parse_nested(source: &str, options: &ParseOptions) -> Result<Parsed, Error> {
    let mut builder = TreeBuilder::with_options(options.clone());
    let mut recovered = Vec::new();
    for pair in tokenize(source) {
        let path = KeyPath::parse(pair.key).unwrap_or_else(|err| {
            recovered.push(Diagnostic::malformed(&err, pair.key_span));
            err.into_recovered()
        });
        let value = pair
            .value
            .zip(pair.value_span)
            .map(|(text, span)| decode_recovering(text, span, &mut recovered));
        builder.assign(&path, value, Some(pair.span))?;
    }

    let (value, mut diagnostics) = builder.finish_with_diagnostics();
    diagnostics.extend(recovered);
    diagnostics.sort_by_key(|d| d.span.map_or(0, |span| span.start));
    Ok(Parsed { value, diagnostics })
}

/// Text of a scalar that must render as a flat key or value.
fn flat_scalar<'v>(value: &'v Value, at: &str) -> Result<Option<&'v str>, Error> {
    match value {
        Value::Scalar(text) => Ok(text.as_deref()),
        other => Err(Error::unsupported(format!("expected a scalar, found a {}", other.kind()))
            .at_key(at)),
    }
}

pub(crate) fn build_simplistic(value: &Value, _options: &BuildOptions) -> Result<String, Error> {
    let Value::Sequence(pairs) = value else {
        return Err(Error::unsupported(format!(
            "simplistic output needs a sequence of pairs, not a {}",
            value.kind()
        )));
    };

    let mut writer = QueryWriter::new();
    for (position, item) in pairs.iter().enumerate() {
        let at = format!("[{}]", position);
        let [key, value] = item.as_sequence().map(|pair| pair.items.as_slice()).unwrap_or(&[]) else {
            return Err(Error::unsupported("each pair must be a two-item sequence").at_key(at));
        };
        let Some(key) = flat_scalar(key, &at)? else {
            return Err(Error::unsupported("a pair's key cannot be null").at_key(at));
        };
        writer.write_flat(key, flat_scalar(value, &at)?);
    }
    Ok(writer.finish())
}

pub(crate) fn build_collapsing(value: &Value, _options: &BuildOptions) -> Result<String, Error> {
    let Value::Mapping(map) = value else {
        return Err(Error::unsupported(format!(
            "collapsing output needs a mapping, not a {}",
            value.kind()
        )));
    };

    let mut writer = QueryWriter::new();
    for (key, value) in map.iter() {
        writer.write_flat(key, flat_scalar(value, key)?);
    }
    Ok(writer.finish())
}
