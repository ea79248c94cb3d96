//! Value types for query-string trees.
//!
//! A value is one of three things:
//! - a scalar, whose text is `None` for a naked key (`flag` with no `=`)
//! - a sequence, built from `[]` and `[n]` segments
//! - a mapping, built from `[name]` segments, keeping insertion order
//!
//! The root of a parsed nested query is always a mapping.

use indexmap::IndexMap;
use qsnest_format::{KeyPath, Segment};

/// A query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Scalar text; `None` is a naked key.
    Scalar(Option<String>),
    /// Ordered items.
    Sequence(Sequence),
    /// Insertion-ordered entries with unique keys.
    Mapping(Mapping),
}

/// A sequence of values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    /// Items in the sequence.
    pub items: Vec<Value>,
}

/// A mapping of string keys to values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    /// Entries in insertion order.
    pub entries: IndexMap<String, Value>,
}

impl Value {
    /// Create a naked-key scalar (no text at all).
    pub fn null() -> Self {
        Value::Scalar(None)
    }

    /// Create a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(Some(text.into()))
    }

    /// Create a sequence with items.
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(items.into_iter().collect())
    }

    /// Create an empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(Mapping::default())
    }

    /// Check if this is a naked-key scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(None))
    }

    /// Check if this is a sequence or mapping.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Get as string (scalars with text only).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => text.as_deref(),
            _ => None,
        }
    }

    /// Get as sequence.
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mutable sequence.
    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Get as mutable mapping.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(None) => "null",
            Value::Scalar(Some(_)) => "scalar",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Get a value by key, using the same bracket syntax as query keys.
    ///
    /// The key is taken as already decoded: `user[tags][0]`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let path = KeyPath::parse_decoded(key);
        let mut value = self.as_mapping()?.get(&path.root)?;
        for segment in &path.segments {
            value = match (value, segment) {
                (Value::Sequence(seq), Segment::Index(index)) => seq.get(*index)?,
                (Value::Mapping(map), segment) => map.get(&segment.mapping_key())?,
                _ => return None,
            };
        }
        Some(value)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::scalar(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(Some(text))
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        Value::Scalar(text)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl Mapping {
    /// Get entry value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get mutable entry value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or update an entry; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Check if key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over entries as (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Mapping {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Sequence {
    /// Get item by index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Get mutable item by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Push an item.
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Sequence {
            items: iter.into_iter().collect(),
        }
    }
}
