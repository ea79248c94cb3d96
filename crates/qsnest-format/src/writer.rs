//! Low-level query-string output writer.

use tracing::trace;

use crate::encoding::{encode_component, encode_flat};
use crate::path::KeyPath;

/// Accumulates `key=value` pairs joined by `&`.
///
/// A `None` value writes the key alone, with no `=`.
#[derive(Debug, Default)]
pub struct QueryWriter {
    out: String,
    pairs: usize,
}

impl QueryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs written so far.
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Write a bracket-annotated key and its value.
    pub fn write_path(&mut self, path: &KeyPath, value: Option<&str>) {
        let key = path.to_query_key();
        let value = value.map(encode_component);
        self.write_raw(&key, value.as_deref());
    }

    /// Write a key with no structure; brackets in it stay literal.
    pub fn write_flat(&mut self, key: &str, value: Option<&str>) {
        let key = encode_flat(key);
        let value = value.map(encode_flat);
        self.write_raw(&key, value.as_deref());
    }

    fn write_raw(&mut self, key: &str, value: Option<&str>) {
        if self.pairs > 0 {
            self.out.push('&');
        }
        self.out.push_str(key);
        if let Some(value) = value {
            self.out.push('=');
            self.out.push_str(value);
        }
        self.pairs += 1;
        trace!("Wrote pair {}: {:?} = {:?}", self.pairs, key, value);
    }

    /// Consume the writer and return the query string.
    pub fn finish(self) -> String {
        self.out
    }
}
