//! Key/value pairs produced by the tokenizer.

use crate::Span;

/// One `key[=value]` segment of a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<'src> {
    /// Raw (still encoded) key text.
    pub key: &'src str,
    /// Raw value text; `None` for a naked key with no `=`.
    pub value: Option<&'src str>,
    /// Span of the whole segment.
    pub span: Span,
    /// Span of the key.
    pub key_span: Span,
    /// Span of the value, when there is one.
    pub value_span: Option<Span>,
}

impl<'src> Pair<'src> {
    /// Whether this pair is a naked key (`key` with no `=`).
    pub fn is_naked(&self) -> bool {
        self.value.is_none()
    }
}
