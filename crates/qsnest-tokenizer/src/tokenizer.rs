//! Tokenizer for query strings.

use crate::{Pair, Span};
use tracing::trace;

/// A tokenizer that produces pairs from query text.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    ///
    /// Positions are `u32`, so `source` must be shorter than 4 GiB.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Skip separators so the next byte starts a non-empty segment.
    fn skip_separators(&mut self) {
        let skipped = self.remaining.len() - self.remaining.trim_start_matches('&').len();
        self.advance_by(skipped);
    }

    /// Get the next pair, skipping empty segments.
    pub fn next_pair(&mut self) -> Option<Pair<'src>> {
        self.skip_separators();
        if self.is_eof() {
            return None;
        }

        let start = self.pos;
        let len = self.remaining.find('&').unwrap_or(self.remaining.len());
        let segment = &self.remaining[..len];
        self.advance_by(len);

        let pair = match segment.split_once('=') {
            Some((key, value)) => {
                let key_end = start + key.len() as u32;
                Pair {
                    key,
                    value: Some(value),
                    span: Span::new(start, self.pos),
                    key_span: Span::new(start, key_end),
                    value_span: Some(Span::new(key_end + 1, self.pos)),
                }
            }
            None => Pair {
                key: segment,
                value: None,
                span: Span::new(start, self.pos),
                key_span: Span::new(start, self.pos),
                value_span: None,
            },
        };

        trace!(
            "Pair at {:?}: {:?} = {:?}",
            pair.span,
            pair.span.slice(self.source),
            pair.value
        );
        Some(pair)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Pair<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_pair()
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}
