//! A tokenizer for query strings.
//!
//! Splits raw query text into `(key, value)` pairs in source order. Nothing is
//! decoded here; keys and values are borrowed verbatim from the input.

mod span;
pub use span::Span;

mod pair;
pub use pair::Pair;

mod tokenizer;
pub use tokenizer::Tokenizer;

/// Tokenize a query string into its pairs.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}
