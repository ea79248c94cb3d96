//! Percent-encoding for query components.
//!
//! Decoding turns `+` into a space before percent-decoding, so an escaped plus
//! (`%2B`) survives as a literal `+`. Encoding does the reverse: literal `+`
//! is escaped first and spaces are written as `+`.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::debug;

/// Everything but ASCII alphanumerics and `-._~` is escaped, brackets included.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Like [`COMPONENT`], but brackets stay literal.
const FLAT: &AsciiSet = &COMPONENT.remove(b'[').remove(b']');

/// Input that could not be decoded cleanly.
///
/// Decoding never gives up: the offending bytes are passed through unchanged
/// (or replaced with U+FFFD when they decode to invalid UTF-8) and the result
/// is carried in `recovered`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed<T> {
    /// Byte offset of the first problem in the input.
    pub offset: usize,
    /// Length in bytes of the offending input.
    pub len: usize,
    /// Best-effort decoding of the whole input.
    pub recovered: T,
}

impl<T> Malformed<T> {
    /// Discard the error and keep the recovered value.
    pub fn into_recovered(self) -> T {
        self.recovered
    }

    /// Map the recovered value, keeping the location.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Malformed<U> {
        Malformed {
            offset: self.offset,
            len: self.len,
            recovered: f(self.recovered),
        }
    }
}

impl<T> fmt::Display for Malformed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed percent-encoding at byte {}", self.offset)
    }
}

impl<T: fmt::Debug> std::error::Error for Malformed<T> {}

/// Decode one key or value of a query string.
///
/// `+` becomes a space, `%XX` becomes the byte `XX`. An invalid escape is
/// passed through unchanged and reported as [`Malformed`] together with the
/// recovered text.
pub fn decode_component(text: &str) -> Result<Cow<'_, str>, Malformed<String>> {
    if !text.contains(['%', '+']) {
        return Ok(Cow::Borrowed(text));
    }

    let spaced = text.replace('+', " ");
    let bad_escape = find_bad_escape(text);
    let decoded = percent_decode_str(&spaced);

    match (decoded.clone().decode_utf8(), bad_escape) {
        (Ok(s), None) => Ok(Cow::Owned(s.into_owned())),
        (Ok(s), Some(offset)) => {
            debug!("Passing through bad escape at byte {} of {:?}", offset, text);
            Err(Malformed {
                offset,
                len: (text.len() - offset).min(3),
                recovered: s.into_owned(),
            })
        }
        (Err(_), bad_escape) => {
            debug!("Escapes in {:?} decode to invalid UTF-8", text);
            let offset = bad_escape.or_else(|| text.find('%')).unwrap_or(0);
            Err(Malformed {
                offset,
                len: text.len() - offset,
                recovered: decoded.decode_utf8_lossy().into_owned(),
            })
        }
    }
}

/// Find the first `%` that is not followed by two hex digits.
fn find_bad_escape(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let hex_at = |at: usize| bytes.get(at).is_some_and(|b| b.is_ascii_hexdigit());
        if !(hex_at(i + 1) && hex_at(i + 2)) {
            return Some(i);
        }
        i += 3;
    }
    None
}

/// Encode a key or value so that `&`, `=`, `+`, `%`, `[`, `]` and spaces
/// survive a round trip.
pub fn encode_component(text: &str) -> Cow<'_, str> {
    encode_with(text, COMPONENT)
}

/// Encode text for a strategy without key structure; brackets stay literal.
pub fn encode_flat(text: &str) -> Cow<'_, str> {
    encode_with(text, FLAT)
}

fn encode_with<'a>(text: &'a str, set: &'static AsciiSet) -> Cow<'a, str> {
    let encoded: Cow<'a, str> = utf8_percent_encode(text, set).into();
    // `%` is always escaped itself, so every `%20` in the output is a space.
    if text.contains(' ') {
        Cow::Owned(encoded.replace("%20", "+"))
    } else {
        encoded
    }
}
