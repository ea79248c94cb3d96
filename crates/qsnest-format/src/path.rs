//! Bracket key paths.
//!
//! A key such as `user[tags][]` is a root name (`user`) followed by bracket
//! groups. Structure is taken from the raw text before decoding, so only
//! unescaped brackets are structural: `%5Bx%5D` is the literal name `[x]`.
//!
//! The grammar is total. A `[` that is never closed is literal text: it joins
//! the root name when no group has been read yet (`a[b` is the name `a[b`),
//! and otherwise the rest of the key becomes one final name (`a[b][c` ends in
//! the name `[c`). Text after a `]` that does not open another group is also
//! kept as one final name (`a[b]c` ends in `c`).

use std::borrow::Cow;
use std::fmt;

use crate::encoding::{Malformed, decode_component, encode_component};

/// One bracket group of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `[name]`
    Name(String),
    /// `[3]`: a canonical decimal with no leading zero.
    Index(usize),
    /// `[]`: append at this depth.
    Push,
}

impl Segment {
    /// Classify the (decoded) contents of a bracket group.
    pub fn classify(content: String) -> Segment {
        if content.is_empty() {
            return Segment::Push;
        }
        if is_canonical_index(&content)
            && let Ok(index) = content.parse()
        {
            return Segment::Index(index);
        }
        Segment::Name(content)
    }

    /// The key this segment addresses when the container is a mapping.
    pub fn mapping_key(&self) -> Cow<'_, str> {
        match self {
            Segment::Name(name) => Cow::Borrowed(name),
            Segment::Index(index) => Cow::Owned(index.to_string()),
            Segment::Push => Cow::Borrowed(""),
        }
    }
}

fn is_canonical_index(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

/// A parsed key: the root name plus its bracket segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    /// Top-level name (may be empty).
    pub root: String,
    /// Bracket segments after the root name.
    pub segments: Vec<Segment>,
}

impl KeyPath {
    /// A path naming a top-level key.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Builder-style append of a segment.
    pub fn with(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Nesting depth (number of bracket segments).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Parse a raw (still percent-encoded) key.
    ///
    /// Each piece is decoded after the structure has been split off. If a
    /// piece carries a bad escape the path is still produced, inside the
    /// [`Malformed`] error, with the offset of the leftmost bad escape in
    /// `raw`.
    pub fn parse(raw: &str) -> Result<KeyPath, Malformed<KeyPath>> {
        let mut problem: Option<(usize, usize)> = None;
        let path = split(raw, |piece, at| match decode_component(piece) {
            Ok(text) => text.into_owned(),
            Err(err) => {
                let offset = at + err.offset;
                if problem.is_none_or(|(first, _)| offset < first) {
                    problem = Some((offset, err.len));
                }
                err.recovered
            }
        });
        match problem {
            None => Ok(path),
            Some((offset, len)) => Err(Malformed {
                offset,
                len,
                recovered: path,
            }),
        }
    }

    /// Split an already decoded key. Used for lookups, not for wire input.
    pub fn parse_decoded(key: &str) -> KeyPath {
        split(key, |piece, _| piece.to_owned())
    }

    /// Render this path as an encoded query-string key.
    pub fn to_query_key(&self) -> String {
        let mut key = encode_component(&self.root).into_owned();
        for segment in &self.segments {
            key.push('[');
            match segment {
                Segment::Name(name) => key.push_str(&encode_component(name)),
                Segment::Index(index) => key.push_str(&index.to_string()),
                Segment::Push => {}
            }
            key.push(']');
        }
        key
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Name(name) => write!(f, "[{name}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Push => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

/// Split `raw` into a path, running `decode(piece, offset)` on every piece.
fn split(raw: &str, mut decode: impl FnMut(&str, usize) -> String) -> KeyPath {
    let root_end = raw.find('[').unwrap_or(raw.len());
    let mut segments = Vec::new();
    let mut literal_tail = None;
    let mut pos = root_end;

    while pos < raw.len() {
        let rest = &raw[pos..];
        if !rest.starts_with('[') {
            literal_tail = Some(pos);
            break;
        }
        match rest[1..].find(['[', ']']) {
            Some(i) if rest.as_bytes()[i + 1] == b']' => {
                let content = decode(&rest[1..i + 1], pos + 1);
                segments.push(Segment::classify(content));
                pos += i + 2;
            }
            // Unterminated group
            _ => {
                literal_tail = Some(pos);
                break;
            }
        }
    }

    let root = match literal_tail {
        Some(_) if segments.is_empty() => decode(raw, 0),
        Some(at) => {
            let root = decode(&raw[..root_end], 0);
            segments.push(Segment::Name(decode(&raw[at..], at)));
            root
        }
        None => decode(&raw[..root_end], 0),
    };

    KeyPath { root, segments }
}
