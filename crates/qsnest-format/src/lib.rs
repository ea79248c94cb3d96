//! Core encoding and key-path utilities for nested query strings.
//!
//! This crate provides the low-level building blocks shared by parsing and
//! building: percent-encoding, the bracket key-path grammar, codec options and
//! the output writer. It knows nothing about value trees.

mod encoding;
mod options;
mod path;
mod writer;

pub use encoding::{Malformed, decode_component, encode_component, encode_flat};
pub use options::{AdjacentContainers, BuildOptions, ParseOptions, PushMode, SequenceStyle};
pub use path::{KeyPath, Segment};
pub use writer::QueryWriter;
