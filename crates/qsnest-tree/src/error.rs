//! Errors that abort parsing or building.

use std::fmt;

use qsnest_format::KeyPath;

/// Error that aborts a parse or build. No partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    /// The key being processed when the error occurred, if any.
    pub path: Option<String>,
}

/// Kind of codec error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A depth or size guard tripped.
    ResourceLimitExceeded { limit: Limit, max: usize },
    /// The value has no rendering under the chosen strategy and options.
    UnsupportedShape { reason: String },
}

/// Which guard tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Nesting depth of a key or value.
    Depth,
    /// Number of pairs in one query string.
    Pairs,
    /// Length of a query string in bytes.
    Length,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, path: None }
    }

    pub(crate) fn limit(limit: Limit, max: usize) -> Self {
        Self::new(ErrorKind::ResourceLimitExceeded { limit, max })
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedShape {
            reason: reason.into(),
        })
    }

    /// Attach the key being processed.
    pub(crate) fn at(mut self, path: &KeyPath) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Attach a location given as text.
    pub(crate) fn at_key(mut self, key: impl Into<String>) -> Self {
        self.path = Some(key.into());
        self
    }

    /// Whether a resource guard caused this error.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self.kind, ErrorKind::ResourceLimitExceeded { .. })
    }

    /// Whether an unrepresentable value caused this error.
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedShape { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, " at `{}`", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ResourceLimitExceeded { limit, max } => {
                write!(f, "resource limit exceeded: more than {} {}", max, limit)
            }
            ErrorKind::UnsupportedShape { reason } => {
                write!(f, "unsupported shape: {}", reason)
            }
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Depth => f.write_str("levels of nesting"),
            Limit::Pairs => f.write_str("pairs"),
            Limit::Length => f.write_str("bytes"),
        }
    }
}
