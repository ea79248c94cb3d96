//! Options for parsing and building query strings.

/// How a `[]` followed by more segments picks its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// Descend into the last element unless that would overwrite something
    /// already at the remaining path; otherwise append. Adjacent push-built
    /// sub-sequences flatten into one.
    #[default]
    Merge,
    /// Every `[]` opens a new element.
    Append,
}

/// How sequence items are addressed when building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStyle {
    /// `a[]=x&a[]=y`
    #[default]
    Push,
    /// `a[0]=x&a[1]=y`
    Index,
}

/// What to do, under [`SequenceStyle::Push`], with a sequence holding two
/// neighbouring containers. Written with `[]`, the second would merge into
/// the first on re-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjacentContainers {
    /// Write `[]` anyway and accept the merge.
    #[default]
    Flatten,
    /// Write explicit indices for that sequence.
    Index,
    /// Fail with an unsupported-shape error.
    Reject,
}

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum number of bracket segments in one key (default: 20)
    pub max_depth: usize,

    /// Maximum number of pairs in one query string (default: 1000)
    pub max_pairs: usize,

    /// Maximum length of the query string in bytes (default: 1 MiB).
    /// Spans are 32-bit, so anything past 4 GiB is refused regardless.
    pub max_length: usize,

    /// Push resolution for nested `[]` (default: merge)
    pub push_mode: PushMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_pairs: 1000,
            max_length: 1 << 20,
            push_mode: PushMode::Merge,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum key depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum number of pairs.
    pub fn max_pairs(mut self, pairs: usize) -> Self {
        self.max_pairs = pairs;
        self
    }

    /// Set the maximum query string length in bytes.
    pub fn max_length(mut self, bytes: usize) -> Self {
        self.max_length = bytes;
        self
    }

    /// Set the push mode.
    pub fn push_mode(mut self, mode: PushMode) -> Self {
        self.push_mode = mode;
        self
    }
}

/// Options for building.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Maximum nesting depth of the value tree (default: 20)
    pub max_depth: usize,

    /// Sequence item addressing (default: push)
    pub sequence_style: SequenceStyle,

    /// Policy for neighbouring containers in a pushed sequence (default: flatten)
    pub adjacent_containers: AdjacentContainers,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: 20,
            sequence_style: SequenceStyle::Push,
            adjacent_containers: AdjacentContainers::Flatten,
        }
    }
}

impl BuildOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum tree depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Address sequence items by index.
    pub fn indexed(mut self) -> Self {
        self.sequence_style = SequenceStyle::Index;
        self
    }

    /// Set the sequence style.
    pub fn sequence_style(mut self, style: SequenceStyle) -> Self {
        self.sequence_style = style;
        self
    }

    /// Set the adjacent-containers policy.
    pub fn adjacent_containers(mut self, policy: AdjacentContainers) -> Self {
        self.adjacent_containers = policy;
        self
    }
}
