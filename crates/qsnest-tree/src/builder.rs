//! Tree builder folding key-path assignments into a value tree.
//!
//! Every container starts out undecided. `[]` and `[n]` make it a sequence;
//! a `[name]`, or an index that is neither an existing position nor the next
//! one, turns it into a mapping for good. On that promotion each item is
//! re-keyed by the segment that last placed it (`[n]` gives `"n"`, `[]` gives
//! `""`), so the mapping is the one the same assignments would have built had
//! the container been a mapping from the start.

use indexmap::IndexMap;
use qsnest_format::{KeyPath, ParseOptions, PushMode, Segment};
use qsnest_tokenizer::Span;
use tracing::{debug, warn};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Limit};
use crate::value::{Mapping, Value};

/// Builder that constructs a tree from `(path, value)` assignments.
///
/// The builder owns the tree it is building; drive it with one sequential
/// pass and call [`TreeBuilder::finish`] to take the result.
#[derive(Debug)]
pub struct TreeBuilder {
    root: IndexMap<String, Node>,
    options: ParseOptions,
    assignments: usize,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
enum Node {
    Vacant,
    Leaf(Option<String>),
    Sequence(Vec<Item>),
    Mapping(IndexMap<String, Node>),
}

#[derive(Debug)]
struct Item {
    placed_by: Placement,
    node: Node,
}

/// Which kind of segment last addressed a sequence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Push,
    Index,
}

impl Item {
    fn new(placed_by: Placement) -> Self {
        Self {
            placed_by,
            node: Node::Vacant,
        }
    }

    /// The segment that re-addresses this item at `position`.
    fn segment(&self, position: usize) -> Segment {
        match self.placed_by {
            Placement::Push => Segment::Push,
            Placement::Index => Segment::Index(position),
        }
    }
}

impl TreeBuilder {
    /// Create a new tree builder.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create a tree builder with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            root: IndexMap::new(),
            options,
            assignments: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Apply one assignment: set the leaf at `path` to `value`.
    ///
    /// `span` locates the assignment in the source for diagnostics. Fails only
    /// when a resource guard trips.
    pub fn assign(
        &mut self,
        path: &KeyPath,
        value: Option<String>,
        span: Option<Span>,
    ) -> Result<(), Error> {
        self.assignments += 1;
        if self.assignments > self.options.max_pairs {
            return Err(Error::limit(Limit::Pairs, self.options.max_pairs).at(path));
        }
        if path.depth() > self.options.max_depth {
            return Err(Error::limit(Limit::Depth, self.options.max_depth).at(path));
        }

        let mut walk = Walk {
            push_mode: self.options.push_mode,
            path,
            span,
            diagnostics: &mut self.diagnostics,
        };
        let mut node = self.root.entry(path.root.clone()).or_insert(Node::Vacant);
        for (i, segment) in path.segments.iter().enumerate() {
            node = walk.step(node, segment, &path.segments[i + 1..]);
        }
        if matches!(node, Node::Sequence(_) | Node::Mapping(_)) {
            debug!("Container at {} overwritten by a scalar", path);
        }
        *node = Node::Leaf(value);
        Ok(())
    }

    /// Finish building and return the root mapping.
    pub fn finish(self) -> Value {
        self.finish_with_diagnostics().0
    }

    /// Finish building, returning the root mapping and the diagnostics.
    pub fn finish_with_diagnostics(self) -> (Value, Vec<Diagnostic>) {
        let root: Mapping = self
            .root
            .into_iter()
            .map(|(key, node)| (key, node.into_value()))
            .collect();
        (Value::Mapping(root), self.diagnostics)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Vacant => Value::Scalar(None),
            Node::Leaf(text) => Value::Scalar(text),
            Node::Sequence(items) => Value::seq(items.into_iter().map(|i| i.node.into_value())),
            Node::Mapping(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
        }
    }
}

/// State for applying one assignment.
struct Walk<'a> {
    push_mode: PushMode,
    path: &'a KeyPath,
    span: Option<Span>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Walk<'_> {
    /// Descend one segment, shaping `node` as the segment requires.
    fn step<'n>(&mut self, node: &'n mut Node, segment: &Segment, rest: &[Segment]) -> &'n mut Node {
        if matches!(node, Node::Leaf(_)) {
            self.conflict();
            *node = Node::Vacant;
        }
        match segment {
            Segment::Push => self.push(node, rest),
            Segment::Index(index) => self.index(node, *index),
            Segment::Name(name) => self.name(node, name),
        }
    }

    fn push<'n>(&mut self, node: &'n mut Node, rest: &[Segment]) -> &'n mut Node {
        match node {
            Node::Mapping(entries) => entries.entry(String::new()).or_insert(Node::Vacant),
            Node::Sequence(items) => {
                let merge = self.push_mode == PushMode::Merge
                    && !rest.is_empty()
                    && items.last().is_some_and(|last| !occupied(&last.node, rest));
                if !merge {
                    items.push(Item::new(Placement::Push));
                }
                let last = items.len() - 1;
                &mut items[last].node
            }
            Node::Vacant | Node::Leaf(_) => {
                *node = Node::Sequence(Vec::new());
                self.push(node, rest)
            }
        }
    }

    fn index<'n>(&mut self, node: &'n mut Node, index: usize) -> &'n mut Node {
        if matches!(node, Node::Vacant | Node::Leaf(_)) {
            *node = Node::Sequence(Vec::new());
        }
        if matches!(node, Node::Sequence(items) if index > items.len()) {
            self.promote(node);
        }
        match node {
            Node::Sequence(items) => {
                if index == items.len() {
                    items.push(Item::new(Placement::Index));
                }
                let item = &mut items[index];
                item.placed_by = Placement::Index;
                &mut item.node
            }
            // A mapping reads `[n]` as the key "n".
            other => self.name(other, &index.to_string()),
        }
    }

    fn name<'n>(&mut self, node: &'n mut Node, name: &str) -> &'n mut Node {
        match node {
            Node::Mapping(entries) => entries.entry(name.to_owned()).or_insert(Node::Vacant),
            Node::Sequence(_) => {
                self.promote(node);
                self.name(node, name)
            }
            Node::Vacant | Node::Leaf(_) => {
                *node = Node::Mapping(IndexMap::new());
                self.name(node, name)
            }
        }
    }

    /// Turn a sequence into a mapping, replaying its items as mapping keys.
    fn promote(&mut self, node: &mut Node) {
        let items = match std::mem::replace(node, Node::Mapping(IndexMap::new())) {
            Node::Sequence(items) => items,
            other => {
                *node = other;
                return;
            }
        };
        debug!("Promoting {} items at {} to a mapping", items.len(), self.path);
        for (position, item) in items.into_iter().enumerate() {
            let slot = self.step(node, &item.segment(position), &[]);
            self.absorb(slot, item.node);
        }
    }

    /// Replay the subtree `src` onto `dst`, later writes winning.
    fn absorb(&mut self, dst: &mut Node, src: Node) {
        match src {
            Node::Vacant => {}
            Node::Leaf(value) => *dst = Node::Leaf(value),
            Node::Mapping(entries) => {
                for (key, child) in entries {
                    let slot = self.step(dst, &Segment::Name(key), &[]);
                    self.absorb(slot, child);
                }
            }
            Node::Sequence(items) => {
                for (position, item) in items.into_iter().enumerate() {
                    let slot = self.step(dst, &item.segment(position), &[]);
                    self.absorb(slot, item.node);
                }
            }
        }
    }

    fn conflict(&mut self) {
        warn!("Scalar at {} replaced by a container", self.path);
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::StructuralConflict {
                key: self.path.to_string(),
            },
            self.span,
        ));
    }
}

/// Whether assigning along `path` below `node` would overwrite something.
fn occupied(node: &Node, path: &[Segment]) -> bool {
    let Some((segment, rest)) = path.split_first() else {
        return !matches!(node, Node::Vacant);
    };
    match node {
        Node::Vacant => false,
        Node::Leaf(_) => true,
        Node::Mapping(entries) => {
            let key = segment.mapping_key();
            entries
                .get(&*key)
                .is_some_and(|child| occupied(child, rest))
        }
        Node::Sequence(items) => match segment {
            Segment::Push => false,
            Segment::Index(index) => items
                .get(*index)
                .is_some_and(|item| occupied(&item.node, rest)),
            Segment::Name(name) => items.iter().enumerate().any(|(position, item)| {
                item.segment(position).mapping_key() == name.as_str() && occupied(&item.node, rest)
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsnest_format::decode_component;
    use serde_json::json;

    fn build_with(options: ParseOptions, pairs: &[(&str, Option<&str>)]) -> (Value, Vec<Diagnostic>) {
        let mut builder = TreeBuilder::with_options(options);
        for (key, value) in pairs {
            let path = KeyPath::parse(key).unwrap();
            let value = value.map(|v| decode_component(v).unwrap().into_owned());
            builder.assign(&path, value, None).unwrap();
        }
        builder.finish_with_diagnostics()
    }

    fn build(pairs: &[(&str, Option<&str>)]) -> Value {
        build_with(ParseOptions::default(), pairs).0
    }

    fn json(value: &Value) -> serde_json::Value {
        serde_json::Value::from(value)
    }

    #[test]
    fn test_empty() {
        assert_eq!(TreeBuilder::new().finish(), Value::mapping());
    }

    #[test]
    fn test_last_write_wins() {
        let value = build(&[("a", Some("1")), ("a", Some("2")), ("a", Some("3"))]);
        assert_eq!(json(&value), json!({"a": "3"}));
    }

    #[test]
    fn test_push_builds_sequence() {
        let value = build(&[("colors[]", Some("orange")), ("colors[]", Some("rebeccapurple"))]);
        assert_eq!(json(&value), json!({"colors": ["orange", "rebeccapurple"]}));
    }

    #[test]
    fn test_name_promotes_pushed_items() {
        let value = build(&[
            ("a[]", Some("what")),
            ("a[subkey]", Some("is")),
            ("a[]", Some("this")),
        ]);
        assert_eq!(json(&value), json!({"a": {"": "this", "subkey": "is"}}));
        let keys: Vec<_> = value.get("a").and_then(Value::as_mapping).unwrap().keys().collect();
        assert_eq!(keys, vec!["", "subkey"]);
    }

    #[test]
    fn test_name_promotes_indexed_items() {
        let value = build(&[("a[0]", Some("x")), ("a[1]", Some("y")), ("a[k]", Some("z"))]);
        assert_eq!(json(&value), json!({"a": {"0": "x", "1": "y", "k": "z"}}));
    }

    #[test]
    fn test_index_gap_promotes() {
        let value = build(&[("a[0]", Some("x")), ("a[2]", Some("y"))]);
        assert_eq!(json(&value), json!({"a": {"0": "x", "2": "y"}}));

        let value = build(&[("a[1]", Some("x"))]);
        assert_eq!(json(&value), json!({"a": {"1": "x"}}));
    }

    #[test]
    fn test_index_reshapes_node() {
        let (value, diagnostics) = build_with(
            ParseOptions::default(),
            &[
                ("a", Some("s")),
                ("a[0]", Some("x")),
                ("a[0]", Some("y")),
                ("a[1]", Some("z")),
                ("a[3]", Some("w")),
                ("a[1]", Some("v")),
            ],
        );
        assert_eq!(json(&value), json!({"a": {"0": "y", "1": "v", "3": "w"}}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_promotion_is_permanent() {
        let value = build(&[("a[k]", Some("1")), ("a[0]", Some("2")), ("a[]", Some("3"))]);
        assert_eq!(json(&value), json!({"a": {"k": "1", "0": "2", "": "3"}}));
    }

    #[test]
    fn test_index_overwrites_existing_position() {
        let value = build(&[("a[]", Some("x")), ("a[]", Some("y")), ("a[0]", Some("z"))]);
        assert_eq!(json(&value), json!({"a": ["z", "y"]}));
    }

    #[test]
    fn test_push_merges_into_last_element() {
        let value = build(&[
            ("a[][x]", Some("1")),
            ("a[][y]", Some("2")),
            ("a[][x]", Some("3")),
        ]);
        assert_eq!(json(&value), json!({"a": [{"x": "1", "y": "2"}, {"x": "3"}]}));
    }

    #[test]
    fn test_adjacent_push_sequences_flatten() {
        let value = build(&[("a[][]", Some("1")), ("a[][]", Some("2"))]);
        assert_eq!(json(&value), json!({"a": [["1", "2"]]}));
    }

    #[test]
    fn test_append_mode_separates() {
        let options = ParseOptions::default().push_mode(PushMode::Append);
        let (value, _) = build_with(options, &[("a[][x]", Some("1")), ("a[][y]", Some("2"))]);
        assert_eq!(json(&value), json!({"a": [{"x": "1"}, {"y": "2"}]}));

        let options = ParseOptions::default().push_mode(PushMode::Append);
        let (value, _) = build_with(options, &[("a[][]", Some("1")), ("a[][]", Some("2"))]);
        assert_eq!(json(&value), json!({"a": [["1"], ["2"]]}));
    }

    #[test]
    fn test_push_after_scalar_appends() {
        let value = build(&[("a[]", Some("1")), ("a[][x]", Some("2"))]);
        assert_eq!(json(&value), json!({"a": ["1", {"x": "2"}]}));
    }

    #[test]
    fn test_push_on_mapping_is_empty_key() {
        let value = build(&[("a[x]", Some("1")), ("a[][y]", Some("2")), ("a[][z]", Some("3"))]);
        assert_eq!(json(&value), json!({"a": {"x": "1", "": {"y": "2", "z": "3"}}}));
    }

    #[test]
    fn test_promotion_merges_pushed_containers() {
        let value = build(&[
            ("a[][x]", Some("1")),
            ("a[][x]", Some("2")),
            ("a[k]", Some("3")),
        ]);
        assert_eq!(json(&value), json!({"a": {"": {"x": "2"}, "k": "3"}}));
    }

    #[test]
    fn test_structural_conflict_is_recorded() {
        let (value, diagnostics) = build_with(
            ParseOptions::default(),
            &[("a", Some("1")), ("a[b]", Some("2"))],
        );
        assert_eq!(json(&value), json!({"a": {"b": "2"}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::StructuralConflict {
                key: "a[b]".to_string()
            }
        );
    }

    #[test]
    fn test_container_overwritten_by_scalar() {
        let (value, diagnostics) = build_with(
            ParseOptions::default(),
            &[("a[b]", Some("1")), ("a", Some("2"))],
        );
        assert_eq!(json(&value), json!({"a": "2"}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_naked_and_empty_values() {
        let value = build(&[("key", None), ("empty", Some("")), ("list[]", None)]);
        assert_eq!(json(&value), json!({"key": null, "empty": "", "list": [null]}));
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = TreeBuilder::with_options(ParseOptions::default().max_depth(2));
        let ok = KeyPath::parse("a[b][c]").unwrap();
        assert!(builder.assign(&ok, None, None).is_ok());

        let deep = KeyPath::parse("a[b][c][d]").unwrap();
        let err = builder.assign(&deep, None, None).unwrap_err();
        assert!(err.is_resource_limit());
        assert_eq!(err.path.as_deref(), Some("a[b][c][d]"));
    }

    #[test]
    fn test_pair_limit() {
        let mut builder = TreeBuilder::with_options(ParseOptions::default().max_pairs(2));
        let path = KeyPath::new("a");
        assert!(builder.assign(&path, None, None).is_ok());
        assert!(builder.assign(&path, None, None).is_ok());
        assert!(builder.assign(&path, None, None).unwrap_err().is_resource_limit());
    }

    #[test]
    fn test_occupied() {
        let mut node = Node::Mapping(IndexMap::new());
        if let Node::Mapping(entries) = &mut node {
            entries.insert("x".to_string(), Node::Leaf(Some("1".to_string())));
        }
        let x = [Segment::Name("x".to_string())];
        let y = [Segment::Name("y".to_string())];
        assert!(occupied(&node, &x));
        assert!(!occupied(&node, &y));
        assert!(occupied(&Node::Leaf(None), &x));
        assert!(!occupied(&Node::Vacant, &x));
        assert!(!occupied(&Node::Sequence(Vec::new()), &[Segment::Push]));
    }
}
