//! Render a value tree as a nested query string.

use qsnest_format::{AdjacentContainers, BuildOptions, KeyPath, QueryWriter, Segment, SequenceStyle};

use crate::error::{Error, Limit};
use crate::value::{Sequence, Value};

/// Serialize a tree under the nested strategy.
///
/// The root must be a mapping; each of its entries is a top-level key.
pub(crate) fn serialize_nested(value: &Value, options: &BuildOptions) -> Result<String, Error> {
    let Value::Mapping(root) = value else {
        return Err(Error::unsupported(format!(
            "the root of a nested query must be a mapping, not a {}",
            value.kind()
        )));
    };

    let mut serializer = Serializer::new(options);
    for (key, child) in root.iter() {
        serializer.path = KeyPath::new(key.as_str());
        serializer.walk(child)?;
    }
    Ok(serializer.writer.finish())
}

struct Serializer<'a> {
    options: &'a BuildOptions,
    writer: QueryWriter,
    path: KeyPath,
}

impl<'a> Serializer<'a> {
    fn new(options: &'a BuildOptions) -> Self {
        Self {
            options,
            writer: QueryWriter::new(),
            path: KeyPath::default(),
        }
    }

    fn walk(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Scalar(None) if self.path.root.is_empty() && self.path.depth() == 0 => Err(
                Error::unsupported("a naked empty key renders as an empty segment").at(&self.path),
            ),
            Value::Scalar(text) => {
                self.writer.write_path(&self.path, text.as_deref());
                Ok(())
            }
            Value::Sequence(seq) if seq.is_empty() => {
                Err(Error::unsupported("an empty sequence renders no pairs").at(&self.path))
            }
            Value::Mapping(map) if map.is_empty() => {
                Err(Error::unsupported("an empty mapping renders no pairs").at(&self.path))
            }
            Value::Mapping(map) => {
                for (key, child) in map.iter() {
                    self.descend(Segment::Name(key.clone()), child)?;
                }
                Ok(())
            }
            Value::Sequence(seq) => {
                let indexed = self.index_items(seq)?;
                for (position, item) in seq.iter().enumerate() {
                    let segment = if indexed {
                        Segment::Index(position)
                    } else {
                        Segment::Push
                    };
                    self.descend(segment, item)?;
                }
                Ok(())
            }
        }
    }

    fn descend(&mut self, segment: Segment, value: &Value) -> Result<(), Error> {
        self.path.push(segment);
        if self.path.depth() > self.options.max_depth {
            return Err(Error::limit(Limit::Depth, self.options.max_depth).at(&self.path));
        }
        self.walk(value)?;
        self.path.pop();
        Ok(())
    }

    /// Whether the items of `seq` get explicit indices.
    ///
    /// Every container renders at least one pair, so two neighbouring
    /// container items are neighbours in the output too.
    fn index_items(&self, seq: &Sequence) -> Result<bool, Error> {
        if self.options.sequence_style == SequenceStyle::Index {
            return Ok(true);
        }
        let adjacent = seq
            .items
            .windows(2)
            .any(|pair| pair[0].is_container() && pair[1].is_container());
        if !adjacent {
            return Ok(false);
        }
        match self.options.adjacent_containers {
            AdjacentContainers::Flatten => Ok(false),
            AdjacentContainers::Index => Ok(true),
            AdjacentContainers::Reject => Err(Error::unsupported(
                "adjacent containers in a sequence would merge when parsed back",
            )
            .at(&self.path)),
        }
    }
}
