// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Composed YAML documents.
//!
//! A [`Node`] keeps its properties (anchor, tag, comments) apart from its
//! [`Content`]. Aliases hold the anchor *name* only; they are resolved against
//! the anchors defined before them when values are materialized.

use ordermap::OrderMap;
use serde::Serialize;

use crate::error::Diagnostic;
use crate::options::Version;
use crate::value::Value;

/// Byte offsets of a node: where it starts, where its value ends, and where
/// the node ends including any trailing comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeRange {
    pub start: usize,
    pub value_end: usize,
    pub node_end: usize,
}

impl NodeRange {
    #[must_use]
    pub const fn new(start: usize, value_end: usize, node_end: usize) -> Self {
        Self {
            start,
            value_end,
            node_end,
        }
    }
}

/// How a scalar was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarStyle {
    Plain,
    QuoteSingle,
    QuoteDouble,
    BlockLiteral,
    BlockFolded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
    /// The resolved value.
    pub value: Value,
    /// The decoded text the value was resolved from.
    pub source: String,
    pub style: ScalarStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub key: Node,
    pub value: Option<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mapping {
    pub items: Vec<Pair>,
    /// Written in flow style (`{...}`).
    pub flow: bool,
}

impl Mapping {
    /// Value node of the first pair whose key is a scalar with text `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.items
            .iter()
            .find(|pair| pair.key.scalar_source() == Some(key))
            .and_then(|pair| pair.value.as_ref())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.items
            .iter_mut()
            .find(|pair| pair.key.scalar_source() == Some(key))
            .and_then(|pair| pair.value.as_mut())
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.items
            .iter()
            .any(|pair| pair.key.scalar_source() == Some(key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    pub items: Vec<Node>,
    /// Written in flow style (`[...]`).
    pub flow: bool,
}

impl Sequence {
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Node> {
        self.items.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.items.get_mut(idx)
    }
}

/// The content of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Sequence),
    /// A reference to the anchor with this name.
    Alias { name: String },
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub anchor: Option<String>,
    /// The explicit tag, expanded, or the tag the value resolved to.
    pub tag: Option<String>,
    pub content: Content,
    pub range: NodeRange,
    /// Comment lines directly before the node.
    pub comment_before: Option<String>,
    /// Comment after the node on its last line, or inside an empty collection.
    pub comment: Option<String>,
    /// A blank line precedes the node.
    pub space_before: bool,
}

impl Node {
    #[must_use]
    pub const fn new(content: Content, range: NodeRange) -> Self {
        Self {
            anchor: None,
            tag: None,
            content,
            range,
            comment_before: None,
            comment: None,
            space_before: false,
        }
    }

    #[must_use]
    pub fn scalar(value: Value, source: impl Into<String>, style: ScalarStyle, range: NodeRange) -> Self {
        Self::new(
            Content::Scalar(Scalar {
                value,
                source: source.into(),
                style,
            }),
            range,
        )
    }

    #[must_use]
    pub fn alias(name: impl Into<String>, range: NodeRange) -> Self {
        Self::new(Content::Alias { name: name.into() }, range)
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match &self.content {
            Content::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match &self.content {
            Content::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub const fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match &mut self.content {
            Content::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Sequence> {
        match &self.content {
            Content::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub const fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match &mut self.content {
            Content::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// The anchor name an alias node refers to.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        match &self.content {
            Content::Alias { name } => Some(name),
            _ => None,
        }
    }

    /// The decoded text of a scalar node.
    #[must_use]
    pub fn scalar_source(&self) -> Option<&str> {
        self.as_scalar().map(|scalar| scalar.source.as_str())
    }

    /// The resolved value of a scalar node.
    #[must_use]
    pub fn scalar_value(&self) -> Option<&Value> {
        self.as_scalar().map(|scalar| &scalar.value)
    }

    /// Look up `key` in a mapping node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_mapping_mut().and_then(|map| map.get_mut(key))
    }

    /// Item `idx` of a sequence node.
    #[must_use]
    pub fn get_index(&self, idx: usize) -> Option<&Node> {
        self.as_sequence().and_then(|seq| seq.get(idx))
    }

    /// Number of nodes in this subtree, used to weigh alias expansion.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match &self.content {
            Content::Scalar(_) | Content::Alias { .. } => 1,
            Content::Mapping(map) => {
                1 + map
                    .items
                    .iter()
                    .map(|pair| pair.key.node_count() + pair.value.as_ref().map_or(0, Self::node_count))
                    .sum::<usize>()
            }
            Content::Sequence(seq) => 1 + seq.items.iter().map(Self::node_count).sum::<usize>(),
        }
    }
}

/// A `%YAML` or `%TAG` directive as declared in a document prologue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name")]
pub enum DirectiveEntry {
    #[serde(rename = "YAML")]
    Yaml { version: Version },
    #[serde(rename = "TAG")]
    Tag { handle: String, prefix: String },
}

/// A composed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// The root node; `None` for an empty document.
    pub contents: Option<Node>,
    /// Effective YAML version.
    pub version: Version,
    /// `%TAG` handles in effect, including the defaults `!` and `!!`.
    pub tags: OrderMap<String, String>,
    /// Directives as declared (or carried) for this document.
    pub directives: Vec<DirectiveEntry>,
    /// The document started with an explicit `---` marker.
    pub directives_end_marker: bool,
    /// The final anchor table: each name bound to its last definition.
    pub anchors: OrderMap<String, Node>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// Comment before the document contents.
    pub comment_before: Option<String>,
    /// Comment after the document contents.
    pub comment: Option<String>,
    pub range: NodeRange,
}

impl Document {
    /// A document without contents spanning `0..end_offset`.
    #[must_use]
    pub fn empty(version: Version, end_offset: usize) -> Self {
        Self {
            contents: None,
            version,
            tags: OrderMap::new(),
            directives: Vec::new(),
            directives_end_marker: false,
            anchors: OrderMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            comment_before: None,
            comment: None,
            range: NodeRange::new(0, end_offset, end_offset),
        }
    }

    /// Look up `key` in the root mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.contents.as_ref().and_then(|node| node.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.contents.as_mut().and_then(|node| node.get_mut(key))
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Node {
        Node::scalar(
            Value::String(text.to_owned()),
            text,
            ScalarStyle::Plain,
            NodeRange::default(),
        )
    }

    #[test]
    fn test_mapping_lookup_and_mutation() {
        let mut map = Mapping {
            items: vec![Pair {
                key: plain("name"),
                value: Some(plain("old")),
            }],
            flow: false,
        };
        assert!(map.has("name"));
        assert_eq!(map.get("name").and_then(Node::scalar_source), Some("old"));
        if let Some(node) = map.get_mut("name") {
            *node = plain("new");
        }
        assert_eq!(map.get("name").and_then(Node::scalar_source), Some("new"));
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn test_node_count() {
        let seq = Node::new(
            Content::Sequence(Sequence {
                items: vec![plain("a"), plain("b")],
                flow: true,
            }),
            NodeRange::default(),
        );
        assert_eq!(seq.node_count(), 3);
        assert_eq!(seq.get_index(1).and_then(Node::scalar_source), Some("b"));
    }
}
