// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Conversion of composed documents to native [`Value`]s.
//!
//! Aliases are resolved here, in document order, against the anchors seen
//! so far. This is the only step that can fail on a composed document.

use ordermap::OrderMap;

use crate::document::{Content, Document, Mapping, Node};
use crate::error::{Diagnostic, ErrorKind};
use crate::schema::tags;
use crate::span::span;
use crate::value::Value;

/// Default bound on weighted alias expansion.
pub const DEFAULT_MAX_ALIAS_COUNT: usize = 100;

/// An alias or merge key that could not be turned into a value.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReferenceError {
    #[display("Unresolved alias (the anchor must be set before the alias): {name}")]
    Unresolved { name: String, offset: usize },
    #[display("Alias {name} refers to a node that contains it")]
    Cyclic { name: String, offset: usize },
    #[display("Merge sources must be maps or map aliases")]
    MergeSource { offset: usize },
    #[display("Excessive alias count indicates a resource exhaustion attack")]
    ExcessiveAliasing { name: String, offset: usize },
}

impl ReferenceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MergeSource { .. } => ErrorKind::BadCollectionType,
            _ => ErrorKind::AliasResolveFailed,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Unresolved { offset, .. }
            | Self::Cyclic { offset, .. }
            | Self::MergeSource { offset }
            | Self::ExcessiveAliasing { offset, .. } => *offset,
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.kind(), span(self.offset(), self.offset() + 1), self.to_string())
    }
}

struct Anchor<'d> {
    node: &'d Node,
    /// `None` while the anchored node is being converted.
    value: Option<Value>,
    count: usize,
    alias_count: usize,
}

struct Materializer<'d> {
    anchors: OrderMap<&'d str, Anchor<'d>>,
    max_alias_count: Option<usize>,
}

impl<'d> Materializer<'d> {
    fn node_value(&mut self, node: &'d Node) -> Result<Value, ReferenceError> {
        if let Content::Alias { name } = &node.content {
            return self.alias_value(name, node.range.start);
        }
        if let Some(anchor) = &node.anchor {
            self.anchors.insert(
                anchor,
                Anchor {
                    node,
                    value: None,
                    count: 0,
                    alias_count: 0,
                },
            );
        }

        let value = match &node.content {
            Content::Scalar(scalar) => scalar.value.clone(),
            Content::Sequence(seq) if node.tag.as_deref() == Some(tags::OMAP) => {
                let mut map = OrderMap::new();
                for item in &seq.items {
                    match item.as_mapping().and_then(|map| map.items.first()) {
                        Some(pair) => {
                            let key = self.node_value(&pair.key)?;
                            let value = self.optional_value(pair.value.as_ref())?;
                            map.insert(key, value);
                        }
                        None => {
                            map.insert(self.node_value(item)?, Value::Null);
                        }
                    }
                }
                Value::Mapping(map)
            }
            Content::Sequence(seq) => Value::Sequence(
                seq.items
                    .iter()
                    .map(|item| self.node_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Content::Mapping(map) => self.mapping_value(map)?,
            Content::Alias { .. } => Value::Null,
        };

        // A nested node may have rebound the name; the later binding stays.
        if let Some(anchor) = &node.anchor
            && let Some(entry) = self.anchors.get_mut(anchor.as_str())
            && std::ptr::eq(entry.node, node)
        {
            entry.value = Some(value.clone());
        }
        Ok(value)
    }

    fn optional_value(&mut self, node: Option<&'d Node>) -> Result<Value, ReferenceError> {
        node.map_or(Ok(Value::Null), |node| self.node_value(node))
    }

    fn alias_value(&mut self, name: &str, offset: usize) -> Result<Value, ReferenceError> {
        let Some(anchor) = self.anchors.get(name) else {
            return Err(ReferenceError::Unresolved {
                name: name.to_owned(),
                offset,
            });
        };
        if anchor.value.is_none() {
            return Err(ReferenceError::Cyclic {
                name: name.to_owned(),
                offset,
            });
        }
        if let Some(max) = self.max_alias_count {
            let alias_count = if anchor.alias_count == 0 {
                self.alias_count(anchor.node)
            } else {
                anchor.alias_count
            };
            let Some(anchor) = self.anchors.get_mut(name) else {
                return Err(ReferenceError::Unresolved {
                    name: name.to_owned(),
                    offset,
                });
            };
            anchor.count += 1;
            anchor.alias_count = alias_count;
            if anchor.count * anchor.alias_count > max {
                log::debug!("Alias *{name} expanded {} times", anchor.count);
                return Err(ReferenceError::ExcessiveAliasing {
                    name: name.to_owned(),
                    offset,
                });
            }
        }
        Ok(self
            .anchors
            .get(name)
            .and_then(|anchor| anchor.value.clone())
            .unwrap_or_default())
    }

    /// The weight of expanding `node`: 1 for plain data, or the weight of
    /// the most expanded alias it contains.
    fn alias_count(&self, node: &Node) -> usize {
        match &node.content {
            Content::Alias { name } => self
                .anchors
                .get(name.as_str())
                .map_or(0, |anchor| anchor.count * anchor.alias_count),
            Content::Sequence(seq) => seq
                .items
                .iter()
                .map(|item| self.alias_count(item))
                .max()
                .unwrap_or(0),
            Content::Mapping(map) => map
                .items
                .iter()
                .map(|pair| {
                    let key = self.alias_count(&pair.key);
                    let value = pair.value.as_ref().map_or(0, |value| self.alias_count(value));
                    key.max(value)
                })
                .max()
                .unwrap_or(0),
            Content::Scalar(_) => 1,
        }
    }

    fn mapping_value(&mut self, map: &'d Mapping) -> Result<Value, ReferenceError> {
        let mut out = OrderMap::new();
        for pair in &map.items {
            let is_merge = pair.key.tag.as_deref() == Some(tags::MERGE) && pair.key.as_scalar().is_some();
            if is_merge && let Some(value) = &pair.value {
                let sources: Vec<&'d Node> = match &value.content {
                    Content::Sequence(seq) => seq.items.iter().collect(),
                    _ => vec![value],
                };
                for source in sources {
                    let Value::Mapping(entries) = self.node_value(source)? else {
                        return Err(ReferenceError::MergeSource {
                            offset: source.range.start,
                        });
                    };
                    for (key, value) in entries {
                        out.entry(key).or_insert(value);
                    }
                }
                continue;
            }
            let key = self.node_value(&pair.key)?;
            let value = self.optional_value(pair.value.as_ref())?;
            out.insert(key, value);
        }
        Ok(Value::Mapping(out))
    }
}

impl Document {
    /// Convert the document to a native value, resolving aliases and merge
    /// keys, with the default alias expansion bound.
    pub fn to_value(&self) -> Result<Value, ReferenceError> {
        self.to_value_with(Some(DEFAULT_MAX_ALIAS_COUNT))
    }

    /// Like [`Document::to_value`] with an explicit alias expansion bound;
    /// `None` disables the check.
    pub fn to_value_with(&self, max_alias_count: Option<usize>) -> Result<Value, ReferenceError> {
        let mut materializer = Materializer {
            anchors: OrderMap::new(),
            max_alias_count,
        };
        self.contents
            .as_ref()
            .map_or(Ok(Value::Null), |node| materializer.node_value(node))
    }
}
