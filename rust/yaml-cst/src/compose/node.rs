// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Composition of single nodes: scalars, aliases, empty values and the tag
//! handling of collections.

use ordermap::OrderMap;

use super::Diagnostics;
use super::block_scalar::resolve_block_scalar;
use super::flow_scalar::{ScalarText, resolve_flow_scalar};
use super::props::{Props, empty_scalar_position, resolve_end};
use crate::cst::{FlowScalar, SourceToken, Token};
use crate::directives::Directives;
use crate::document::{Content, Node, NodeRange, ScalarStyle};
use crate::error::{ErrorKind, ErrorPos};
use crate::options::Options;
use crate::schema::{CollectionKind, STRING, ScalarTag, Schema, known_tag, tags};
use crate::token::TokenKind;
use crate::value::Value;

/// State for composing the nodes of one document.
pub(crate) struct DocComposer<'a> {
    pub(super) options: &'a Options,
    pub(super) schema: &'a Schema,
    pub(super) directives: &'a Directives,
    pub(super) diagnostics: &'a mut Diagnostics,
    anchors: OrderMap<String, Node>,
    /// Composing a mapping key.
    pub(super) at_key: bool,
    /// No collection has been entered yet.
    pub(super) at_root: bool,
}

impl<'a> DocComposer<'a> {
    pub(crate) fn new(
        options: &'a Options,
        schema: &'a Schema,
        directives: &'a Directives,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            options,
            schema,
            directives,
            diagnostics,
            anchors: OrderMap::new(),
            at_key: false,
            at_root: true,
        }
    }

    pub(crate) fn into_anchors(self) -> OrderMap<String, Node> {
        self.anchors
    }

    pub(crate) fn compose_node(&mut self, token: &Token, props: &Props<'_>) -> Node {
        let mut node = match token {
            Token::FlowScalar(scalar) if scalar.kind == TokenKind::Alias => {
                if props.anchor.is_some() || props.tag.is_some() {
                    self.diagnostics.error(
                        token,
                        ErrorKind::AliasProps,
                        "An alias node must not specify any properties",
                    );
                }
                self.compose_alias(scalar)
            }
            Token::FlowScalar(scalar) => {
                let text = resolve_flow_scalar(scalar, self.options.strict, self.diagnostics);
                let plain = scalar.kind == TokenKind::Scalar;
                let mut node = self.compose_scalar(text, plain, token.into(), props.tag);
                self.set_anchor(&mut node, props.anchor);
                node
            }
            Token::BlockScalar(scalar) => {
                let text =
                    resolve_block_scalar(scalar, self.options.strict, self.at_root, self.diagnostics);
                let mut node = self.compose_scalar(text, false, token.into(), props.tag);
                self.set_anchor(&mut node, props.anchor);
                node
            }
            Token::BlockMap(_) | Token::BlockSeq(_) | Token::FlowCollection(_) => {
                let mut node = self.compose_collection(token, props);
                self.set_anchor(&mut node, props.anchor);
                node
            }
            other => {
                let message = match other {
                    Token::Error(err) => err.message.clone(),
                    _ => format!("Unsupported token (type: {})", other.type_name()),
                };
                self.diagnostics.error(other, ErrorKind::UnexpectedToken, message);
                return self.compose_empty_node(other.offset(), None, None, props);
            }
        };
        if props.space_before {
            node.space_before = true;
        }
        if !props.comment.is_empty() {
            let empty_plain = matches!(token, Token::FlowScalar(scalar)
                if scalar.kind == TokenKind::Scalar && scalar.source.is_empty());
            if empty_plain {
                node.comment = Some(props.comment.clone());
            } else {
                node.comment_before = Some(props.comment.clone());
            }
        }
        self.register_anchor(&node);
        node
    }

    /// An empty plain scalar standing in for a missing value.
    pub(crate) fn compose_empty_node(
        &mut self,
        offset: usize,
        before: Option<&[SourceToken]>,
        pos: Option<usize>,
        props: &Props<'_>,
    ) -> Node {
        let offset = empty_scalar_position(offset, before, pos);
        let text = ScalarText {
            value: String::new(),
            style: Some(ScalarStyle::Plain),
            comment: String::new(),
            range: NodeRange::new(offset, offset, offset),
        };
        let mut node = self.compose_scalar(text, true, [offset, offset].into(), props.tag);
        self.set_anchor(&mut node, props.anchor);
        if props.space_before {
            node.space_before = true;
        }
        if !props.comment.is_empty() {
            node.comment = Some(props.comment.clone());
            node.range.node_end = props.end;
        }
        self.register_anchor(&node);
        node
    }

    fn compose_alias(&mut self, scalar: &FlowScalar) -> Node {
        let FlowScalar {
            offset, source, end, ..
        } = scalar;
        let name = source.get(1..).unwrap_or_default();
        if name.is_empty() {
            self.diagnostics
                .error(*offset, ErrorKind::BadAlias, "Alias cannot be an empty string");
        }
        if name.ends_with(':') {
            self.diagnostics.warn(
                offset + source.len() - 1,
                ErrorKind::BadAlias,
                "Alias ending in : is ambiguous",
            );
        }
        let value_end = offset + source.len();
        let end = resolve_end(end.as_deref(), value_end, self.options.strict, self.diagnostics);
        let mut node = Node::alias(name, NodeRange::new(*offset, value_end, end.offset));
        if !end.comment.is_empty() {
            node.comment = Some(end.comment);
        }
        node
    }

    /// Expand a tag token, reporting problems at the token.
    pub(super) fn tag_name(&mut self, tag: Option<&SourceToken>) -> Option<String> {
        let tag = tag?;
        let directives = self.directives;
        let diagnostics = &mut *self.diagnostics;
        directives.tag_name(&tag.source, |message, warning| {
            diagnostics.report(tag, ErrorKind::TagResolveFailed, message, warning);
        })
    }

    fn compose_scalar(
        &mut self,
        text: ScalarText,
        plain: bool,
        pos: ErrorPos,
        tag: Option<&SourceToken>,
    ) -> Node {
        let tag_name = self.tag_name(tag);
        let record: ScalarTag = match tag_name.as_deref() {
            Some("!") => STRING,
            Some(name) => self.schema.find_by_name(name, &text.value).unwrap_or_else(|| {
                self.diagnostics.report(
                    tag.map_or(pos, ErrorPos::from),
                    ErrorKind::TagResolveFailed,
                    format!("Unresolved tag: {name}"),
                    name != tags::STR,
                );
                STRING
            }),
            None if plain => {
                let record = *self.schema.find_by_test(&text.value, self.at_key);
                if let Some(other) = self.schema.compat_conflict(&text.value, record.tag) {
                    self.diagnostics.warn(
                        pos,
                        ErrorKind::TagResolveFailed,
                        format!(
                            "Value may be parsed as either {} or {}",
                            self.directives.tag_string(record.tag),
                            self.directives.tag_string(other)
                        ),
                    );
                }
                record
            }
            None => STRING,
        };

        let value = match (record.resolve)(&text.value) {
            Ok(value) => value,
            Err(message) => {
                self.diagnostics.warn(
                    tag.map_or(pos, ErrorPos::from),
                    ErrorKind::TagResolveFailed,
                    message,
                );
                Value::String(text.value.clone())
            }
        };
        let mut node = Node::scalar(
            value,
            text.value,
            text.style.unwrap_or(ScalarStyle::Plain),
            text.range,
        );
        node.tag = Some(match tag_name {
            Some(name) if name != "!" => name,
            _ => record.tag.to_owned(),
        });
        if !text.comment.is_empty() {
            node.comment = Some(text.comment);
        }
        node
    }

    fn compose_collection(&mut self, token: &Token, props: &Props<'_>) -> Node {
        let tag_token = props.tag;
        let tag_name = self.tag_name(tag_token);
        if matches!(token, Token::BlockSeq(_)) {
            let last_prop = match (props.anchor, tag_token) {
                (Some(anchor), Some(tag)) => Some(if anchor.offset > tag.offset { anchor } else { tag }),
                (anchor, tag) => anchor.or(tag),
            };
            if let Some(last_prop) = last_prop
                && props
                    .newline_after_prop
                    .is_none_or(|newline| newline.offset < last_prop.offset)
            {
                self.diagnostics.error(
                    last_prop,
                    ErrorKind::MissingChar,
                    "Missing newline after block sequence props",
                );
            }
        }

        let (kind, mut node) = match token {
            Token::BlockMap(map) => (CollectionKind::Map, self.resolve_block_map(map)),
            Token::BlockSeq(seq) => (CollectionKind::Seq, self.resolve_block_seq(seq)),
            Token::FlowCollection(fc) => {
                let kind = if fc.start.source == "{" {
                    CollectionKind::Map
                } else {
                    CollectionKind::Seq
                };
                (kind, self.resolve_flow_collection(fc))
            }
            other => {
                self.diagnostics.error(
                    other,
                    ErrorKind::Impossible,
                    format!("Expected a collection, found {}", other.type_name()),
                );
                return self.compose_empty_node(other.offset(), None, None, props);
            }
        };
        let default_tag = match kind {
            CollectionKind::Map => tags::MAP,
            CollectionKind::Seq => tags::SEQ,
        };

        node.tag = Some(match tag_name {
            None => default_tag.to_owned(),
            Some(name) if name == "!" || name == default_tag => default_tag.to_owned(),
            Some(name) => {
                let pos = tag_token.map_or(ErrorPos::from(node.range), ErrorPos::from);
                if let Some(coll) = self.schema.find_collection(&name, kind) {
                    self.validate_collection(coll.tag, &node, pos);
                } else if let Some(known) = known_tag(&name) {
                    self.diagnostics.warn(
                        pos,
                        ErrorKind::BadCollectionType,
                        format!(
                            "{} used for {} collection, but expects {}",
                            known.tag(),
                            kind.as_str(),
                            known.kind_name()
                        ),
                    );
                } else {
                    self.diagnostics.warn(
                        pos,
                        ErrorKind::TagResolveFailed,
                        format!("Unresolved tag: {name}"),
                    );
                }
                name
            }
        });
        node
    }

    /// Structural checks of `!!omap`, `!!pairs` and `!!set` collections.
    fn validate_collection(&mut self, tag: &str, node: &Node, pos: ErrorPos) {
        let mut error = |message: String| {
            self.diagnostics.error(pos, ErrorKind::TagResolveFailed, message);
        };
        match tag {
            tags::OMAP | tags::PAIRS => {
                let Some(seq) = node.as_sequence() else {
                    error("Expected a sequence for this tag".to_owned());
                    return;
                };
                let mut seen: Vec<&Value> = Vec::new();
                for item in &seq.items {
                    let Some(map) = item.as_mapping() else { continue };
                    if map.items.len() > 1 {
                        error("Each pair must have its own sequence indicator".to_owned());
                    }
                    if tag != tags::OMAP {
                        continue;
                    }
                    if let Some(pair) = map.items.first()
                        && let Some(scalar) = pair.key.as_scalar()
                    {
                        if seen.contains(&&scalar.value) {
                            error(format!(
                                "Ordered maps must not include duplicate keys: {}",
                                scalar.source
                            ));
                        } else {
                            seen.push(&scalar.value);
                        }
                    }
                }
            }
            tags::SET => {
                let Some(map) = node.as_mapping() else {
                    error("Expected a mapping for this tag".to_owned());
                    return;
                };
                let all_null = map.items.iter().all(|pair| {
                    pair.value.as_ref().is_none_or(|value| {
                        value.scalar_value().is_some_and(Value::is_null)
                            && value.comment.is_none()
                            && value.comment_before.is_none()
                    })
                });
                if !all_null {
                    error("Set items must all have null values".to_owned());
                }
            }
            _ => {}
        }
    }

    /// Check the value of a `<<` merge key against the anchors seen so far.
    /// Aliases to anchors defined later are left to materialization.
    pub(super) fn check_merge(&mut self, key: &Node, value: Option<&Node>) {
        if key.tag.as_deref() != Some(tags::MERGE) || key.as_scalar().is_none() {
            return;
        }
        let Some(value) = value else { return };
        let valid = match &value.content {
            Content::Sequence(seq) => seq.items.iter().all(|item| self.is_merge_source(item)),
            _ => self.is_merge_source(value),
        };
        if !valid {
            self.diagnostics.error(
                value.range,
                ErrorKind::BadCollectionType,
                "Merge sources must be maps or map aliases",
            );
        }
    }

    fn is_merge_source(&self, node: &Node) -> bool {
        match &node.content {
            Content::Mapping(_) => true,
            Content::Alias { name } => self
                .anchors
                .get(name)
                .is_none_or(|target| matches!(target.content, Content::Mapping(_) | Content::Alias { .. })),
            _ => false,
        }
    }

    /// Whether `key` equals the key of any of `pairs`, when unique keys are
    /// enforced. Merge keys may repeat.
    pub(super) fn map_includes<'n>(&self, mut keys: impl Iterator<Item = &'n Node>, key: &Node) -> bool {
        if !self.options.unique_keys || key.tag.as_deref() == Some(tags::MERGE) {
            return false;
        }
        let Some(search) = key.scalar_value() else {
            return false;
        };
        keys.any(|other| other.scalar_value() == Some(search))
    }

    fn set_anchor(&mut self, node: &mut Node, anchor: Option<&SourceToken>) {
        let Some(anchor) = anchor else { return };
        let name = anchor.source.get(1..).unwrap_or_default();
        if name.is_empty() {
            self.diagnostics
                .error(anchor, ErrorKind::BadAlias, "Anchor cannot be an empty string");
        }
        node.anchor = Some(name.to_owned());
    }

    fn register_anchor(&mut self, node: &Node) {
        if let Some(name) = &node.anchor {
            log::trace!("Anchor {name} bound at offset {}", node.range.start);
            self.anchors.insert(name.clone(), node.clone());
        }
    }
}
