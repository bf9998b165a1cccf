// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Block mappings, block sequences and flow collections.

use super::append_comment;
use super::node::DocComposer;
use super::props::{Next, PropsContext, contains_newline, flow_indent_check, resolve_end, resolve_props};
use crate::cst::{BlockMap, BlockSeq, CollectionItem, FlowCollection, SourceToken, Token};
use crate::document::{Content, Mapping, Node, NodeRange, Pair, Sequence};
use crate::error::{ErrorKind, ErrorPos};
use crate::schema::tags;
use crate::token::TokenKind;

const START_COL_MSG: &str = "All mapping items must start at the same column";
const BLOCK_IN_FLOW_MSG: &str = "Block collections are not allowed within flow collections";
const FLOW_SEQ_KEY_MSG: &str = "Implicit keys of flow sequence pairs need to be on a single line";

fn is_block(token: Option<&Token>) -> bool {
    matches!(token, Some(Token::BlockMap(_) | Token::BlockSeq(_)))
}

fn collection_node(content: Content, range: NodeRange, comment: Option<String>) -> Node {
    let mut node = Node::new(content, range);
    node.comment = comment;
    node
}

impl DocComposer<'_> {
    #[allow(clippy::too_many_lines, reason = "Key and value handling of one mapping item")]
    pub(super) fn resolve_block_map(&mut self, bm: &BlockMap) -> Node {
        self.at_root = false;
        let mut items: Vec<Pair> = Vec::new();
        let mut comment = None;
        let mut offset = bm.offset;
        let mut comment_end = None;

        for CollectionItem {
            start,
            key,
            sep,
            value,
            ..
        } in &bm.items
        {
            let (key, sep, value) = (key.as_deref(), sep.as_deref(), value.as_deref());
            let key_props = resolve_props(
                start,
                PropsContext {
                    flow: None,
                    indicator: TokenKind::ExplicitKeyInd,
                    next: Next::of(key, sep),
                    offset,
                    parent_indent: bm.indent,
                    start_on_newline: true,
                },
                self.diagnostics,
            );
            let implicit_key = key_props.found.is_none();
            if implicit_key {
                if let Some(key) = key {
                    if matches!(key, Token::BlockSeq(_)) {
                        self.diagnostics.error(
                            offset,
                            ErrorKind::BlockAsImplicitKey,
                            "A block sequence may not be used as an implicit map key",
                        );
                    } else if key.indent().is_some_and(|indent| indent != bm.indent) {
                        self.diagnostics.error(offset, ErrorKind::BadIndent, START_COL_MSG);
                    }
                }
                if key_props.anchor.is_none() && key_props.tag.is_none() && sep.is_none() {
                    // Comment lines between items
                    comment_end = Some(key_props.end);
                    if !key_props.comment.is_empty() {
                        append_comment(&mut comment, &key_props.comment);
                    }
                    continue;
                }
                if key_props.newline_after_prop.is_some() || contains_newline(key) {
                    let pos = match key {
                        Some(key) => ErrorPos::from(key),
                        None => start.last().map_or(ErrorPos::from(offset), ErrorPos::from),
                    };
                    self.diagnostics.error(
                        pos,
                        ErrorKind::MultilineImplicitKey,
                        "Implicit keys need to be on a single line",
                    );
                }
            } else if key_props.found.map(|found| found.indent) != Some(bm.indent) {
                self.diagnostics.error(offset, ErrorKind::BadIndent, START_COL_MSG);
            }

            self.at_key = true;
            let key_start = key_props.end;
            let mut key_node = match key {
                Some(key) => self.compose_node(key, &key_props),
                None => self.compose_empty_node(key_start, Some(start), None, &key_props),
            };
            if self.schema.compat.is_some() {
                flow_indent_check(bm.indent, key, self.diagnostics);
            }
            self.at_key = false;
            if self.map_includes(items.iter().map(|pair| &pair.key), &key_node) {
                self.diagnostics
                    .error(key_start, ErrorKind::DuplicateKey, "Map keys must be unique");
            }

            let value_props = resolve_props(
                sep.unwrap_or_default(),
                PropsContext {
                    flow: None,
                    indicator: TokenKind::MapValueInd,
                    next: value.map(Next::Node),
                    offset: key_node.range.node_end,
                    parent_indent: bm.indent,
                    start_on_newline: key.is_none_or(|key| matches!(key, Token::BlockScalar(_))),
                },
                self.diagnostics,
            );
            offset = value_props.end;

            if let Some(found) = value_props.found {
                if implicit_key {
                    if matches!(value, Some(Token::BlockMap(_))) && !value_props.has_newline {
                        self.diagnostics.error(
                            offset,
                            ErrorKind::BlockAsImplicitKey,
                            "Nested mappings are not allowed in compact mappings",
                        );
                    }
                    if self.options.strict && key_props.start + 1024 < found.offset {
                        self.diagnostics.error(
                            key_node.range,
                            ErrorKind::KeyOver1024Chars,
                            "The : indicator must be at most 1024 chars after the start of an implicit block mapping key",
                        );
                    }
                }
                let value_node = match value {
                    Some(value) => self.compose_node(value, &value_props),
                    None => self.compose_empty_node(offset, sep, None, &value_props),
                };
                if self.schema.compat.is_some() {
                    flow_indent_check(bm.indent, value, self.diagnostics);
                }
                offset = value_node.range.node_end;
                self.check_merge(&key_node, Some(&value_node));
                items.push(Pair {
                    key: key_node,
                    value: Some(value_node),
                });
            } else {
                if implicit_key {
                    self.diagnostics.error(
                        key_node.range,
                        ErrorKind::MissingChar,
                        "Implicit map keys need to be followed by map values",
                    );
                }
                if !value_props.comment.is_empty() {
                    append_comment(&mut key_node.comment, &value_props.comment);
                }
                items.push(Pair {
                    key: key_node,
                    value: None,
                });
            }
        }

        if let Some(comment_end) = comment_end
            && comment_end < offset
        {
            self.diagnostics.error(
                comment_end,
                ErrorKind::Impossible,
                "Map comment with trailing content",
            );
        }
        collection_node(
            Content::Mapping(Mapping { items, flow: false }),
            NodeRange::new(bm.offset, offset, comment_end.unwrap_or(offset)),
            comment,
        )
    }

    pub(super) fn resolve_block_seq(&mut self, bs: &BlockSeq) -> Node {
        self.at_root = false;
        self.at_key = false;
        let mut items = Vec::new();
        let mut comment = None;
        let mut offset = bs.offset;
        let mut comment_end = None;

        for CollectionItem { start, value, .. } in &bs.items {
            let value = value.as_deref();
            let props = resolve_props(
                start,
                PropsContext {
                    flow: None,
                    indicator: TokenKind::SeqItemInd,
                    next: value.map(Next::Node),
                    offset,
                    parent_indent: bs.indent,
                    start_on_newline: true,
                },
                self.diagnostics,
            );
            if props.found.is_none() {
                if props.anchor.is_some() || props.tag.is_some() || value.is_some() {
                    if matches!(value, Some(Token::BlockSeq(_))) {
                        self.diagnostics.error(
                            props.end,
                            ErrorKind::BadIndent,
                            "All sequence items must start at the same column",
                        );
                    } else {
                        self.diagnostics.error(
                            offset,
                            ErrorKind::MissingChar,
                            "Sequence item without - indicator",
                        );
                    }
                } else {
                    comment_end = Some(props.end);
                    if !props.comment.is_empty() {
                        comment = Some(props.comment.clone());
                    }
                    continue;
                }
            }
            let node = match value {
                Some(value) => self.compose_node(value, &props),
                None => self.compose_empty_node(props.end, Some(start), None, &props),
            };
            if self.schema.compat.is_some() {
                flow_indent_check(bs.indent, value, self.diagnostics);
            }
            offset = node.range.node_end;
            items.push(node);
        }

        collection_node(
            Content::Sequence(Sequence { items, flow: false }),
            NodeRange::new(bs.offset, offset, comment_end.unwrap_or(offset)),
            comment,
        )
    }

    #[allow(clippy::too_many_lines, reason = "Mirrors the structure of a flow item")]
    pub(super) fn resolve_flow_collection(&mut self, fc: &FlowCollection) -> Node {
        let is_map = fc.start.source == "{";
        let fc_name = if is_map { "flow map" } else { "flow sequence" };
        let at_root = self.at_root;
        self.at_root = false;
        self.at_key = false;

        let mut seq_items: Vec<Node> = Vec::new();
        let mut map_items: Vec<Pair> = Vec::new();
        let mut comment = None;
        let mut offset = fc.offset + fc.start.source.len();
        let count = fc.items.len();

        for (idx, item) in fc.items.iter().enumerate() {
            let CollectionItem {
                start,
                key,
                sep,
                value,
                ..
            } = item;
            let (key, sep, value) = (key.as_deref(), sep.as_deref(), value.as_deref());
            let mut props = resolve_props(
                start,
                PropsContext {
                    flow: Some(fc_name),
                    indicator: TokenKind::ExplicitKeyInd,
                    next: Next::of(key, sep),
                    offset,
                    parent_indent: fc.indent,
                    start_on_newline: false,
                },
                self.diagnostics,
            );
            if props.found.is_none() {
                if props.anchor.is_none() && props.tag.is_none() && sep.is_none() && value.is_none() {
                    if idx == 0
                        && let Some(comma) = props.comma
                    {
                        self.diagnostics.error(
                            comma,
                            ErrorKind::UnexpectedToken,
                            format!("Unexpected , in {fc_name}"),
                        );
                    } else if idx + 1 < count {
                        self.diagnostics.error(
                            props.start,
                            ErrorKind::UnexpectedToken,
                            format!("Unexpected empty item in {fc_name}"),
                        );
                    }
                    if !props.comment.is_empty() {
                        append_comment(&mut comment, &props.comment);
                    }
                    offset = props.end;
                    continue;
                }
                if !is_map
                    && self.options.strict
                    && let Some(key) = key
                    && contains_newline(Some(key))
                {
                    self.diagnostics
                        .error(key, ErrorKind::MultilineImplicitKey, FLOW_SEQ_KEY_MSG);
                }
            }

            if idx == 0 {
                if let Some(comma) = props.comma {
                    self.diagnostics.error(
                        comma,
                        ErrorKind::UnexpectedToken,
                        format!("Unexpected , in {fc_name}"),
                    );
                }
            } else {
                if props.comma.is_none() {
                    self.diagnostics.error(
                        props.start,
                        ErrorKind::MissingChar,
                        format!("Missing , between {fc_name} items"),
                    );
                }
                if !props.comment.is_empty() {
                    // A comment right after the comma belongs to the previous item.
                    let mut prev_comment = "";
                    for st in start {
                        match st.kind {
                            TokenKind::Comma | TokenKind::Space => {}
                            TokenKind::Comment => {
                                prev_comment = st.source.get(1..).unwrap_or_default();
                                break;
                            }
                            _ => break,
                        }
                    }
                    if !prev_comment.is_empty() {
                        let prev = if is_map {
                            map_items
                                .last_mut()
                                .map(|pair| pair.value.as_mut().unwrap_or(&mut pair.key))
                        } else {
                            seq_items.last_mut()
                        };
                        if let Some(prev) = prev {
                            append_comment(&mut prev.comment, prev_comment);
                        }
                        props.comment = props
                            .comment
                            .get(prev_comment.len() + 1..)
                            .unwrap_or_default()
                            .to_owned();
                    }
                }
            }

            if !is_map && sep.is_none() && props.found.is_none() {
                let value_node = match value {
                    Some(value) => self.compose_node(value, &props),
                    None => self.compose_empty_node(props.end, sep, None, &props),
                };
                offset = value_node.range.node_end;
                if is_block(value) {
                    self.diagnostics
                        .error(value_node.range, ErrorKind::BlockInFlow, BLOCK_IN_FLOW_MSG);
                }
                seq_items.push(value_node);
                continue;
            }

            self.at_key = true;
            let key_start = props.end;
            let mut key_node = match key {
                Some(key) => self.compose_node(key, &props),
                None => self.compose_empty_node(key_start, Some(start), None, &props),
            };
            if is_block(key) {
                self.diagnostics
                    .error(key_node.range, ErrorKind::BlockInFlow, BLOCK_IN_FLOW_MSG);
            }
            self.at_key = false;

            let value_props = resolve_props(
                sep.unwrap_or_default(),
                PropsContext {
                    flow: Some(fc_name),
                    indicator: TokenKind::MapValueInd,
                    next: value.map(Next::Node),
                    offset: key_node.range.node_end,
                    parent_indent: fc.indent,
                    start_on_newline: false,
                },
                self.diagnostics,
            );
            if let Some(found) = value_props.found {
                if !is_map && props.found.is_none() && self.options.strict {
                    for st in sep.unwrap_or_default() {
                        if std::ptr::eq(st, found) {
                            break;
                        }
                        if st.kind == TokenKind::Newline {
                            self.diagnostics
                                .error(st, ErrorKind::MultilineImplicitKey, FLOW_SEQ_KEY_MSG);
                            break;
                        }
                    }
                    if props.start + 1024 < found.offset {
                        self.diagnostics.error(
                            found,
                            ErrorKind::KeyOver1024Chars,
                            "The : indicator must be at most 1024 chars after the start of an implicit flow sequence key",
                        );
                    }
                }
            } else if let Some(value) = value {
                let glued = match value {
                    Token::FlowScalar(scalar) => scalar.source.starts_with(':'),
                    Token::Error(err) => err.source.starts_with(':'),
                    _ => false,
                };
                if glued {
                    self.diagnostics.error(
                        value,
                        ErrorKind::MissingChar,
                        format!("Missing space after : in {fc_name}"),
                    );
                } else {
                    self.diagnostics.error(
                        value_props.start,
                        ErrorKind::MissingChar,
                        format!("Missing , or : between {fc_name} items"),
                    );
                }
            }

            let value_node = match value {
                Some(value) => Some(self.compose_node(value, &value_props)),
                None if value_props.found.is_some() => {
                    Some(self.compose_empty_node(value_props.end, sep, None, &value_props))
                }
                None => None,
            };
            match &value_node {
                Some(value_node) if is_block(value) => {
                    self.diagnostics
                        .error(value_node.range, ErrorKind::BlockInFlow, BLOCK_IN_FLOW_MSG);
                }
                Some(_) => {}
                None if !value_props.comment.is_empty() => {
                    append_comment(&mut key_node.comment, &value_props.comment);
                }
                None => {}
            }
            offset = value_node
                .as_ref()
                .map_or(value_props.end, |node| node.range.node_end);
            self.check_merge(&key_node, value_node.as_ref());

            if is_map {
                if self.map_includes(map_items.iter().map(|pair| &pair.key), &key_node) {
                    self.diagnostics
                        .error(key_start, ErrorKind::DuplicateKey, "Map keys must be unique");
                }
                map_items.push(Pair {
                    key: key_node,
                    value: value_node,
                });
            } else {
                // A pair in a flow sequence is a single-pair mapping.
                let end = value_node.as_ref().map_or(key_node.range, |node| node.range);
                let range = NodeRange::new(key_node.range.start, end.value_end, end.node_end);
                let mut pair = Node::new(
                    Content::Mapping(Mapping {
                        items: vec![Pair {
                            key: key_node,
                            value: value_node,
                        }],
                        flow: true,
                    }),
                    range,
                );
                pair.tag = Some(tags::MAP.to_owned());
                seq_items.push(pair);
            }
        }

        let expected_end = if is_map { "}" } else { "]" };
        let mut close_end = offset;
        let trailing: &[SourceToken] = match fc.end.split_first() {
            Some((close, rest)) if close.source == expected_end => {
                close_end = close.offset + close.source.len();
                rest
            }
            first => {
                let (head, tail) = fc_name.split_at(1);
                let name = format!("{}{tail}", head.to_uppercase());
                if at_root {
                    self.diagnostics.error(
                        offset,
                        ErrorKind::FlowEndError,
                        format!("{name} must end with a {expected_end}"),
                    );
                } else {
                    self.diagnostics.error(
                        offset,
                        ErrorKind::BadIndent,
                        format!(
                            "{name} in block collection must be sufficiently indented and end with a {expected_end}"
                        ),
                    );
                }
                match first {
                    Some((close, _)) if close.source.len() != 1 => fc.end.as_slice(),
                    Some((_, rest)) => rest,
                    None => &[],
                }
            }
        };

        let range = if trailing.is_empty() {
            NodeRange::new(fc.offset, close_end, close_end)
        } else {
            let end = resolve_end(Some(trailing), close_end, self.options.strict, self.diagnostics);
            if !end.comment.is_empty() {
                append_comment(&mut comment, &end.comment);
            }
            NodeRange::new(fc.offset, close_end, end.offset)
        };
        let content = if is_map {
            Content::Mapping(Mapping {
                items: map_items,
                flow: true,
            })
        } else {
            Content::Sequence(Sequence {
                items: seq_items,
                flow: true,
            })
        };
        collection_node(content, range, comment)
    }
}
