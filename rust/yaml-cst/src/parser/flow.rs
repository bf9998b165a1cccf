// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Flow collections.

use super::{Parser, first_key_start_props, prev_props};
use crate::cst::{BlockMap, CollectionItem, FlowCollection, Token, includes_token};
use crate::token::TokenKind;

impl Parser {
    pub(super) fn flow_collection(&mut self, mut fc: FlowCollection) {
        if self.kind == TokenKind::FlowErrorEnd {
            // The lexer gave up on flow context: close every open flow collection.
            self.attach(Token::FlowCollection(fc));
            while matches!(self.stack.last(), Some(Token::FlowCollection(_))) {
                self.pop();
            }
            return;
        }

        if fc.end.is_empty() {
            match self.kind {
                TokenKind::Comma | TokenKind::ExplicitKeyInd => {
                    let token = self.source_token();
                    match fc.items.last_mut() {
                        Some(it) if it.sep.is_none() => it.start.push(token),
                        _ => fc.items.push(CollectionItem::with_start(vec![token])),
                    }
                }
                TokenKind::MapValueInd => {
                    let token = self.source_token();
                    match fc.items.last_mut() {
                        Some(it) if it.value.is_none() => match &mut it.sep {
                            Some(sep) => sep.push(token),
                            None => it.sep = Some(vec![token]),
                        },
                        _ => fc.items.push(CollectionItem::with_sep(Vec::new(), token)),
                    }
                }
                TokenKind::Space
                | TokenKind::Comment
                | TokenKind::Newline
                | TokenKind::Anchor
                | TokenKind::Tag => {
                    let token = self.source_token();
                    match fc.items.last_mut() {
                        Some(it) if it.value.is_none() => match &mut it.sep {
                            Some(sep) => sep.push(token),
                            None => it.start.push(token),
                        },
                        _ => fc.items.push(CollectionItem::with_start(vec![token])),
                    }
                }
                TokenKind::Alias
                | TokenKind::Scalar
                | TokenKind::SingleQuotedScalar
                | TokenKind::DoubleQuotedScalar => {
                    let scalar = Token::FlowScalar(self.flow_scalar());
                    let awaiting_value = fc
                        .items
                        .last()
                        .is_some_and(|it| it.value.is_none() && it.sep.is_some());
                    if awaiting_value {
                        self.stack.push(Token::FlowCollection(fc));
                        self.stack.push(scalar);
                        return;
                    }
                    match fc.items.last_mut() {
                        Some(it) if it.value.is_none() => {
                            it.key = Some(Box::new(scalar));
                            it.sep = Some(Vec::new());
                        }
                        _ => fc.items.push(CollectionItem::with_key(Vec::new(), scalar)),
                    }
                }
                TokenKind::FlowMapEnd | TokenKind::FlowSeqEnd => fc.end.push(self.source_token()),
                _ => {
                    match self.start_block_value(None) {
                        Some(value) => {
                            self.stack.push(Token::FlowCollection(fc));
                            self.stack.push(value);
                        }
                        None => {
                            self.attach(Token::FlowCollection(fc));
                            self.step();
                        }
                    }
                    return;
                }
            }
            self.stack.push(Token::FlowCollection(fc));
            return;
        }

        // The collection is closed; what follows decides whether it is an
        // implicit key.
        let parent = self.stack.last();
        let leave = match parent {
            Some(Token::BlockMap(map)) => {
                (self.kind == TokenKind::MapValueInd && map.indent == fc.indent)
                    || (self.kind == TokenKind::Newline
                        && map.items.last().is_some_and(|it| it.sep.is_none()))
            }
            _ => false,
        };
        let parent_is_flow = matches!(parent, Some(Token::FlowCollection(_)));
        if leave {
            self.attach(Token::FlowCollection(fc));
            self.step();
        } else if self.kind == TokenKind::MapValueInd && !parent_is_flow {
            let start = self
                .stack
                .last_mut()
                .and_then(prev_props)
                .map(first_key_start_props)
                .unwrap_or_default();
            fix_flow_seq_items(&mut fc);
            let mut sep = fc.end.split_off(fc.end.len().min(1));
            sep.push(self.source_token());
            let map = BlockMap {
                offset: fc.offset,
                indent: fc.indent,
                items: vec![CollectionItem {
                    start,
                    explicit_key: false,
                    key: Some(Box::new(Token::FlowCollection(fc))),
                    sep: Some(sep),
                    value: None,
                }],
            };
            self.on_key_line = true;
            self.stack.push(Token::BlockMap(map));
        } else {
            self.line_end(Token::FlowCollection(fc));
        }
    }
}

/// In a flow sequence, an item parsed as a key without any `?` or `:` is a
/// plain value: move it, and its trailing tokens, into the value position.
pub(crate) fn fix_flow_seq_items(fc: &mut FlowCollection) {
    if fc.start.kind != TokenKind::FlowSeqStart {
        return;
    }
    for it in &mut fc.items {
        let is_plain_entry = it.value.is_none()
            && !includes_token(&it.start, TokenKind::ExplicitKeyInd)
            && it
                .sep
                .as_deref()
                .is_some_and(|sep| !includes_token(sep, TokenKind::MapValueInd));
        if !is_plain_entry {
            continue;
        }
        let mut sep = it.sep.take().unwrap_or_default();
        match it.key.take().map(|key| *key) {
            Some(Token::FlowScalar(mut scalar)) => {
                scalar.end.get_or_insert_with(Vec::new).append(&mut sep);
                it.value = Some(Box::new(Token::FlowScalar(scalar)));
            }
            Some(Token::FlowCollection(mut inner)) => {
                inner.end.append(&mut sep);
                it.value = Some(Box::new(Token::FlowCollection(inner)));
            }
            other => {
                it.start.append(&mut sep);
                it.value = other.map(Box::new);
            }
        }
    }
}
