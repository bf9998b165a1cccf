// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Block mappings and sequences.
//!
//! A block collection stays on the stack while tokens arrive at or beyond
//! its indentation. Anything less indented (or a sequence indicator at the
//! indentation of a mapping that is waiting for a value) closes it.

use super::{Parser, append_to_previous_end, comment_end_mut, first_key_start_props, last_item};
use crate::cst::{BlockMap, BlockSeq, CollectionItem, Token, includes_token};
use crate::token::TokenKind;

impl Parser {
    #[allow(
        clippy::too_many_lines,
        reason = "One match over the token kinds that can continue a mapping"
    )]
    pub(super) fn block_map(&mut self, mut map: BlockMap) {
        match self.kind {
            TokenKind::Newline => {
                self.on_key_line = false;
                let token = self.source_token();
                let it = last_item(&mut map.items);
                if it.value.is_some() {
                    if let Some(end) = comment_end_mut(it) {
                        end.push(token);
                    } else {
                        map.items.push(CollectionItem::with_start(vec![token]));
                    }
                } else if let Some(sep) = &mut it.sep {
                    sep.push(token);
                } else {
                    it.start.push(token);
                }
                self.stack.push(Token::BlockMap(map));
                return;
            }
            TokenKind::Space | TokenKind::Comment => {
                let token = self.source_token();
                let indent = map.indent;
                let it = last_item(&mut map.items);
                if it.value.is_some() {
                    map.items.push(CollectionItem::with_start(vec![token]));
                } else if let Some(sep) = &mut it.sep {
                    sep.push(token);
                } else {
                    let token = if self.at_indented_comment(&it.start, indent) {
                        match append_to_previous_end(&mut map.items, token) {
                            Ok(()) => {
                                self.stack.push(Token::BlockMap(map));
                                return;
                            }
                            Err(token) => token,
                        }
                    } else {
                        token
                    };
                    last_item(&mut map.items).start.push(token);
                }
                self.stack.push(Token::BlockMap(map));
                return;
            }
            _ => {}
        }

        if self.indent >= map.indent {
            let at_map_indent = !self.on_key_line && self.indent == map.indent;
            let map_indent = map.indent;
            let it = last_item(&mut map.items);
            let at_next_item = at_map_indent
                && (it.sep.is_some() || it.explicit_key)
                && self.kind != TokenKind::SeqItemInd;

            // Newline-separated, not indented trailing tokens of an empty value
            // belong to the next item.
            let mut start = Vec::new();
            if at_next_item
                && it.value.is_none()
                && let Some(sep) = &mut it.sep
            {
                let mut newlines = Vec::new();
                for (idx, st) in sep.iter().enumerate() {
                    match st.kind {
                        TokenKind::Newline => newlines.push(idx),
                        TokenKind::Space => {}
                        TokenKind::Comment if st.indent <= map_indent => {}
                        _ => newlines.clear(),
                    }
                }
                if let Some(&split) = newlines.get(1) {
                    start = sep.split_off(split);
                }
            }

            match self.kind {
                TokenKind::Anchor | TokenKind::Tag => {
                    let token = self.source_token();
                    if at_next_item || it.value.is_some() {
                        start.push(token);
                        map.items.push(CollectionItem::with_start(start));
                        self.on_key_line = true;
                    } else if let Some(sep) = &mut it.sep {
                        sep.push(token);
                    } else {
                        it.start.push(token);
                    }
                    self.stack.push(Token::BlockMap(map));
                    return;
                }
                TokenKind::ExplicitKeyInd => {
                    let token = self.source_token();
                    self.on_key_line = true;
                    if it.sep.is_none() && !it.explicit_key {
                        it.start.push(token);
                        it.explicit_key = true;
                        self.stack.push(Token::BlockMap(map));
                    } else if at_next_item || it.value.is_some() {
                        start.push(token);
                        map.items.push(CollectionItem {
                            start,
                            explicit_key: true,
                            ..CollectionItem::default()
                        });
                        self.stack.push(Token::BlockMap(map));
                    } else {
                        let nested = Token::BlockMap(BlockMap {
                            offset: self.offset,
                            indent: self.indent,
                            items: vec![CollectionItem {
                                start: vec![token],
                                explicit_key: true,
                                ..CollectionItem::default()
                            }],
                        });
                        self.stack.push(Token::BlockMap(map));
                        self.stack.push(nested);
                    }
                    return;
                }
                TokenKind::MapValueInd => {
                    let token = self.source_token();
                    let mut nested = None;
                    if it.explicit_key {
                        if it.sep.is_none() {
                            if includes_token(&it.start, TokenKind::Newline) {
                                it.sep = Some(vec![token]);
                            } else {
                                let start = first_key_start_props(&mut it.start);
                                nested = Some(self.new_block_map(start, None, vec![token]));
                            }
                        } else if it.value.is_some() {
                            map.items.push(CollectionItem::with_sep(Vec::new(), token));
                        } else if it
                            .sep
                            .as_deref()
                            .is_some_and(|sep| includes_token(sep, TokenKind::MapValueInd))
                        {
                            nested = Some(self.new_block_map(start, None, vec![token]));
                        } else if it.key.as_deref().is_some_and(Token::is_flow)
                            && !it
                                .sep
                                .as_deref()
                                .is_some_and(|sep| includes_token(sep, TokenKind::Newline))
                        {
                            let start = first_key_start_props(&mut it.start);
                            let key = it.key.take();
                            let mut sep = it.sep.take().unwrap_or_default();
                            sep.push(token);
                            nested = Some(self.new_block_map(start, key, sep));
                        } else if let Some(sep) = &mut it.sep {
                            sep.append(&mut start);
                            sep.push(token);
                        }
                    } else if it.sep.is_none() {
                        it.sep = Some(vec![token]);
                    } else if it.value.is_some() || at_next_item {
                        map.items.push(CollectionItem::with_sep(start, token));
                    } else if it
                        .sep
                        .as_deref()
                        .is_some_and(|sep| includes_token(sep, TokenKind::MapValueInd))
                    {
                        nested = Some(self.new_block_map(Vec::new(), None, vec![token]));
                    } else if let Some(sep) = &mut it.sep {
                        sep.push(token);
                    }
                    self.on_key_line = true;
                    self.stack.push(Token::BlockMap(map));
                    if let Some(nested) = nested {
                        self.stack.push(nested);
                    }
                    return;
                }
                TokenKind::Alias
                | TokenKind::Scalar
                | TokenKind::SingleQuotedScalar
                | TokenKind::DoubleQuotedScalar => {
                    let scalar = Token::FlowScalar(self.flow_scalar());
                    if at_next_item || it.value.is_some() {
                        map.items.push(CollectionItem::with_key(start, scalar));
                        self.on_key_line = true;
                        self.stack.push(Token::BlockMap(map));
                    } else if it.sep.is_some() {
                        self.stack.push(Token::BlockMap(map));
                        self.stack.push(scalar);
                    } else {
                        it.key = Some(Box::new(scalar));
                        it.sep = Some(Vec::new());
                        self.on_key_line = true;
                        self.stack.push(Token::BlockMap(map));
                    }
                    return;
                }
                _ => {
                    let explicit_key = it.explicit_key;
                    let sep_on_key_line = it
                        .sep
                        .as_deref()
                        .is_some_and(|sep| !includes_token(sep, TokenKind::Newline));
                    if let Some(value) = self.start_block_value(Some(super::item_prev_props(it))) {
                        if matches!(value, Token::BlockSeq(_)) {
                            if !explicit_key && sep_on_key_line {
                                let error =
                                    self.error_token("Unexpected block-seq-ind on same line with key");
                                self.stack.push(Token::BlockMap(map));
                                self.attach(error);
                                return;
                            }
                        } else if at_map_indent {
                            map.items.push(CollectionItem::with_start(start));
                        }
                        self.stack.push(Token::BlockMap(map));
                        self.stack.push(value);
                        return;
                    }
                    if let Some(sep) = &mut last_item(&mut map.items).sep {
                        sep.append(&mut start);
                    }
                }
            }
        }
        self.attach(Token::BlockMap(map));
        self.step();
    }

    pub(super) fn block_sequence(&mut self, mut seq: BlockSeq) {
        let indent = seq.indent;
        let it = last_item(&mut seq.items);
        match self.kind {
            TokenKind::Newline => {
                let token = self.source_token();
                if it.value.is_some() {
                    if let Some(end) = comment_end_mut(it) {
                        end.push(token);
                    } else {
                        seq.items.push(CollectionItem::with_start(vec![token]));
                    }
                } else {
                    it.start.push(token);
                }
                self.stack.push(Token::BlockSeq(seq));
                return;
            }
            TokenKind::Space | TokenKind::Comment => {
                let token = self.source_token();
                if it.value.is_some() {
                    seq.items.push(CollectionItem::with_start(vec![token]));
                } else {
                    let token = if self.at_indented_comment(&it.start, indent) {
                        match append_to_previous_end(&mut seq.items, token) {
                            Ok(()) => {
                                self.stack.push(Token::BlockSeq(seq));
                                return;
                            }
                            Err(token) => token,
                        }
                    } else {
                        token
                    };
                    last_item(&mut seq.items).start.push(token);
                }
                self.stack.push(Token::BlockSeq(seq));
                return;
            }
            TokenKind::Anchor | TokenKind::Tag => {
                if it.value.is_none() && self.indent > indent {
                    it.start.push(self.source_token());
                    self.stack.push(Token::BlockSeq(seq));
                    return;
                }
            }
            TokenKind::SeqItemInd => {
                if self.indent == indent {
                    let token = self.source_token();
                    if it.value.is_some() || includes_token(&it.start, TokenKind::SeqItemInd) {
                        seq.items.push(CollectionItem::with_start(vec![token]));
                    } else {
                        it.start.push(token);
                    }
                    self.stack.push(Token::BlockSeq(seq));
                    return;
                }
            }
            _ => {}
        }
        if self.indent > indent {
            let it = last_item(&mut seq.items);
            if let Some(value) = self.start_block_value(Some(&mut it.start)) {
                self.stack.push(Token::BlockSeq(seq));
                self.stack.push(value);
                return;
            }
        }
        self.attach(Token::BlockSeq(seq));
        self.step();
    }
}
