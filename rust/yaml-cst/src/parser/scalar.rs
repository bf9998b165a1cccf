// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Scalar nodes: flow scalars (which may turn out to be implicit keys) and
//! block scalars.

use super::{Parser, first_key_start_props, prev_props};
use crate::cst::{BlockMap, BlockScalar, CollectionItem, FlowScalar, Token};
use crate::token::TokenKind;

impl Parser {
    /// A flow scalar node for the current token.
    pub(super) fn flow_scalar(&mut self) -> FlowScalar {
        self.count_newlines();
        FlowScalar {
            kind: self.kind,
            offset: self.offset,
            indent: self.indent,
            source: self.source.clone(),
            end: None,
        }
    }

    /// A flow scalar on top of the stack: a `:` makes it an implicit key.
    pub(super) fn scalar(&mut self, mut scalar: FlowScalar) {
        if self.kind != TokenKind::MapValueInd {
            return self.line_end(Token::FlowScalar(scalar));
        }
        let start = self
            .stack
            .last_mut()
            .and_then(prev_props)
            .map(first_key_start_props)
            .unwrap_or_default();
        let mut sep = scalar.end.take().unwrap_or_default();
        sep.push(self.source_token());
        let map = BlockMap {
            offset: scalar.offset,
            indent: scalar.indent,
            items: vec![CollectionItem {
                start,
                explicit_key: false,
                key: Some(Box::new(Token::FlowScalar(scalar))),
                sep: Some(sep),
                value: None,
            }],
        };
        self.on_key_line = true;
        self.stack.push(Token::BlockMap(map));
    }

    pub(super) fn block_scalar(&mut self, mut scalar: BlockScalar) {
        match self.kind {
            TokenKind::Space | TokenKind::Comment | TokenKind::Newline => {
                scalar.props.push(Token::Source(self.source_token()));
                self.stack.push(Token::BlockScalar(scalar));
            }
            TokenKind::Scalar => {
                scalar.source.clone_from(&self.source);
                // The body always ends at the start of a line.
                self.at_new_line = true;
                self.indent = 0;
                self.count_newlines();
                self.attach(Token::BlockScalar(scalar));
            }
            _ => {
                self.attach(Token::BlockScalar(scalar));
                self.step();
            }
        }
    }
}
