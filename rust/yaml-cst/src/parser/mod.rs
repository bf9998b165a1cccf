// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! CST parser.
//!
//! Consumes lexemes from the [`Lexer`] and assembles [`cst::Token`] nodes on
//! a stack mirroring the block and flow nesting. Each lexeme either extends
//! the node on top of the stack, opens a nested node, or completes the top
//! node, which is then attached to its parent. Completed top-level nodes
//! (documents, directives, stream-level comments, errors) are yielded in
//! source order.
//!
//! Parsing never fails: unexpected input ends up in the tree as an
//! [`ErrorToken`] or as an ordinary token that the composer will flag.

mod block;
mod flow;
mod scalar;

use std::collections::VecDeque;

use log::{debug, trace};

use crate::cst::{
    BlockMap, BlockScalar, BlockSeq, CollectionItem, Directive, Document, DocumentEnd,
    ErrorToken, FlowCollection, FlowScalar, SourceToken, Token, find_non_empty_index,
};
use crate::lexer::Lexer;
use crate::span::LineCounter;
use crate::token::{TokenKind, token_kind};

pub(crate) use flow::fix_flow_seq_items;

/// Pull-based CST parser.
///
/// ```
/// use yaml_cst::{Parser, cst};
///
/// let mut parser = Parser::new();
/// parser.feed("a: 1\n", true);
/// let tokens: Vec<cst::Token> = parser.collect();
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(cst::stringify(&tokens[0]), "a: 1\n");
/// ```
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    line_counter: Option<LineCounter>,
    stack: Vec<Token>,
    queue: VecDeque<Token>,
    /// Offset of the current lexeme.
    offset: usize,
    /// No content yet on the current line.
    at_new_line: bool,
    /// The next lexeme is a scalar body.
    at_scalar: bool,
    /// Indentation of the current line, including block indicators.
    indent: usize,
    /// Source of the current lexeme.
    source: String,
    /// Kind of the current lexeme.
    kind: TokenKind,
    /// On the same line as an implicit or explicit key.
    on_key_line: bool,
    at_end: bool,
    finished: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            lexer: Lexer::new(),
            line_counter: None,
            stack: Vec::new(),
            queue: VecDeque::new(),
            offset: 0,
            at_new_line: true,
            at_scalar: false,
            indent: 0,
            source: String::new(),
            kind: TokenKind::Newline,
            on_key_line: false,
            at_end: false,
            finished: false,
        }
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that records the start offset of every line it sees.
    #[must_use]
    pub fn with_line_counter() -> Self {
        let mut line_counter = LineCounter::new();
        line_counter.add_new_line(0);
        Self {
            line_counter: Some(line_counter),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn line_counter(&self) -> Option<&LineCounter> {
        self.line_counter.as_ref()
    }

    /// Take the recorded line starts.
    pub fn take_line_counter(&mut self) -> Option<LineCounter> {
        self.line_counter.take()
    }

    /// Append `chunk` to the input. See [`Lexer::feed`].
    pub fn feed(&mut self, chunk: &str, is_end_of_input: bool) {
        self.lexer.feed(chunk, is_end_of_input);
        self.at_end = is_end_of_input;
    }

    fn source_token(&self) -> SourceToken {
        SourceToken {
            kind: self.kind,
            offset: self.offset,
            indent: self.indent,
            source: self.source.clone(),
        }
    }

    fn error_token(&self, message: impl Into<String>) -> Token {
        Token::Error(ErrorToken {
            offset: self.offset,
            source: self.source.clone(),
            message: message.into(),
        })
    }

    /// Record line starts inside a multi-line scalar body.
    fn count_newlines(&mut self) {
        if let Some(line_counter) = &mut self.line_counter {
            for (idx, _) in self.source.match_indices('\n') {
                line_counter.add_new_line(self.offset + idx + 1);
            }
        }
    }

    /// Process one lexeme.
    fn push_lexeme(&mut self, source: String) {
        if self.at_scalar {
            self.at_scalar = false;
            self.source = source;
            self.step();
            self.offset += self.source.len();
            return;
        }
        let Some(kind) = token_kind(&source) else {
            let len = source.len();
            let message = format!("Not a YAML token: {source}");
            let error = ErrorToken {
                offset: self.offset,
                source,
                message,
            };
            self.attach(Token::Error(error));
            self.offset += len;
            return;
        };
        self.source = source;
        if kind == TokenKind::Scalar {
            self.at_new_line = false;
            self.at_scalar = true;
            self.kind = TokenKind::Scalar;
            return;
        }
        self.kind = kind;
        self.step();
        match kind {
            TokenKind::Newline => {
                self.at_new_line = true;
                self.indent = 0;
                if let Some(line_counter) = &mut self.line_counter {
                    line_counter.add_new_line(self.offset + self.source.len());
                }
            }
            TokenKind::Space => {
                if self.at_new_line && self.source.starts_with(' ') {
                    self.indent += self.source.len();
                }
            }
            TokenKind::ExplicitKeyInd | TokenKind::MapValueInd | TokenKind::SeqItemInd => {
                if self.at_new_line {
                    self.indent += self.source.len();
                }
            }
            // Sentinels take no space in the source.
            TokenKind::DocMode | TokenKind::FlowErrorEnd => return,
            _ => self.at_new_line = false,
        }
        self.offset += self.source.len();
    }

    fn step(&mut self) {
        if self.kind == TokenKind::DocEnd && !matches!(self.stack.last(), Some(Token::DocEnd(_))) {
            while !self.stack.is_empty() {
                self.pop();
            }
            self.stack.push(Token::DocEnd(DocumentEnd {
                offset: self.offset,
                source: self.source.clone(),
                end: None,
            }));
            return;
        }
        let Some(top) = self.stack.pop() else {
            return self.stream();
        };
        match top {
            Token::Document(doc) => self.document(doc),
            Token::FlowScalar(scalar) => self.scalar(scalar),
            Token::BlockScalar(scalar) => self.block_scalar(scalar),
            Token::BlockMap(map) => self.block_map(map),
            Token::BlockSeq(seq) => self.block_sequence(seq),
            Token::FlowCollection(fc) => self.flow_collection(fc),
            Token::DocEnd(doc_end) => self.document_end(doc_end),
            other => self.attach(other),
        }
    }

    /// Pop the top of the stack and attach it to its parent.
    fn pop(&mut self) {
        match self.stack.pop() {
            Some(token) => self.attach(token),
            None => {
                self.queue.push_back(Token::Error(ErrorToken {
                    offset: self.offset,
                    source: String::new(),
                    message: "Tried to pop an empty stack".to_owned(),
                }));
            }
        }
    }

    /// Attach a completed node to the node on top of the stack, or yield it
    /// when the stack is empty.
    fn attach(&mut self, mut token: Token) {
        let Some(top) = self.stack.last_mut() else {
            trace!("parser: completed {} at {}", token.type_name(), token.offset());
            self.queue.push_back(token);
            return;
        };
        match &mut token {
            Token::BlockScalar(scalar) => scalar.indent = top.indent().unwrap_or(0),
            Token::FlowCollection(fc) => {
                if matches!(top, Token::Document(_)) {
                    fc.indent = 0;
                }
                fix_flow_seq_items(fc);
            }
            _ => {}
        }
        match top {
            Token::Document(doc) if doc.value.is_none() => {
                let hoisted = take_trailing_empty_item(&mut token);
                doc.value = Some(Box::new(token));
                if hoisted.is_some() {
                    doc.end = hoisted;
                }
            }
            Token::BlockScalar(scalar) => scalar.props.push(token),
            Token::BlockMap(map) => {
                let it = last_item(&mut map.items);
                if it.value.is_some() {
                    map.items.push(CollectionItem::with_key(Vec::new(), token));
                    self.on_key_line = true;
                } else if it.sep.is_some() {
                    let hoisted = take_trailing_empty_item(&mut token);
                    it.value = Some(Box::new(token));
                    if let Some(start) = hoisted {
                        map.items.push(CollectionItem::with_start(start));
                    }
                } else {
                    it.key = Some(Box::new(token));
                    it.sep = Some(Vec::new());
                    self.on_key_line = !it.explicit_key;
                }
            }
            Token::BlockSeq(seq) => {
                let hoisted = take_trailing_empty_item(&mut token);
                let it = last_item(&mut seq.items);
                if it.value.is_some() {
                    seq.items.push(CollectionItem {
                        value: Some(Box::new(token)),
                        ..CollectionItem::default()
                    });
                } else {
                    it.value = Some(Box::new(token));
                }
                if let Some(start) = hoisted {
                    seq.items.push(CollectionItem::with_start(start));
                }
            }
            Token::FlowCollection(fc) => match fc.items.last_mut() {
                Some(it) if it.value.is_none() && it.sep.is_some() => {
                    it.value = Some(Box::new(token));
                }
                Some(it) if it.value.is_none() => {
                    it.key = Some(Box::new(token));
                    it.sep = Some(Vec::new());
                }
                _ => fc.items.push(CollectionItem::with_key(Vec::new(), token)),
            },
            _ => {
                self.pop();
                self.attach(token);
            }
        }
    }

    /// Flush the stack once all input has been seen.
    fn end(&mut self) {
        while !self.stack.is_empty() {
            self.pop();
        }
        debug!("parser: finished at offset {}", self.offset);
    }

    fn stream(&mut self) {
        match self.kind {
            TokenKind::DirectiveLine => {
                self.queue.push_back(Token::Directive(Directive {
                    offset: self.offset,
                    source: self.source.clone(),
                }));
            }
            TokenKind::ByteOrderMark
            | TokenKind::Space
            | TokenKind::Comment
            | TokenKind::Newline => self.queue.push_back(Token::Source(self.source_token())),
            TokenKind::DocMode | TokenKind::DocStart => {
                let mut doc = Document {
                    offset: self.offset,
                    start: Vec::new(),
                    value: None,
                    end: None,
                };
                if self.kind == TokenKind::DocStart {
                    doc.start.push(self.source_token());
                }
                self.stack.push(Token::Document(doc));
            }
            _ => {
                let message = format!("Unexpected {} token in YAML stream", self.kind);
                let error = self.error_token(message);
                self.queue.push_back(error);
            }
        }
    }

    fn document(&mut self, mut doc: Document) {
        if doc.value.is_some() {
            return self.line_end(Token::Document(doc));
        }
        match self.kind {
            TokenKind::DocStart => {
                if find_non_empty_index(&doc.start).is_some() {
                    self.attach(Token::Document(doc));
                    self.step();
                } else {
                    doc.start.push(self.source_token());
                    self.stack.push(Token::Document(doc));
                }
            }
            TokenKind::Anchor
            | TokenKind::Tag
            | TokenKind::Space
            | TokenKind::Comment
            | TokenKind::Newline => {
                doc.start.push(self.source_token());
                self.stack.push(Token::Document(doc));
            }
            _ => match self.start_block_value(Some(&mut doc.start)) {
                Some(value) => {
                    self.stack.push(Token::Document(doc));
                    self.stack.push(value);
                }
                None => {
                    // Kept in place; composing reports it as unexpected.
                    doc.start.push(self.source_token());
                    self.stack.push(Token::Document(doc));
                }
            },
        }
    }

    fn document_end(&mut self, mut doc_end: DocumentEnd) {
        if self.kind != TokenKind::DocMode {
            doc_end
                .end
                .get_or_insert_with(Vec::new)
                .push(self.source_token());
            if self.kind == TokenKind::Newline {
                return self.attach(Token::DocEnd(doc_end));
            }
        }
        self.stack.push(Token::DocEnd(doc_end));
    }

    /// Handle the tokens after a completed value on its line.
    fn line_end(&mut self, mut token: Token) {
        match self.kind {
            TokenKind::Comma
            | TokenKind::DocStart
            | TokenKind::DocEnd
            | TokenKind::FlowSeqEnd
            | TokenKind::FlowMapEnd
            | TokenKind::MapValueInd => {
                self.attach(token);
                self.step();
            }
            _ => {
                if self.kind == TokenKind::Newline {
                    self.on_key_line = false;
                }
                push_end(&mut token, self.source_token());
                if self.kind == TokenKind::Newline {
                    self.attach(token);
                } else {
                    self.stack.push(token);
                }
            }
        }
    }

    /// Start a new value node for the current token, if it can start one.
    ///
    /// `prev` holds the parent's pending props; for implicit and explicit
    /// keys the props on the current line move to the new mapping's item.
    fn start_block_value(&mut self, prev: Option<&mut Vec<SourceToken>>) -> Option<Token> {
        let value = match self.kind {
            TokenKind::Alias
            | TokenKind::Scalar
            | TokenKind::SingleQuotedScalar
            | TokenKind::DoubleQuotedScalar => Token::FlowScalar(self.flow_scalar()),
            TokenKind::BlockScalarHeader => Token::BlockScalar(BlockScalar {
                offset: self.offset,
                indent: self.indent,
                props: vec![Token::Source(self.source_token())],
                source: String::new(),
            }),
            TokenKind::FlowMapStart | TokenKind::FlowSeqStart => {
                Token::FlowCollection(FlowCollection {
                    offset: self.offset,
                    indent: self.indent,
                    start: self.source_token(),
                    items: Vec::new(),
                    end: Vec::new(),
                })
            }
            TokenKind::SeqItemInd => Token::BlockSeq(BlockSeq {
                offset: self.offset,
                indent: self.indent,
                items: vec![CollectionItem::with_start(vec![self.source_token()])],
            }),
            TokenKind::ExplicitKeyInd => {
                self.on_key_line = true;
                let mut start = prev.map(first_key_start_props).unwrap_or_default();
                start.push(self.source_token());
                Token::BlockMap(BlockMap {
                    offset: self.offset,
                    indent: self.indent,
                    items: vec![CollectionItem {
                        start,
                        explicit_key: true,
                        ..CollectionItem::default()
                    }],
                })
            }
            TokenKind::MapValueInd => {
                self.on_key_line = true;
                let start = prev.map(first_key_start_props).unwrap_or_default();
                Token::BlockMap(BlockMap {
                    offset: self.offset,
                    indent: self.indent,
                    items: vec![CollectionItem::with_sep(start, self.source_token())],
                })
            }
            _ => return None,
        };
        Some(value)
    }

    fn at_indented_comment(&self, start: &[SourceToken], indent: usize) -> bool {
        self.kind == TokenKind::Comment
            && self.indent > indent
            && start
                .iter()
                .all(|st| matches!(st.kind, TokenKind::Newline | TokenKind::Space))
    }

    /// A new block map whose single item has the given start, key and separator.
    fn new_block_map(
        &self,
        start: Vec<SourceToken>,
        key: Option<Box<Token>>,
        sep: Vec<SourceToken>,
    ) -> Token {
        Token::BlockMap(BlockMap {
            offset: self.offset,
            indent: self.indent,
            items: vec![CollectionItem {
                start,
                explicit_key: false,
                key,
                sep: Some(sep),
                value: None,
            }],
        })
    }
}

impl Iterator for Parser {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(token);
            }
            if let Some(lexeme) = self.lexer.next() {
                self.push_lexeme(lexeme);
                continue;
            }
            if self.at_end && !self.finished {
                self.finished = true;
                self.end();
                continue;
            }
            return None;
        }
    }
}

/// Parse a complete input into top-level CST nodes.
#[must_use]
pub fn parse_cst(source: &str) -> Vec<Token> {
    let mut parser = Parser::new();
    parser.feed(source, true);
    parser.collect()
}

/// The last item of a collection, created if the collection is empty.
#[allow(clippy::indexing_slicing, reason = "The vector is non-empty here")]
fn last_item(items: &mut Vec<CollectionItem>) -> &mut CollectionItem {
    if items.is_empty() {
        items.push(CollectionItem::default());
    }
    let idx = items.len() - 1;
    &mut items[idx]
}

/// The props pending on `parent` that a new key could claim.
fn prev_props(parent: &mut Token) -> Option<&mut Vec<SourceToken>> {
    match parent {
        Token::Document(doc) => Some(&mut doc.start),
        Token::BlockMap(map) => map.items.last_mut().map(item_prev_props),
        Token::BlockSeq(seq) => seq.items.last_mut().map(|it| &mut it.start),
        _ => None,
    }
}

fn item_prev_props(it: &mut CollectionItem) -> &mut Vec<SourceToken> {
    match &mut it.sep {
        Some(sep) => sep,
        None => &mut it.start,
    }
}

/// Split off the props after the last indicator or newline in `prev`.
fn first_key_start_props(prev: &mut Vec<SourceToken>) -> Vec<SourceToken> {
    let mut idx = prev
        .iter()
        .rposition(|st| {
            matches!(
                st.kind,
                TokenKind::DocStart
                    | TokenKind::ExplicitKeyInd
                    | TokenKind::MapValueInd
                    | TokenKind::SeqItemInd
                    | TokenKind::Newline
            )
        })
        .map_or(0, |idx| idx + 1);
    while prev.get(idx).is_some_and(|st| st.kind == TokenKind::Space) {
        idx += 1;
    }
    prev.split_off(idx.min(prev.len()))
}

/// Append a trailing token to a node that has an `end` list.
fn push_end(token: &mut Token, st: SourceToken) {
    match token {
        Token::Document(Document { end, .. })
        | Token::DocEnd(DocumentEnd { end, .. })
        | Token::FlowScalar(FlowScalar { end, .. }) => {
            end.get_or_insert_with(Vec::new).push(st);
        }
        Token::FlowCollection(fc) => fc.end.push(st),
        _ => {}
    }
}

/// Remove a trailing item of a block collection that only holds blank lines
/// and less-indented comments. Those belong to the parent.
fn take_trailing_empty_item(token: &mut Token) -> Option<Vec<SourceToken>> {
    let (indent, items) = match token {
        Token::BlockMap(map) => (map.indent, &mut map.items),
        Token::BlockSeq(seq) => (seq.indent, &mut seq.items),
        _ => return None,
    };
    let last = items.last()?;
    let empty = last.sep.is_none()
        && last.value.is_none()
        && !last.start.is_empty()
        && find_non_empty_index(&last.start).is_none()
        && (indent == 0
            || last
                .start
                .iter()
                .all(|st| st.kind != TokenKind::Comment || st.indent < indent));
    if empty {
        items.pop().map(|it| it.start)
    } else {
        None
    }
}

/// Move a comment line indented past `items`' own indentation into the end
/// of the previous item's value.
fn append_to_previous_end(
    items: &mut Vec<CollectionItem>,
    token: SourceToken,
) -> Result<(), SourceToken> {
    let Some(prev_idx) = items.len().checked_sub(2) else {
        return Err(token);
    };
    let has_end = items
        .get_mut(prev_idx)
        .and_then(|prev| prev.value.as_deref_mut())
        .and_then(Token::end_mut)
        .is_some();
    if !has_end {
        return Err(token);
    }
    let Some(last) = items.pop() else {
        return Err(token);
    };
    match items
        .get_mut(prev_idx)
        .and_then(|prev| prev.value.as_deref_mut())
        .and_then(Token::end_mut)
    {
        Some(end) => {
            end.extend(last.start);
            end.push(token);
            Ok(())
        }
        None => Err(token),
    }
}

/// The trailing token list of `it`'s value, if it ends with a comment.
fn comment_end_mut(it: &mut CollectionItem) -> Option<&mut Vec<SourceToken>> {
    it.value
        .as_deref_mut()
        .and_then(Token::end_mut)
        .filter(|end| end.last().is_some_and(|st| st.kind == TokenKind::Comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::stringify;

    fn round_trip(source: &str) -> String {
        parse_cst(source).iter().map(stringify).collect()
    }

    #[test]
    fn test_round_trip_valid() {
        let inputs = [
            "",
            "a: 1\n",
            "# leading\n---\nkey: value # trailing\nlist:\n  - a\n  - b\n...\n",
            "%YAML 1.2\n%TAG !e! tag:example.com,2000:\n--- !e!foo\nx\n",
            "? complex\n: value\n? [a, b]\n: {c: d}\n",
            "text: |-\n  one\n   two\n\nnext: >+\n  folded\n\n",
            "anchors: &a\n  x: 1\nref: *a\nmerge:\n  <<: *a\n",
            "- 'single ''quoted'''\n- \"double \\\"quoted\\\"\"\n- plain\n  continued\n",
            "---\nfirst\n---\nsecond\n",
        ];
        for input in inputs {
            assert_eq!(round_trip(input), input, "{input:?}");
        }
    }

    #[test]
    fn test_round_trip_malformed() {
        let inputs = [
            "? [a\n,b]: 1",
            "key: [unterminated\nother: 1\n",
            "a: | junk\n  body\n",
            "]\n",
            "\"open\n",
            "a:\n\t- tab\n",
            "- a\nb: c\n",
            "... extra\n",
        ];
        for input in inputs {
            assert_eq!(round_trip(input), input, "{input:?}");
        }
    }

    #[test]
    fn test_round_trip_stray_flow_end_after_empty_value() {
        for input in ["a:\n\n}", "a:\n\n]", "a: \n\n}", "a:\n\n\n}\n", "a:\n# c\n\n]"] {
            assert_eq!(round_trip(input), input, "{input:?}");
        }
    }

    #[test]
    fn test_block_map_structure() {
        let tokens = parse_cst("a: 1\nb: 2\n");
        let [Token::Document(doc)] = tokens.as_slice() else {
            panic!("expected one document, got {tokens:?}");
        };
        let Some(Token::BlockMap(map)) = doc.value.as_deref() else {
            panic!("expected block map");
        };
        assert_eq!(map.items.len(), 2);
        let first = map.items.first().unwrap();
        assert!(matches!(first.key.as_deref(), Some(Token::FlowScalar(fs)) if fs.source == "a"));
        assert!(matches!(first.value.as_deref(), Some(Token::FlowScalar(fs)) if fs.source == "1"));
    }

    #[test]
    fn test_flow_sequence_items_are_values() {
        let tokens = parse_cst("[a, b: c]");
        let [Token::Document(doc)] = tokens.as_slice() else {
            panic!("expected one document");
        };
        let Some(Token::FlowCollection(fc)) = doc.value.as_deref() else {
            panic!("expected flow collection");
        };
        assert_eq!(fc.items.len(), 2);
        let first = fc.items.first().unwrap();
        assert!(first.key.is_none() && first.sep.is_none());
        assert!(matches!(first.value.as_deref(), Some(Token::FlowScalar(fs)) if fs.source == "a"));
        let second = fc.items.get(1).unwrap();
        assert!(second.key.is_some() && second.value.is_some());
    }

    #[test]
    fn test_junk_after_block_scalar_header() {
        let tokens = parse_cst("a: | junk\n  body\n");
        let [Token::Document(doc)] = tokens.as_slice() else {
            panic!("expected one document");
        };
        let Some(Token::BlockMap(map)) = doc.value.as_deref() else {
            panic!("expected block map");
        };
        let Some(Token::BlockScalar(scalar)) =
            map.items.first().and_then(|it| it.value.as_deref())
        else {
            panic!("expected block scalar");
        };
        assert!(scalar.props.iter().any(|prop| matches!(prop, Token::Error(_))));
        assert_eq!(scalar.source, "  body\n");
    }

    #[test]
    fn test_chunked_parse_matches_one_shot() {
        let input = "a: 1\nb:\n  - x\n  - \"y\"\n";
        let expected = parse_cst(input);
        let mut parser = Parser::new();
        let (head, tail) = input.split_at(9);
        parser.feed(head, false);
        let mut tokens: Vec<Token> = parser.by_ref().collect();
        parser.feed(tail, true);
        tokens.extend(parser);
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_line_counter() {
        let mut parser = Parser::with_line_counter();
        parser.feed("a: 1\nb: |\n  x\n  y\n", true);
        let _tokens: Vec<Token> = parser.by_ref().collect();
        let line_counter = parser.line_counter().unwrap();
        assert_eq!(line_counter.lines(), 5);
        assert_eq!(line_counter.line_pos(12).line, 3);
    }

    #[test]
    fn test_stream_level_tokens() {
        let tokens = parse_cst("%YAML 1.2\n---\n");
        assert!(matches!(tokens.first(), Some(Token::Directive(d)) if d.source == "%YAML 1.2"));
        assert!(tokens.iter().any(|t| matches!(t, Token::Document(_))));
    }
}
