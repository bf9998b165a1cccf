// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Concrete syntax tree.
//!
//! CST nodes keep every byte of the source: indentation, comments, quoting
//! and even unexpected tokens. [`stringify`] reproduces the exact source of
//! any node, for valid and invalid input alike. Nodes are plain owned data
//! and may be edited in place before composing.

use std::fmt;

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::token::TokenKind;

/// A single lexeme with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceToken {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub offset: usize,
    pub indent: usize,
    pub source: String,
}

/// Source that could not be placed in the tree, with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "error")]
pub struct ErrorToken {
    pub offset: usize,
    pub source: String,
    pub message: String,
}

/// A `%` directive line (without its trailing comment or newline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "directive")]
pub struct Directive {
    pub offset: usize,
    pub source: String,
}

/// A document: leading tokens (including `---` and document props), its
/// root value and any tokens after it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "document")]
pub struct Document {
    pub offset: usize,
    pub start: Vec<SourceToken>,
    pub value: Option<Box<Token>>,
    pub end: Option<Vec<SourceToken>>,
}

/// An explicit `...` document end marker, with the rest of its line.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "doc-end")]
pub struct DocumentEnd {
    pub offset: usize,
    pub source: String,
    pub end: Option<Vec<SourceToken>>,
}

/// An alias, plain, single-quoted or double-quoted scalar.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowScalar {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub offset: usize,
    pub indent: usize,
    pub source: String,
    pub end: Option<Vec<SourceToken>>,
}

/// A literal or folded block scalar. `props` starts with the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "block-scalar")]
pub struct BlockScalar {
    pub offset: usize,
    pub indent: usize,
    pub props: Vec<Token>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "block-map")]
pub struct BlockMap {
    pub offset: usize,
    pub indent: usize,
    pub items: Vec<CollectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "block-seq")]
pub struct BlockSeq {
    pub offset: usize,
    pub indent: usize,
    pub items: Vec<CollectionItem>,
}

/// A `{...}` or `[...]` collection. `end` starts with the closing bracket,
/// if one was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "flow-collection")]
pub struct FlowCollection {
    pub offset: usize,
    pub indent: usize,
    pub start: SourceToken,
    pub items: Vec<CollectionItem>,
    pub end: Vec<SourceToken>,
}

/// An entry of a collection.
///
/// `start` holds the tokens before the key (indicators, props, comments),
/// `sep` the tokens between key and value. A present `sep` marks the item as
/// a key/value pair, even when empty.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionItem {
    pub start: Vec<SourceToken>,
    #[serde(rename = "explicitKey", skip_serializing_if = "std::ops::Not::not")]
    pub explicit_key: bool,
    pub key: Option<Box<Token>>,
    pub sep: Option<Vec<SourceToken>>,
    pub value: Option<Box<Token>>,
}

impl CollectionItem {
    #[must_use]
    pub fn with_start(start: Vec<SourceToken>) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// An item with the given key and an empty separator.
    #[must_use]
    pub fn with_key(start: Vec<SourceToken>, key: Token) -> Self {
        Self {
            start,
            key: Some(Box::new(key)),
            sep: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// An item without key whose separator starts with `sep`.
    #[must_use]
    pub fn with_sep(start: Vec<SourceToken>, sep: SourceToken) -> Self {
        Self {
            start,
            sep: Some(vec![sep]),
            ..Self::default()
        }
    }
}

/// Any CST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Token {
    Source(SourceToken),
    Error(ErrorToken),
    Directive(Directive),
    Document(Document),
    DocEnd(DocumentEnd),
    FlowScalar(FlowScalar),
    BlockScalar(BlockScalar),
    BlockMap(BlockMap),
    BlockSeq(BlockSeq),
    FlowCollection(FlowCollection),
}

impl Token {
    /// The name used as `type` in the JSON form.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Source(token) => token.kind.name(),
            Self::FlowScalar(scalar) => scalar.kind.name(),
            Self::Error(_) => "error",
            Self::Directive(_) => "directive",
            Self::Document(_) => "document",
            Self::DocEnd(_) => "doc-end",
            Self::BlockScalar(_) => "block-scalar",
            Self::BlockMap(_) => "block-map",
            Self::BlockSeq(_) => "block-seq",
            Self::FlowCollection(_) => "flow-collection",
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Source(SourceToken { offset, .. })
            | Self::Error(ErrorToken { offset, .. })
            | Self::Directive(Directive { offset, .. })
            | Self::Document(Document { offset, .. })
            | Self::DocEnd(DocumentEnd { offset, .. })
            | Self::FlowScalar(FlowScalar { offset, .. })
            | Self::BlockScalar(BlockScalar { offset, .. })
            | Self::BlockMap(BlockMap { offset, .. })
            | Self::BlockSeq(BlockSeq { offset, .. })
            | Self::FlowCollection(FlowCollection { offset, .. }) => *offset,
        }
    }

    /// Indentation of nodes that have one.
    #[must_use]
    pub const fn indent(&self) -> Option<usize> {
        match self {
            Self::Source(SourceToken { indent, .. })
            | Self::FlowScalar(FlowScalar { indent, .. })
            | Self::BlockScalar(BlockScalar { indent, .. })
            | Self::BlockMap(BlockMap { indent, .. })
            | Self::BlockSeq(BlockSeq { indent, .. })
            | Self::FlowCollection(FlowCollection { indent, .. }) => Some(*indent),
            _ => None,
        }
    }

    /// Trailing tokens of nodes that carry them, when present.
    pub fn end_mut(&mut self) -> Option<&mut Vec<SourceToken>> {
        match self {
            Self::Document(Document { end, .. })
            | Self::DocEnd(DocumentEnd { end, .. })
            | Self::FlowScalar(FlowScalar { end, .. }) => end.as_mut(),
            Self::FlowCollection(fc) => Some(&mut fc.end),
            _ => None,
        }
    }

    /// Trailing tokens of nodes that carry them.
    #[must_use]
    pub fn end(&self) -> &[SourceToken] {
        match self {
            Self::Document(Document { end, .. })
            | Self::DocEnd(DocumentEnd { end, .. })
            | Self::FlowScalar(FlowScalar { end, .. }) => end.as_deref().unwrap_or_default(),
            Self::FlowCollection(fc) => &fc.end,
            _ => &[],
        }
    }

    /// Returns `true` for scalars, aliases and flow collections.
    #[must_use]
    pub const fn is_flow(&self) -> bool {
        matches!(self, Self::FlowScalar(_) | Self::FlowCollection(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

/// Returns `true` if any token in `list` has the given kind.
#[must_use]
pub fn includes_token(list: &[SourceToken], kind: TokenKind) -> bool {
    list.iter().any(|token| token.kind == kind)
}

/// Index of the first token that is not a space, comment or newline.
#[must_use]
pub fn find_non_empty_index(list: &[SourceToken]) -> Option<usize> {
    list.iter().position(|token| {
        !matches!(
            token.kind,
            TokenKind::Space | TokenKind::Comment | TokenKind::Newline
        )
    })
}

/// Reproduce the exact source of a CST node.
#[must_use]
pub fn stringify(token: &Token) -> String {
    let mut out = String::new();
    write_token(token, &mut out);
    out
}

/// Reproduce the exact source of a collection item.
#[must_use]
pub fn stringify_item(item: &CollectionItem) -> String {
    let mut out = String::new();
    write_item(item, &mut out);
    out
}

fn write_sources(list: &[SourceToken], out: &mut String) {
    for token in list {
        out.push_str(&token.source);
    }
}

fn write_token(token: &Token, out: &mut String) {
    match token {
        Token::Source(SourceToken { source, .. })
        | Token::Error(ErrorToken { source, .. })
        | Token::Directive(Directive { source, .. }) => out.push_str(source),
        Token::Document(doc) => {
            write_sources(&doc.start, out);
            if let Some(value) = &doc.value {
                write_token(value, out);
            }
            write_sources(doc.end.as_deref().unwrap_or_default(), out);
        }
        Token::DocEnd(DocumentEnd { source, end, .. })
        | Token::FlowScalar(FlowScalar { source, end, .. }) => {
            out.push_str(source);
            write_sources(end.as_deref().unwrap_or_default(), out);
        }
        Token::BlockScalar(scalar) => {
            for prop in &scalar.props {
                write_token(prop, out);
            }
            out.push_str(&scalar.source);
        }
        Token::BlockMap(BlockMap { items, .. }) | Token::BlockSeq(BlockSeq { items, .. }) => {
            for item in items {
                write_item(item, out);
            }
        }
        Token::FlowCollection(fc) => {
            out.push_str(&fc.start.source);
            for item in &fc.items {
                write_item(item, out);
            }
            write_sources(&fc.end, out);
        }
    }
}

fn write_item(item: &CollectionItem, out: &mut String) {
    write_sources(&item.start, out);
    if let Some(key) = &item.key {
        write_token(key, out);
    }
    write_sources(item.sep.as_deref().unwrap_or_default(), out);
    if let Some(value) = &item.value {
        write_token(value, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(kind: TokenKind, offset: usize, source: &str) -> SourceToken {
        SourceToken {
            kind,
            offset,
            indent: 0,
            source: source.to_owned(),
        }
    }

    fn plain(offset: usize, text: &str) -> Token {
        Token::FlowScalar(FlowScalar {
            kind: TokenKind::Scalar,
            offset,
            indent: 0,
            source: text.to_owned(),
            end: None,
        })
    }

    #[test]
    fn test_stringify_block_map() {
        let map = Token::BlockMap(BlockMap {
            offset: 0,
            indent: 0,
            items: vec![CollectionItem {
                start: Vec::new(),
                explicit_key: false,
                key: Some(Box::new(plain(0, "a"))),
                sep: Some(vec![
                    source(TokenKind::MapValueInd, 1, ":"),
                    source(TokenKind::Space, 2, " "),
                ]),
                value: Some(Box::new(plain(3, "1"))),
            }],
        });
        assert_eq!(stringify(&map), "a: 1");
        assert_eq!(map.to_string(), "a: 1");
    }

    #[test]
    fn test_serialized_shape() {
        let item = CollectionItem::with_key(Vec::new(), plain(0, "a"));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["key"]["type"], "scalar");
        assert_eq!(json["sep"], serde_json::json!([]));
        assert!(json.get("value").is_none());
        assert!(json.get("explicitKey").is_none());

        let doc = Token::Document(Document {
            offset: 0,
            start: vec![source(TokenKind::DocStart, 0, "---")],
            value: None,
            end: None,
        });
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["start"][0]["type"], "doc-start");
    }

    #[test]
    fn test_find_non_empty_index() {
        let list = [
            source(TokenKind::Space, 0, " "),
            source(TokenKind::Comment, 1, "#"),
            source(TokenKind::Anchor, 2, "&a"),
        ];
        assert_eq!(find_non_empty_index(&list), Some(2));
        assert_eq!(find_non_empty_index(list.get(..2).unwrap()), None);
        assert!(includes_token(&list, TokenKind::Comment));
    }
}
