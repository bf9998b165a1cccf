// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Token kinds for the YAML lexer.
//!
//! The lexer produces plain strings: exact slices of the source, interleaved
//! with three single-character sentinels that cannot appear in legal YAML.
//! [`token_kind`] classifies a lexeme into a [`TokenKind`].

use serde::Serialize;

/// Byte order mark, passed through as its own token.
pub const BOM: &str = "\u{feff}";
/// Start of a document (emitted before the first content of each document).
pub const DOCUMENT: &str = "\u{2}";
/// Unexpected end of a flow collection.
pub const FLOW_END: &str = "\u{18}";
/// The next token is a plain or block scalar body.
pub const SCALAR: &str = "\u{1f}";

/// The type of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    ByteOrderMark,
    DocMode,
    DocStart,
    DocEnd,
    FlowErrorEnd,
    /// Marker: the following lexeme is a scalar body.
    Scalar,
    Space,
    Comment,
    Newline,
    DirectiveLine,
    Anchor,
    Tag,
    Alias,
    SeqItemInd,
    ExplicitKeyInd,
    MapValueInd,
    FlowMapStart,
    FlowMapEnd,
    FlowSeqStart,
    FlowSeqEnd,
    Comma,
    SingleQuotedScalar,
    DoubleQuotedScalar,
    BlockScalarHeader,
}

impl TokenKind {
    /// The kebab-case name used in the CST JSON shape.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ByteOrderMark => "byte-order-mark",
            Self::DocMode => "doc-mode",
            Self::DocStart => "doc-start",
            Self::DocEnd => "doc-end",
            Self::FlowErrorEnd => "flow-error-end",
            Self::Scalar => "scalar",
            Self::Space => "space",
            Self::Comment => "comment",
            Self::Newline => "newline",
            Self::DirectiveLine => "directive-line",
            Self::Anchor => "anchor",
            Self::Tag => "tag",
            Self::Alias => "alias",
            Self::SeqItemInd => "seq-item-ind",
            Self::ExplicitKeyInd => "explicit-key-ind",
            Self::MapValueInd => "map-value-ind",
            Self::FlowMapStart => "flow-map-start",
            Self::FlowMapEnd => "flow-map-end",
            Self::FlowSeqStart => "flow-seq-start",
            Self::FlowSeqEnd => "flow-seq-end",
            Self::Comma => "comma",
            Self::SingleQuotedScalar => "single-quoted-scalar",
            Self::DoubleQuotedScalar => "double-quoted-scalar",
            Self::BlockScalarHeader => "block-scalar-header",
        }
    }

    /// Returns `true` for tokens that begin a flow scalar or an alias.
    #[must_use]
    pub const fn is_flow_scalar(self) -> bool {
        matches!(
            self,
            Self::Alias | Self::Scalar | Self::SingleQuotedScalar | Self::DoubleQuotedScalar
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identify the type of a lexeme, or `None` if it is not a YAML token.
///
/// Scalar bodies following a [`SCALAR`] marker are not classified here; the
/// parser consumes them directly.
#[must_use]
pub fn token_kind(source: &str) -> Option<TokenKind> {
    let kind = match source {
        BOM => TokenKind::ByteOrderMark,
        DOCUMENT => TokenKind::DocMode,
        FLOW_END => TokenKind::FlowErrorEnd,
        SCALAR => TokenKind::Scalar,
        "---" => TokenKind::DocStart,
        "..." => TokenKind::DocEnd,
        "" | "\n" | "\r\n" => TokenKind::Newline,
        "-" => TokenKind::SeqItemInd,
        "?" => TokenKind::ExplicitKeyInd,
        ":" => TokenKind::MapValueInd,
        "{" => TokenKind::FlowMapStart,
        "}" => TokenKind::FlowMapEnd,
        "[" => TokenKind::FlowSeqStart,
        "]" => TokenKind::FlowSeqEnd,
        "," => TokenKind::Comma,
        _ => match source.as_bytes().first()? {
            b' ' | b'\t' => TokenKind::Space,
            b'#' => TokenKind::Comment,
            b'%' => TokenKind::DirectiveLine,
            b'*' => TokenKind::Alias,
            b'&' => TokenKind::Anchor,
            b'!' => TokenKind::Tag,
            b'\'' => TokenKind::SingleQuotedScalar,
            b'"' => TokenKind::DoubleQuotedScalar,
            b'|' | b'>' => TokenKind::BlockScalarHeader,
            _ => return None,
        },
    };
    Some(kind)
}

/// Render a lexeme for debugging, showing sentinels as bracketed labels.
#[must_use]
pub fn describe_token(source: &str) -> String {
    match source {
        BOM => "<BOM>".to_owned(),
        DOCUMENT => "<DOC>".to_owned(),
        FLOW_END => "<FLOW_END>".to_owned(),
        SCALAR => "<SCALAR>".to_owned(),
        _ => format!("{source:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_sentinels() {
        assert_eq!(token_kind(DOCUMENT), Some(TokenKind::DocMode));
        assert_eq!(token_kind(SCALAR), Some(TokenKind::Scalar));
        assert_eq!(token_kind(FLOW_END), Some(TokenKind::FlowErrorEnd));
        assert_eq!(token_kind(BOM), Some(TokenKind::ByteOrderMark));
    }

    #[test]
    fn test_token_kind_by_first_char() {
        let cases = [
            ("  ", TokenKind::Space),
            ("\t", TokenKind::Space),
            ("# hi", TokenKind::Comment),
            ("%YAML 1.2", TokenKind::DirectiveLine),
            ("*ref", TokenKind::Alias),
            ("&ref", TokenKind::Anchor),
            ("!!str", TokenKind::Tag),
            ("'a'", TokenKind::SingleQuotedScalar),
            ("\"a\"", TokenKind::DoubleQuotedScalar),
            ("|-", TokenKind::BlockScalarHeader),
            ("", TokenKind::Newline),
            ("\r\n", TokenKind::Newline),
        ];
        for (source, kind) in cases {
            assert_eq!(token_kind(source), Some(kind), "{source:?}");
        }
        assert_eq!(token_kind("plain"), None);
    }

    #[test]
    fn test_describe_token() {
        assert_eq!(describe_token(SCALAR), "<SCALAR>");
        assert_eq!(describe_token("a"), "\"a\"");
    }
}
