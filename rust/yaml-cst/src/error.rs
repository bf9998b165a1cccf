// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Diagnostic records produced while parsing and composing YAML.
//!
//! Lexing, parsing and composition never abort. Every problem they find is
//! recorded as a [`Diagnostic`] carrying a kind from a closed taxonomy, the
//! byte range it concerns and a message. Rendering these for humans is left
//! to the caller.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::span::{Span, span};

/// The kind of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Anchor or tag applied to an alias.
    AliasProps,
    /// Empty or ambiguous anchor/alias name.
    BadAlias,
    /// A collection tag used with the wrong collection kind.
    BadCollectionType,
    /// Malformed, unknown or unsupported directive.
    BadDirective,
    /// Invalid escape sequence in a double-quoted scalar.
    BadDqEscape,
    /// Invalid indentation.
    BadIndent,
    /// Anchor or tag placed before an indicator.
    BadPropOrder,
    /// Plain scalar starting with a reserved character.
    BadScalarStart,
    /// A block collection used as an implicit key.
    BlockAsImplicitKey,
    /// A block collection inside a flow collection.
    BlockInFlow,
    /// Duplicate key in a mapping (only with unique keys enabled).
    DuplicateKey,
    /// Flow collection not closed where it must be.
    FlowEndError,
    /// Internal state that should not be reachable.
    Impossible,
    /// Implicit key longer than 1024 characters.
    KeyOver1024Chars,
    /// Missing character: closing quote, separator, indicator line, ...
    MissingChar,
    /// Implicit key spanning more than one line.
    MultilineImplicitKey,
    /// More than one anchor on a node.
    MultipleAnchors,
    /// More than one document where one was expected.
    MultipleDocs,
    /// More than one tag on a node.
    MultipleTags,
    /// Tab characters used as indentation.
    TabAsIndent,
    /// Tag could not be resolved; the raw string is used instead.
    TagResolveFailed,
    /// Unexpected token.
    UnexpectedToken,
    /// Alias without a matching anchor, found while materializing values.
    AliasResolveFailed,
}

impl ErrorKind {
    /// The stable upper-snake-case code of this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AliasProps => "ALIAS_PROPS",
            Self::BadAlias => "BAD_ALIAS",
            Self::BadCollectionType => "BAD_COLLECTION_TYPE",
            Self::BadDirective => "BAD_DIRECTIVE",
            Self::BadDqEscape => "BAD_DQ_ESCAPE",
            Self::BadIndent => "BAD_INDENT",
            Self::BadPropOrder => "BAD_PROP_ORDER",
            Self::BadScalarStart => "BAD_SCALAR_START",
            Self::BlockAsImplicitKey => "BLOCK_AS_IMPLICIT_KEY",
            Self::BlockInFlow => "BLOCK_IN_FLOW",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::FlowEndError => "FLOW_END_ERROR",
            Self::Impossible => "IMPOSSIBLE",
            Self::KeyOver1024Chars => "KEY_OVER_1024_CHARS",
            Self::MissingChar => "MISSING_CHAR",
            Self::MultilineImplicitKey => "MULTILINE_IMPLICIT_KEY",
            Self::MultipleAnchors => "MULTIPLE_ANCHORS",
            Self::MultipleDocs => "MULTIPLE_DOCS",
            Self::MultipleTags => "MULTIPLE_TAGS",
            Self::TabAsIndent => "TAB_AS_INDENT",
            Self::TagResolveFailed => "TAG_RESOLVE_FAILED",
            Self::UnexpectedToken => "UNEXPECTED_TOKEN",
            Self::AliasResolveFailed => "ALIAS_RESOLVE_FAILED",
        }
    }

    /// Get a suggestion for how to fix this error.
    ///
    /// Returns `Some(suggestion)` if a helpful fix suggestion is available,
    /// or `None` if no specific suggestion applies.
    #[must_use]
    pub const fn suggestion(self) -> Option<&'static str> {
        match self {
            Self::BadIndent => {
                Some("YAML uses spaces for indentation; ensure consistent indentation levels")
            }
            Self::TabAsIndent => {
                Some("Replace tabs with spaces; YAML requires space-based indentation")
            }
            Self::BadDqEscape => Some(
                "Valid escape sequences: \\n, \\r, \\t, \\\\, \\\", \\0, \\x##, \\u####, \\U########",
            ),
            Self::DuplicateKey => Some("Remove or rename one of the duplicate keys"),
            Self::AliasResolveFailed => {
                Some("Define the anchor with &name before referencing it with *name")
            }
            Self::MultipleAnchors => {
                Some("A node can only have one anchor; remove the extra &anchor")
            }
            Self::MultipleTags => Some("A node can only have one tag; remove the extra !tag"),
            Self::AliasProps => Some(
                "Aliases (*name) cannot have anchors or tags; apply them to the original value",
            ),
            Self::MultilineImplicitKey => {
                Some("Put the key on a single line or mark it as explicit with '? '")
            }
            Self::FlowEndError => Some("Close the flow collection with the matching ] or }"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A structured error or warning: kind, byte range and message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The kind of problem.
    pub kind: ErrorKind,
    /// The span in the source the problem concerns.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// A diagnostic pointing at a single offset.
    #[must_use]
    pub fn at(kind: ErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self::new(kind, span(offset, offset + 1), message)
    }

    /// Shift the span by `delta` bytes.
    #[must_use]
    pub fn shifted(mut self, delta: usize) -> Self {
        self.span = span(self.span.start + delta, self.span.end + delta);
        self
    }

    /// Get a suggestion for how to fix this problem.
    ///
    /// Delegates to [`ErrorKind::suggestion()`].
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        self.kind.suggestion()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at [{}, {}]: {}",
            self.kind, self.span.start, self.span.end, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 3)?;
        state.serialize_field("kind", self.kind.code())?;
        state.serialize_field("pos", &[self.span.start, self.span.end])?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

/// Where a diagnostic points: an offset or a range.
///
/// Composition helpers accept either, mirroring how problems are located on
/// single characters, tokens or whole nodes.
#[derive(Debug, Clone, Copy)]
pub enum ErrorPos {
    Offset(usize),
    Range(usize, usize),
}

impl ErrorPos {
    #[must_use]
    pub fn to_span(self) -> Span {
        match self {
            Self::Offset(offset) => span(offset, offset + 1),
            Self::Range(start, end) => span(start, end),
        }
    }
}

impl From<usize> for ErrorPos {
    fn from(offset: usize) -> Self {
        Self::Offset(offset)
    }
}

impl From<[usize; 2]> for ErrorPos {
    fn from([start, end]: [usize; 2]) -> Self {
        Self::Range(start, end)
    }
}
