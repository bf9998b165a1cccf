// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Node properties and trailing tokens.
//!
//! The tokens before a value (indicator, anchor, tag, comments) and the
//! tokens after it (comments, newlines) are validated here and reduced to
//! the properties of the node they belong to.

use super::Diagnostics;
use crate::cst::{SourceToken, Token};
use crate::error::ErrorKind;
use crate::token::TokenKind;

/// The node following a run of property tokens.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Next<'t> {
    Node(&'t Token),
    Source(&'t SourceToken),
}

impl<'t> Next<'t> {
    pub(crate) fn of(node: Option<&'t Token>, tokens: Option<&'t [SourceToken]>) -> Option<Self> {
        node.map(Self::Node)
            .or_else(|| tokens.and_then(<[SourceToken]>::first).map(Self::Source))
    }

    fn type_name(self) -> &'static str {
        match self {
            Self::Node(token) => token.type_name(),
            Self::Source(token) => token.kind.name(),
        }
    }

    const fn offset(self) -> usize {
        match self {
            Self::Node(token) => token.offset(),
            Self::Source(token) => token.offset,
        }
    }

    fn is_empty_scalar(self) -> bool {
        matches!(self, Self::Node(Token::FlowScalar(scalar))
            if scalar.kind == TokenKind::Scalar && scalar.source.is_empty())
    }
}

/// Where a run of property tokens occurs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PropsContext<'t> {
    /// `"flow map"` or `"flow sequence"` inside flow collections.
    pub flow: Option<&'static str>,
    /// The indicator expected among the tokens.
    pub indicator: TokenKind,
    pub next: Option<Next<'t>>,
    /// Offset used when there are no tokens.
    pub offset: usize,
    pub parent_indent: usize,
    pub start_on_newline: bool,
}

/// Properties of a node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Props<'t> {
    pub comma: Option<&'t SourceToken>,
    pub found: Option<&'t SourceToken>,
    pub space_before: bool,
    pub comment: String,
    pub has_newline: bool,
    pub anchor: Option<&'t SourceToken>,
    pub tag: Option<&'t SourceToken>,
    pub newline_after_prop: Option<&'t SourceToken>,
    /// End offset of the tokens.
    pub end: usize,
    /// Offset of the first anchor or tag, else `end`.
    pub start: usize,
}

const PROP_SPACE_MSG: &str = "Tags and anchors must be separated from the next token by white space";
pub(crate) const COMMENT_SPACE_MSG: &str =
    "Comments must be separated from other tokens by white space characters";

#[allow(clippy::too_many_lines, reason = "One pass over the property tokens")]
pub(crate) fn resolve_props<'t>(
    tokens: &'t [SourceToken],
    ctx: PropsContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Props<'t> {
    let mut props = Props::default();
    let mut at_newline = ctx.start_on_newline;
    let mut has_space = ctx.start_on_newline;
    let mut comment_sep = String::new();
    let mut req_space = false;
    let mut tab: Option<&SourceToken> = None;
    let mut start = None;

    for token in tokens {
        if req_space {
            if !matches!(
                token.kind,
                TokenKind::Space | TokenKind::Newline | TokenKind::Comma
            ) {
                diagnostics.error(token.offset, ErrorKind::MissingChar, PROP_SPACE_MSG);
            }
            req_space = false;
        }
        if let Some(tab) = tab.take()
            && at_newline
            && !matches!(token.kind, TokenKind::Comment | TokenKind::Newline)
        {
            diagnostics.error(tab, ErrorKind::TabAsIndent, "Tabs are not allowed as indentation");
        }
        match token.kind {
            TokenKind::Space => {
                // At document level, a tab before a flow collection is
                // leading white space rather than indentation.
                let doc_flow = ctx.indicator == TokenKind::DocStart
                    && ctx.next.is_some_and(|next| next.type_name() == "flow-collection");
                if ctx.flow.is_none() && !doc_flow && token.source.contains('\t') {
                    tab = Some(token);
                }
                has_space = true;
            }
            TokenKind::Comment => {
                if !has_space {
                    diagnostics.error(token, ErrorKind::MissingChar, COMMENT_SPACE_MSG);
                }
                let body = comment_body(&token.source);
                if props.comment.is_empty() {
                    props.comment = body.to_owned();
                } else {
                    props.comment.push_str(&comment_sep);
                    props.comment.push_str(body);
                }
                comment_sep.clear();
                at_newline = false;
            }
            TokenKind::Newline => {
                if at_newline {
                    if !props.comment.is_empty() {
                        props.comment.push_str(&token.source);
                    } else if props.found.is_none() || ctx.indicator != TokenKind::SeqItemInd {
                        props.space_before = true;
                    }
                } else {
                    comment_sep.push_str(&token.source);
                }
                at_newline = true;
                props.has_newline = true;
                if props.anchor.is_some() || props.tag.is_some() {
                    props.newline_after_prop = Some(token);
                }
                has_space = true;
            }
            TokenKind::Anchor => {
                if props.anchor.is_some() {
                    diagnostics.error(
                        token,
                        ErrorKind::MultipleAnchors,
                        "A node can have at most one anchor",
                    );
                }
                if token.source.ends_with(':') {
                    diagnostics.warn(
                        token.offset + token.source.len() - 1,
                        ErrorKind::BadAlias,
                        "Anchor ending in : is ambiguous",
                    );
                }
                props.anchor = Some(token);
                start.get_or_insert(token.offset);
                at_newline = false;
                has_space = false;
                req_space = true;
            }
            TokenKind::Tag => {
                if props.tag.is_some() {
                    diagnostics.error(token, ErrorKind::MultipleTags, "A node can have at most one tag");
                }
                props.tag = Some(token);
                start.get_or_insert(token.offset);
                at_newline = false;
                has_space = false;
                req_space = true;
            }
            kind if kind == ctx.indicator => {
                if props.anchor.is_some() || props.tag.is_some() {
                    diagnostics.error(
                        token,
                        ErrorKind::BadPropOrder,
                        format!("Anchors and tags must be after the {} indicator", token.source),
                    );
                }
                if props.found.is_some() {
                    diagnostics.error(
                        token,
                        ErrorKind::UnexpectedToken,
                        format!(
                            "Unexpected {} in {}",
                            token.source,
                            ctx.flow.unwrap_or("collection")
                        ),
                    );
                }
                props.found = Some(token);
                at_newline = matches!(kind, TokenKind::SeqItemInd | TokenKind::ExplicitKeyInd);
                has_space = false;
            }
            TokenKind::Comma if ctx.flow.is_some() => {
                if props.comma.is_some() {
                    diagnostics.error(
                        token,
                        ErrorKind::UnexpectedToken,
                        format!("Unexpected , in {}", ctx.flow.unwrap_or_default()),
                    );
                }
                props.comma = Some(token);
                at_newline = false;
                has_space = false;
            }
            kind => {
                diagnostics.error(
                    token,
                    ErrorKind::UnexpectedToken,
                    format!("Unexpected {kind} token"),
                );
                at_newline = false;
                has_space = false;
            }
        }
    }

    props.end = tokens
        .last()
        .map_or(ctx.offset, |last| last.offset + last.source.len());
    if req_space
        && let Some(next) = ctx.next
        && !matches!(next.type_name(), "space" | "newline" | "comma")
        && !next.is_empty_scalar()
    {
        diagnostics.error(next.offset(), ErrorKind::MissingChar, PROP_SPACE_MSG);
    }
    if let Some(tab) = tab
        && ((at_newline && tab.indent <= ctx.parent_indent)
            || ctx
                .next
                .is_some_and(|next| matches!(next.type_name(), "block-map" | "block-seq")))
    {
        diagnostics.error(tab, ErrorKind::TabAsIndent, "Tabs are not allowed as indentation");
    }
    props.start = start.unwrap_or(props.end);
    props
}

/// The text of a comment token, without `#`. An empty comment is a space.
pub(crate) fn comment_body(source: &str) -> &str {
    match source.get(1..) {
        Some(body) if !body.is_empty() => body,
        _ => " ",
    }
}

/// Trailing comment of a node and the offset where the node ends.
#[derive(Debug, Clone, Default)]
pub(crate) struct End {
    pub comment: String,
    pub offset: usize,
}

pub(crate) fn resolve_end(
    end: Option<&[SourceToken]>,
    mut offset: usize,
    req_space: bool,
    diagnostics: &mut Diagnostics,
) -> End {
    let mut comment = String::new();
    let mut has_space = false;
    let mut sep = String::new();
    for token in end.unwrap_or_default() {
        match token.kind {
            TokenKind::Space => has_space = true,
            TokenKind::Comment => {
                if req_space && !has_space {
                    diagnostics.error(token, ErrorKind::MissingChar, COMMENT_SPACE_MSG);
                }
                let body = comment_body(&token.source);
                if !comment.is_empty() {
                    comment.push_str(&sep);
                }
                comment.push_str(body);
                sep.clear();
            }
            TokenKind::Newline => {
                if !comment.is_empty() {
                    sep.push_str(&token.source);
                }
                has_space = true;
            }
            kind => diagnostics.error(
                token,
                ErrorKind::UnexpectedToken,
                format!("Unexpected {kind} at node end"),
            ),
        }
        offset += token.source.len();
    }
    End { comment, offset }
}

/// Whether a would-be implicit key spans lines.
pub(crate) fn contains_newline(key: Option<&Token>) -> bool {
    let has_newline = |tokens: &[SourceToken]| {
        tokens.iter().any(|token| token.kind == TokenKind::Newline)
    };
    match key {
        None => false,
        Some(Token::FlowScalar(scalar)) => {
            scalar.source.contains('\n') || scalar.end.as_deref().is_some_and(has_newline)
        }
        Some(Token::FlowCollection(fc)) => fc.items.iter().any(|it| {
            has_newline(&it.start)
                || it.sep.as_deref().is_some_and(has_newline)
                || contains_newline(it.key.as_deref())
                || contains_newline(it.value.as_deref())
        }),
        Some(_) => true,
    }
}

/// Where an empty value sits: after the last non-empty token of `before`,
/// and after any spaces that follow it.
pub(crate) fn empty_scalar_position(
    mut offset: usize,
    before: Option<&[SourceToken]>,
    pos: Option<usize>,
) -> usize {
    let Some(before) = before else {
        return offset;
    };
    let pos = pos.unwrap_or(before.len()).min(before.len());
    for idx in (0..pos).rev() {
        let Some(st) = before.get(idx) else { break };
        if matches!(
            st.kind,
            TokenKind::Space | TokenKind::Comment | TokenKind::Newline
        ) {
            offset = offset.saturating_sub(st.source.len());
            continue;
        }
        for st in before.iter().skip(idx + 1) {
            if st.kind != TokenKind::Space {
                break;
            }
            offset += st.source.len();
        }
        break;
    }
    offset
}

/// In compat mode, a closing bracket on a new line should be indented more
/// than the parent collection.
pub(crate) fn flow_indent_check(indent: usize, token: Option<&Token>, diagnostics: &mut Diagnostics) {
    if let Some(Token::FlowCollection(fc)) = token
        && let Some(end) = fc.end.first()
        && end.indent == indent
        && matches!(end.source.as_str(), "]" | "}")
        && contains_newline(token)
    {
        diagnostics.warn(
            end,
            ErrorKind::BadIndent,
            "Flow end indicator should be more indented than parent",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(kind: TokenKind, offset: usize, source: &str) -> SourceToken {
        SourceToken {
            kind,
            offset,
            indent: 0,
            source: source.to_owned(),
        }
    }

    fn ctx(indicator: TokenKind) -> PropsContext<'static> {
        PropsContext {
            flow: None,
            indicator,
            next: None,
            offset: 0,
            parent_indent: 0,
            start_on_newline: true,
        }
    }

    #[test]
    fn test_props_anchor_tag_comment() {
        let tokens = vec![
            st(TokenKind::SeqItemInd, 0, "-"),
            st(TokenKind::Space, 1, " "),
            st(TokenKind::Anchor, 2, "&a"),
            st(TokenKind::Space, 4, " "),
            st(TokenKind::Tag, 5, "!!str"),
            st(TokenKind::Space, 10, " "),
            st(TokenKind::Comment, 11, "#note"),
        ];
        let mut diagnostics = Diagnostics::default();
        let props = resolve_props(&tokens, ctx(TokenKind::SeqItemInd), &mut diagnostics);
        assert!(diagnostics.errors.is_empty());
        assert_eq!(props.found.map(|t| t.offset), Some(0));
        assert_eq!(props.anchor.map(|t| t.source.as_str()), Some("&a"));
        assert_eq!(props.tag.map(|t| t.source.as_str()), Some("!!str"));
        assert_eq!(props.comment, "note");
        assert_eq!((props.start, props.end), (2, 16));
    }

    #[test]
    fn test_props_errors() {
        let tokens = vec![
            st(TokenKind::Anchor, 0, "&a"),
            st(TokenKind::Space, 2, " "),
            st(TokenKind::Anchor, 3, "&b"),
            st(TokenKind::Comment, 5, "#x"),
        ];
        let mut diagnostics = Diagnostics::default();
        let _ = resolve_props(&tokens, ctx(TokenKind::ExplicitKeyInd), &mut diagnostics);
        let kinds: Vec<ErrorKind> = diagnostics.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::MultipleAnchors,
                ErrorKind::MissingChar,
                ErrorKind::MissingChar
            ]
        );
    }

    #[test]
    fn test_resolve_end() {
        let tokens = vec![
            st(TokenKind::Space, 3, " "),
            st(TokenKind::Comment, 4, "#c"),
            st(TokenKind::Newline, 6, "\n"),
        ];
        let mut diagnostics = Diagnostics::default();
        let end = resolve_end(Some(&tokens), 3, true, &mut diagnostics);
        assert_eq!(end.comment, "c");
        assert_eq!(end.offset, 7);
        assert!(diagnostics.errors.is_empty());
    }

    #[test]
    fn test_quoted_key_with_line_break_spans_lines() {
        let scalar = |kind, source: &str| {
            Token::FlowScalar(crate::cst::FlowScalar {
                kind,
                offset: 0,
                indent: 0,
                source: source.to_owned(),
                end: None,
            })
        };
        assert!(contains_newline(Some(&scalar(TokenKind::DoubleQuotedScalar, "\"c\n d\""))));
        assert!(contains_newline(Some(&scalar(TokenKind::SingleQuotedScalar, "'c\n d'"))));
        assert!(!contains_newline(Some(&scalar(TokenKind::DoubleQuotedScalar, "\"c d\""))));
    }

    #[test]
    fn test_empty_scalar_position() {
        let tokens = vec![
            st(TokenKind::MapValueInd, 1, ":"),
            st(TokenKind::Space, 2, " "),
            st(TokenKind::Comment, 3, "#c"),
        ];
        assert_eq!(empty_scalar_position(5, Some(&tokens), None), 3);
        assert_eq!(empty_scalar_position(5, None, None), 5);
    }
}
