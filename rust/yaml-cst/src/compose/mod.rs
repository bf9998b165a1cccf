// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Composition of CST documents into [`Document`]s.
//!
//! The [`Composer`] is fed top-level CST tokens in source order. Directive
//! lines and comments before a document are collected into its prologue;
//! each `document` token is composed into a [`Document`] and handed out when
//! the next one starts, or on [`Composer::end`]. Problems never stop
//! composition: they are recorded on the document they concern, or on the
//! following one for stream-level problems that precede any document.

mod block_scalar;
mod collection;
mod flow_scalar;
mod node;
mod props;

use log::debug;

use crate::cst::{self, SourceToken, Token};
use crate::directives::Directives;
use crate::document::{Content, Document, NodeRange};
use crate::error::{Diagnostic, ErrorKind, ErrorPos};
use crate::options::{Options, SchemaKind, Version};
use crate::schema::Schema;
use crate::token::TokenKind;

use node::DocComposer;
use props::{Next, PropsContext, resolve_end, resolve_props};

/// Errors and warnings collected while composing.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn report(
        &mut self,
        pos: impl Into<ErrorPos>,
        kind: ErrorKind,
        message: impl Into<String>,
        warning: bool,
    ) {
        let diagnostic = Diagnostic::new(kind, pos.into().to_span(), message);
        if warning {
            self.warnings.push(diagnostic);
        } else {
            self.errors.push(diagnostic);
        }
    }

    pub(crate) fn error(&mut self, pos: impl Into<ErrorPos>, kind: ErrorKind, message: impl Into<String>) {
        self.report(pos, kind, message, false);
    }

    pub(crate) fn warn(&mut self, pos: impl Into<ErrorPos>, kind: ErrorKind, message: impl Into<String>) {
        self.report(pos, kind, message, true);
    }

    fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl From<&SourceToken> for ErrorPos {
    fn from(token: &SourceToken) -> Self {
        Self::Range(token.offset, token.offset + token.source.len())
    }
}

impl From<&Token> for ErrorPos {
    fn from(token: &Token) -> Self {
        let offset = token.offset();
        let len = match token {
            Token::Source(cst::SourceToken { source, .. })
            | Token::Error(cst::ErrorToken { source, .. })
            | Token::Directive(cst::Directive { source, .. })
            | Token::DocEnd(cst::DocumentEnd { source, .. })
            | Token::FlowScalar(cst::FlowScalar { source, .. })
            | Token::BlockScalar(cst::BlockScalar { source, .. }) => source.len(),
            _ => 1,
        };
        Self::Range(offset, offset + len)
    }
}

impl From<NodeRange> for ErrorPos {
    fn from(range: NodeRange) -> Self {
        Self::Range(range.start, range.value_end)
    }
}

/// Comment and blank-line information gathered from a prologue.
struct Prelude {
    comment: String,
    after_empty_line: bool,
}

fn parse_prelude(prelude: &[String]) -> Prelude {
    let mut comment = String::new();
    let mut at_comment = false;
    let mut after_empty_line = false;
    let mut idx = 0;
    while let Some(source) = prelude.get(idx) {
        match source.chars().next() {
            Some('#') => {
                if !comment.is_empty() {
                    comment.push_str(if after_empty_line { "\n\n" } else { "\n" });
                }
                comment.push_str(props::comment_body(source));
                at_comment = true;
                after_empty_line = false;
            }
            Some('%') => {
                // Skip the newline ending the directive line.
                if prelude.get(idx + 1).and_then(|next| next.chars().next()) != Some('#') {
                    idx += 1;
                }
                at_comment = false;
            }
            _ => {
                if !at_comment {
                    after_empty_line = true;
                }
                at_comment = false;
            }
        }
        idx += 1;
    }
    Prelude {
        comment,
        after_empty_line,
    }
}

fn append_comment(target: &mut Option<String>, comment: &str) {
    match target {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(comment);
        }
        None => *target = Some(comment.to_owned()),
    }
}

fn prepend_comment(target: &mut Option<String>, comment: &str) {
    *target = Some(match target.take() {
        Some(existing) => format!("{comment}\n{existing}"),
        None => comment.to_owned(),
    });
}

/// Composes a stream of top-level CST tokens into documents.
#[derive(Debug)]
pub struct Composer {
    options: Options,
    schema: Schema,
    directives: Directives,
    doc: Option<Document>,
    prelude: Vec<String>,
    at_directives: bool,
    diagnostics: Diagnostics,
}

impl Composer {
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let mut schema = Schema::new(options.schema, options.merge_keys);
        if let Some(compat) = options.compat {
            schema = schema.with_compat(compat);
        }
        Self {
            options: options.clone(),
            schema,
            directives: Directives::new(options.version),
            doc: None,
            prelude: Vec::new(),
            at_directives: false,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Compose every token, then finish the stream.
    pub fn compose(&mut self, tokens: impl IntoIterator<Item = Token>, force_doc: bool, end_offset: usize) -> Vec<Document> {
        let mut docs: Vec<Document> = tokens.into_iter().filter_map(|token| self.next(token)).collect();
        docs.extend(self.end(force_doc, end_offset));
        docs
    }

    /// Feed one top-level token. Returns the previous document once a new
    /// one starts.
    pub fn next(&mut self, token: Token) -> Option<Document> {
        match token {
            Token::Directive(directive) => {
                let (start, end) = (directive.offset, directive.offset + directive.source.len());
                let diagnostics = &mut self.diagnostics;
                self.directives.add(&directive.source, |col, message| {
                    diagnostics.warn([start + col, end], ErrorKind::BadDirective, message);
                });
                self.prelude.push(directive.source);
                self.at_directives = true;
                None
            }
            Token::Document(doc_token) => {
                let doc = self.compose_doc(&doc_token);
                if self.at_directives && !doc.directives_end_marker {
                    self.diagnostics.error(
                        &Token::Document(doc_token),
                        ErrorKind::MissingChar,
                        "Missing directives-end/doc-start indicator line",
                    );
                }
                let doc = self.decorate(doc, false);
                self.at_directives = false;
                self.doc.replace(doc)
            }
            Token::Source(st) => {
                match st.kind {
                    TokenKind::Comment | TokenKind::Newline => self.prelude.push(st.source),
                    TokenKind::ByteOrderMark | TokenKind::Space => {}
                    kind => self.diagnostics.error(
                        &st,
                        ErrorKind::UnexpectedToken,
                        format!("Unsupported token {kind}"),
                    ),
                }
                None
            }
            Token::Error(err) => {
                let message = if err.source.is_empty() {
                    err.message.clone()
                } else {
                    format!("{}: {:?}", err.message, err.source)
                };
                let diagnostic = Diagnostic::new(
                    ErrorKind::UnexpectedToken,
                    ErrorPos::from(&Token::Error(err)).to_span(),
                    message,
                );
                match &mut self.doc {
                    Some(doc) if !self.at_directives => doc.errors.push(diagnostic),
                    _ => self.diagnostics.errors.push(diagnostic),
                }
                None
            }
            Token::DocEnd(doc_end) => {
                let Some(mut doc) = self.doc.take() else {
                    self.diagnostics.error(
                        &Token::DocEnd(doc_end),
                        ErrorKind::UnexpectedToken,
                        "Unexpected doc-end without preceding document",
                    );
                    return None;
                };
                let end = resolve_end(
                    doc_end.end.as_deref(),
                    doc_end.offset + doc_end.source.len(),
                    self.options.strict,
                    &mut self.diagnostics,
                );
                doc = self.decorate(doc, true);
                if !end.comment.is_empty() {
                    append_comment(&mut doc.comment, &end.comment);
                }
                doc.range.node_end = end.offset;
                self.doc = Some(doc);
                None
            }
            other => {
                self.diagnostics.error(
                    &other,
                    ErrorKind::UnexpectedToken,
                    format!("Unsupported token {}", other.type_name()),
                );
                None
            }
        }
    }

    /// Finish the stream. With `force_doc`, an empty document is produced if
    /// the stream had none, so that stream-level errors are not lost.
    pub fn end(&mut self, force_doc: bool, end_offset: usize) -> Option<Document> {
        if let Some(doc) = self.doc.take() {
            return Some(self.decorate(doc, true));
        }
        if !force_doc {
            return None;
        }
        let directives = self.directives.at_document(self.options.carry_directives);
        if self.at_directives {
            self.diagnostics.error(
                end_offset,
                ErrorKind::MissingChar,
                "Missing directives-end indicator line",
            );
        }
        let doc = Document {
            tags: directives.tags,
            directives: directives.entries,
            ..Document::empty(directives.version, end_offset)
        };
        Some(self.decorate(doc, false))
    }

    /// Errors and warnings not yet attached to a document.
    #[must_use]
    pub fn pending_errors(&self) -> &[Diagnostic] {
        &self.diagnostics.errors
    }

    fn doc_schema(&self, version: Version) -> Schema {
        if version == Version::V1_1 && self.options.compat.is_none() && self.schema.kind != SchemaKind::Yaml11 {
            self.schema.clone().with_compat(SchemaKind::Yaml11)
        } else {
            self.schema.clone()
        }
    }

    fn compose_doc(&mut self, token: &cst::Document) -> Document {
        let mut directives = self.directives.at_document(self.options.carry_directives);
        let schema = self.doc_schema(directives.version);
        let cst::Document {
            offset,
            start,
            value,
            end,
        } = token;
        let value = value.as_deref();

        let mut composer = DocComposer::new(&self.options, &schema, &directives, &mut self.diagnostics);
        let props = resolve_props(
            start,
            PropsContext {
                flow: None,
                indicator: TokenKind::DocStart,
                next: Next::of(value, end.as_deref()),
                offset: *offset,
                parent_indent: 0,
                start_on_newline: true,
            },
            composer.diagnostics,
        );
        let doc_start = props.found.is_some();
        if doc_start
            && matches!(value, Some(Token::BlockMap(_) | Token::BlockSeq(_)))
            && !props.has_newline
        {
            composer.diagnostics.error(
                props.end,
                ErrorKind::MissingChar,
                "Block collection cannot start on same line with directives-end marker",
            );
        }
        let contents = match value {
            Some(value) => composer.compose_node(value, &props),
            None => composer.compose_empty_node(props.end, Some(start), None, &props),
        };
        let anchors = composer.into_anchors();

        let content_end = contents.range.node_end;
        let re = resolve_end(end.as_deref(), content_end, false, &mut self.diagnostics);
        directives.doc_start = doc_start;
        debug!(
            "Composed document at {offset} with {} nodes and {} anchors",
            contents.node_count(),
            anchors.len()
        );
        Document {
            contents: Some(contents),
            version: directives.version,
            tags: directives.tags,
            directives: directives.entries,
            directives_end_marker: doc_start,
            anchors,
            errors: Vec::new(),
            warnings: Vec::new(),
            comment_before: None,
            comment: (!re.comment.is_empty()).then_some(re.comment),
            range: NodeRange::new(*offset, content_end, re.offset),
        }
    }

    /// Attach the pending prologue comment and diagnostics to `doc`.
    fn decorate(&mut self, mut doc: Document, after_doc: bool) -> Document {
        let Prelude {
            comment,
            after_empty_line,
        } = parse_prelude(&self.prelude);
        if !comment.is_empty() {
            if after_doc {
                append_comment(&mut doc.comment, &comment);
            } else if after_empty_line || doc.directives_end_marker || doc.contents.is_none() {
                doc.comment_before = Some(comment);
            } else if let Some(contents) = &mut doc.contents {
                let first = match &mut contents.content {
                    Content::Mapping(map) if !map.flow => map.items.first_mut().map(|pair| &mut pair.key),
                    Content::Sequence(seq) if !seq.flow => seq.items.first_mut(),
                    _ => None,
                };
                match first {
                    Some(first) => prepend_comment(&mut first.comment_before, &comment),
                    None => prepend_comment(&mut contents.comment_before, &comment),
                }
            }
        }
        let Diagnostics { errors, warnings } = self.diagnostics.take();
        if after_doc {
            doc.errors.extend(errors);
            doc.warnings.extend(warnings);
        } else {
            doc.errors = errors;
            doc.warnings = warnings;
        }
        self.prelude.clear();
        doc
    }
}

/// Compose CST tokens into documents with a fresh [`Composer`].
#[must_use]
pub fn compose(tokens: impl IntoIterator<Item = Token>, options: &Options) -> Vec<Document> {
    Composer::new(options).compose(tokens, false, 0)
}
