// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! A lossless YAML 1.1/1.2 processor with error recovery.
//!
//! Processing happens in stages, each usable on its own:
//! - the [`Lexer`] splits input, possibly fed in chunks, into lexemes,
//! - the [`Parser`] builds a concrete syntax tree ([`cst`]) that keeps every
//!   byte of the source, so [`cst::stringify`] reproduces it exactly,
//! - the [`Composer`] resolves scalars, tags and directives into
//!   [`Document`]s, recording problems instead of failing,
//! - [`Document::to_value`] materializes native [`Value`]s, resolving
//!   aliases and merge keys.
//!
//! # Example
//!
//! ```
//! use yaml_cst::{Options, Value, parse_document};
//!
//! let doc = parse_document("one: &a 42\ntwo: *a\n", &Options::default());
//! assert!(doc.errors.is_empty());
//!
//! let value = doc.to_value().unwrap();
//! assert_eq!(value.get("two"), Some(&Value::Int(42)));
//! ```

mod compose;
pub mod cst;
mod directives;
mod document;
mod error;
mod lexer;
mod materialize;
mod options;
mod parser;
pub mod schema;
mod span;
pub mod token;
mod value;

pub use compose::{Composer, compose};
pub use directives::Directives;
pub use document::{
    Content, DirectiveEntry, Document, Mapping, Node, NodeRange, Pair, Scalar, ScalarStyle,
    Sequence,
};
pub use error::{Diagnostic, ErrorKind, ErrorPos};
pub use lexer::{Lexer, lex};
pub use materialize::{DEFAULT_MAX_ALIAS_COUNT, ReferenceError};
pub use options::{Options, SchemaKind, Version};
pub use parser::{Parser, parse_cst};
pub use span::{LineCounter, Position, Span, span};
pub use value::Value;

use log::warn;

/// Failure of [`parse`]: the first composition error, or an alias that
/// could not be resolved.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::From, derive_more::Error)]
pub enum Error {
    #[display("{_0}")]
    Parse(Diagnostic),
    #[display("{_0}")]
    Reference(ReferenceError),
}

/// Documents of a stream, with the data gathered alongside them.
#[derive(Debug)]
pub struct ParsedStream {
    pub documents: Vec<Document>,
    /// Line starts, when [`Options::line_counter`] is set.
    pub line_counter: Option<LineCounter>,
    /// Problems in a stream without documents.
    pub errors: Vec<Diagnostic>,
}

fn new_parser(options: &Options) -> Parser {
    if options.line_counter {
        Parser::with_line_counter()
    } else {
        Parser::new()
    }
}

/// Parse every document of `source`.
#[must_use]
pub fn parse_stream(source: &str, options: &Options) -> ParsedStream {
    let mut parser = new_parser(options);
    parser.feed(source, true);
    let mut composer = Composer::new(options);
    let documents = composer.compose(parser.by_ref(), false, source.len());
    let errors = if documents.is_empty() {
        composer.pending_errors().to_vec()
    } else {
        Vec::new()
    };
    ParsedStream {
        documents,
        line_counter: parser.take_line_counter(),
        errors,
    }
}

/// Parse every document of `source`. An empty stream gives no documents.
#[must_use]
pub fn parse_all_documents(source: &str, options: &Options) -> Vec<Document> {
    parse_stream(source, options).documents
}

/// Parse a single document. An empty stream gives an empty document; any
/// document after the first is reported as `MULTIPLE_DOCS` on the first.
#[must_use]
pub fn parse_document(source: &str, options: &Options) -> Document {
    let mut parser = new_parser(options);
    parser.feed(source, true);
    let mut docs = Composer::new(options)
        .compose(parser.by_ref(), true, source.len())
        .into_iter();
    let mut doc = docs.next().unwrap_or_else(|| Document::empty(options.version, source.len()));
    if let Some(extra) = docs.next() {
        doc.errors.push(Diagnostic::new(
            ErrorKind::MultipleDocs,
            span(extra.range.start, extra.range.value_end),
            "Source contains multiple documents; please use parse_all_documents()",
        ));
    }
    doc
}

/// Parse a single document into a native value.
///
/// Warnings are logged; the first error fails the parse.
pub fn parse(source: &str) -> Result<Value, Error> {
    parse_with(source, &Options::default())
}

/// Like [`parse`], with explicit options.
pub fn parse_with(source: &str, options: &Options) -> Result<Value, Error> {
    let mut doc = parse_document(source, options);
    for warning in &doc.warnings {
        warn!("{warning}");
    }
    if !doc.errors.is_empty() {
        return Err(Error::Parse(doc.errors.swap_remove(0)));
    }
    Ok(doc.to_value_with(options.max_alias_count)?)
}

#[cfg(test)]
mod tests;
