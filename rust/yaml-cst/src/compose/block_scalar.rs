// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Decoding of literal (`|`) and folded (`>`) block scalars.

use super::Diagnostics;
use super::flow_scalar::ScalarText;
use super::props::{COMMENT_SPACE_MSG, comment_body};
use crate::cst::{BlockScalar, Token};
use crate::document::{NodeRange, ScalarStyle};
use crate::error::ErrorKind;
use crate::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Clip,
    Strip,
    Keep,
}

#[derive(Debug)]
struct Header {
    folded: bool,
    /// Explicit indentation indicator, 0 if absent.
    indent: usize,
    chomp: Chomp,
    comment: String,
    /// Length of the header line, up to the body.
    length: usize,
}

fn parse_header(scalar: &BlockScalar, strict: bool, diagnostics: &mut Diagnostics) -> Option<Header> {
    let Some(Token::Source(header)) = scalar.props.first() else {
        diagnostics.error(scalar.offset, ErrorKind::Impossible, "Block scalar header not found");
        return None;
    };
    if header.kind != TokenKind::BlockScalarHeader {
        diagnostics.error(header, ErrorKind::Impossible, "Block scalar header not found");
        return None;
    }

    let source = header.source.as_str();
    let mut indent = 0;
    let mut chomp = None;
    let mut error = None;
    for (idx, ch) in source.char_indices().skip(1) {
        match ch {
            '-' | '+' if chomp.is_none() => {
                chomp = Some(if ch == '-' { Chomp::Strip } else { Chomp::Keep });
            }
            '1'..='9' if indent == 0 => indent = ch as usize - '0' as usize,
            _ => {
                error.get_or_insert(scalar.offset + idx);
            }
        }
    }
    if let Some(error) = error {
        diagnostics.error(
            error,
            ErrorKind::UnexpectedToken,
            format!("Block scalar header includes extra characters: {source}"),
        );
    }

    let mut has_space = false;
    let mut comment = String::new();
    let mut length = source.len();
    for token in scalar.props.iter().skip(1) {
        match token {
            Token::Source(st) => {
                match st.kind {
                    TokenKind::Space => has_space = true,
                    TokenKind::Newline => {}
                    TokenKind::Comment => {
                        if strict && !has_space {
                            diagnostics.error(st, ErrorKind::MissingChar, COMMENT_SPACE_MSG);
                        }
                        comment = comment_body(&st.source).to_owned();
                    }
                    kind => diagnostics.error(
                        st,
                        ErrorKind::UnexpectedToken,
                        format!("Unexpected token in block scalar header: {kind}"),
                    ),
                }
                length += st.source.len();
            }
            Token::Error(err) => {
                diagnostics.error(
                    [err.offset, err.offset + err.source.len()],
                    ErrorKind::UnexpectedToken,
                    err.message.clone(),
                );
                length += err.source.len();
            }
            other => {
                diagnostics.error(
                    other.offset(),
                    ErrorKind::UnexpectedToken,
                    format!("Unexpected token in block scalar header: {}", other.type_name()),
                );
                length += crate::cst::stringify(other).len();
            }
        }
    }
    Some(Header {
        folded: source.starts_with('>'),
        indent,
        chomp: chomp.unwrap_or(Chomp::Clip),
        comment,
        length,
    })
}

/// Split a body into `(indentation, content)` pairs, one per line.
fn split_lines(source: &str) -> Vec<(&str, &str)> {
    source
        .split('\n')
        .map(|line| {
            let content = line.trim_start_matches(' ');
            line.split_at(line.len() - content.len())
        })
        .collect()
}

fn is_empty_line(content: &str) -> bool {
    content.is_empty() || content == "\r"
}

#[allow(clippy::too_many_lines, reason = "Indentation detection, folding and chomping")]
pub(crate) fn resolve_block_scalar(
    scalar: &BlockScalar,
    strict: bool,
    at_root: bool,
    diagnostics: &mut Diagnostics,
) -> ScalarText {
    let start = scalar.offset;
    let Some(header) = parse_header(scalar, strict, diagnostics) else {
        return ScalarText {
            value: String::new(),
            style: None,
            comment: String::new(),
            range: NodeRange::new(start, start, start),
        };
    };
    let style = if header.folded {
        ScalarStyle::BlockFolded
    } else {
        ScalarStyle::BlockLiteral
    };
    let end = start + header.length + scalar.source.len();
    let lines = if scalar.source.is_empty() {
        Vec::new()
    } else {
        split_lines(&scalar.source)
    };

    // Trailing empty lines are subject to chomping.
    let mut chomp_start = lines.len();
    for (idx, (_, content)) in lines.iter().enumerate().rev() {
        if is_empty_line(content) {
            chomp_start = idx;
        } else {
            break;
        }
    }

    if chomp_start == 0 {
        let value = if header.chomp == Chomp::Keep && !lines.is_empty() {
            "\n".repeat(lines.len().saturating_sub(1).max(1))
        } else {
            String::new()
        };
        return ScalarText {
            value,
            style: Some(style),
            comment: header.comment,
            range: NodeRange::new(start, end, end),
        };
    }

    // Detect the content indentation from the first non-empty line.
    let mut trim_indent = scalar.indent + header.indent;
    let mut offset = scalar.offset + header.length;
    let mut content_start = 0;
    for (idx, (indent, content)) in lines.iter().enumerate().take(chomp_start) {
        if is_empty_line(content) {
            if header.indent == 0 && indent.len() > trim_indent {
                trim_indent = indent.len();
            }
        } else {
            if indent.len() < trim_indent {
                diagnostics.error(
                    offset + indent.len(),
                    ErrorKind::MissingChar,
                    "Block scalars with more-indented leading empty lines must use an explicit indentation indicator",
                );
            }
            if header.indent == 0 {
                trim_indent = indent.len();
            }
            content_start = idx;
            if trim_indent == 0 && !at_root {
                diagnostics.error(
                    offset,
                    ErrorKind::BadIndent,
                    "Block scalar values in collections must be indented",
                );
            }
            break;
        }
        offset += indent.len() + content.len() + 1;
    }

    // More-indented trailing empty lines are content.
    for idx in (chomp_start..lines.len()).rev() {
        if lines.get(idx).is_some_and(|(indent, _)| indent.len() > trim_indent) {
            chomp_start = idx + 1;
        }
    }

    let trimmed = |indent: &str| indent.get(trim_indent..).unwrap_or_default().to_owned();
    let mut value = String::new();
    let mut sep = "";
    let mut prev_more_indented = false;
    for (indent, _) in lines.iter().take(content_start) {
        value.push_str(&trimmed(indent));
        value.push('\n');
    }
    for (indent, content) in lines.iter().take(chomp_start).skip(content_start) {
        offset += indent.len() + content.len() + 1;
        let crlf = content.ends_with('\r');
        let content = content.strip_suffix('\r').unwrap_or(content);
        let mut indent = *indent;
        if !content.is_empty() && indent.len() < trim_indent {
            let src = if header.indent > 0 {
                "explicit indentation indicator"
            } else {
                "first line"
            };
            diagnostics.error(
                offset - content.len() - if crlf { 2 } else { 1 },
                ErrorKind::BadIndent,
                format!("Block scalar lines must not be less indented than their {src}"),
            );
            indent = "";
        }
        if !header.folded {
            value.push_str(sep);
            value.push_str(&trimmed(indent));
            value.push_str(content);
            sep = "\n";
        } else if indent.len() > trim_indent || content.starts_with('\t') {
            // More-indented lines keep their line breaks.
            if sep == " " {
                sep = "\n";
            } else if !prev_more_indented && sep == "\n" {
                sep = "\n\n";
            }
            value.push_str(sep);
            value.push_str(&trimmed(indent));
            value.push_str(content);
            sep = "\n";
            prev_more_indented = true;
        } else if content.is_empty() {
            if sep == "\n" {
                value.push('\n');
            } else {
                sep = "\n";
            }
        } else {
            value.push_str(sep);
            value.push_str(content);
            sep = " ";
            prev_more_indented = false;
        }
    }

    match header.chomp {
        Chomp::Strip => {}
        Chomp::Keep => {
            for (indent, _) in lines.iter().skip(chomp_start) {
                value.push('\n');
                value.push_str(&trimmed(indent));
            }
            if !value.ends_with('\n') {
                value.push('\n');
            }
        }
        Chomp::Clip => value.push('\n'),
    }

    ScalarText {
        value,
        style: Some(style),
        comment: header.comment,
        range: NodeRange::new(start, end, end),
    }
}
