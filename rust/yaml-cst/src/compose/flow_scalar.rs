// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Decoding of plain, single-quoted and double-quoted scalars.

use super::Diagnostics;
use super::props::resolve_end;
use crate::cst::FlowScalar;
use crate::document::{NodeRange, ScalarStyle};
use crate::error::ErrorKind;
use crate::token::TokenKind;

/// The decoded text of a scalar and where it sits.
#[derive(Debug, Clone)]
pub(crate) struct ScalarText {
    pub value: String,
    pub style: Option<ScalarStyle>,
    pub comment: String,
    pub range: NodeRange,
}

pub(crate) fn resolve_flow_scalar(
    scalar: &FlowScalar,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> ScalarText {
    let FlowScalar {
        kind,
        offset,
        source,
        end,
        ..
    } = scalar;
    let offset = *offset;
    let (value, style) = match kind {
        TokenKind::Scalar => (plain_value(source, offset, diagnostics), ScalarStyle::Plain),
        TokenKind::SingleQuotedScalar => (
            single_quoted_value(source, offset, diagnostics),
            ScalarStyle::QuoteSingle,
        ),
        TokenKind::DoubleQuotedScalar => (
            double_quoted_value(source, offset, diagnostics),
            ScalarStyle::QuoteDouble,
        ),
        kind => {
            diagnostics.error(
                [offset, offset + source.len()],
                ErrorKind::UnexpectedToken,
                format!("Expected a flow scalar value, but found: {kind}"),
            );
            let value_end = offset + source.len();
            return ScalarText {
                value: String::new(),
                style: None,
                comment: String::new(),
                range: NodeRange::new(offset, value_end, value_end),
            };
        }
    };
    let value_end = offset + source.len();
    let end = resolve_end(end.as_deref(), value_end, strict, diagnostics);
    ScalarText {
        value,
        style: Some(style),
        comment: end.comment,
        range: NodeRange::new(offset, value_end, end.offset),
    }
}

fn plain_value(source: &str, offset: usize, diagnostics: &mut Diagnostics) -> String {
    let bad_char = match source.chars().next() {
        Some('\t') => Some("a tab character".to_owned()),
        Some(',') => Some("flow indicator character ,".to_owned()),
        Some('%') => Some("directive indicator character %".to_owned()),
        Some(ch @ ('|' | '>')) => Some(format!("block scalar indicator {ch}")),
        Some(ch @ ('@' | '`')) => Some(format!("reserved character {ch}")),
        _ => None,
    };
    if let Some(bad_char) = bad_char {
        diagnostics.error(
            offset,
            ErrorKind::BadScalarStart,
            format!("Plain value cannot start with {bad_char}"),
        );
    }
    fold_lines(source)
}

fn single_quoted_value(source: &str, offset: usize, diagnostics: &mut Diagnostics) -> String {
    let closed = source.len() > 1 && source.ends_with('\'');
    if !closed {
        diagnostics.error(
            offset + source.len(),
            ErrorKind::MissingChar,
            "Missing closing 'quote",
        );
    }
    let body = source.get(1..source.len() - usize::from(closed)).unwrap_or_default();
    fold_lines(body).replace("''", "'")
}

/// Fold line breaks: a single one becomes a space, `n` of them `n - 1`
/// newlines. White space around each break is dropped.
fn fold_lines(source: &str) -> String {
    if !source.contains('\n') {
        return source.to_owned();
    }
    let blank = [' ', '\t'];
    let lines: Vec<&str> = source.split('\n').collect();
    let Some((last, rest)) = lines.split_last() else {
        return source.to_owned();
    };
    let Some((first, middle)) = rest.split_first() else {
        return source.to_owned();
    };
    let strip_cr = |line: &str| line.strip_suffix('\r').unwrap_or(line).to_owned();

    let mut res = strip_cr(*first).trim_end_matches(blank).to_owned();
    let mut sep = " ";
    for &line in middle {
        let line = strip_cr(line);
        let line = line.trim_matches(blank);
        if line.is_empty() {
            if sep == "\n" {
                res.push('\n');
            } else {
                sep = "\n";
            }
        } else {
            res.push_str(sep);
            res.push_str(line);
            sep = " ";
        }
    }
    res.push_str(sep);
    res.push_str(last.trim_start_matches(blank));
    res
}

fn escape_code(ch: char) -> Option<&'static str> {
    let code = match ch {
        '0' => "\0",
        'a' => "\u{7}",
        'b' => "\u{8}",
        'e' => "\u{1b}",
        'f' => "\u{c}",
        'n' => "\n",
        'r' => "\r",
        't' | '\t' => "\t",
        'v' => "\u{b}",
        'N' => "\u{85}",
        '_' => "\u{a0}",
        'L' => "\u{2028}",
        'P' => "\u{2029}",
        ' ' => " ",
        '"' => "\"",
        '/' => "/",
        '\\' => "\\",
        _ => return None,
    };
    Some(code)
}

#[allow(clippy::too_many_lines, reason = "Escape handling in one character loop")]
fn double_quoted_value(source: &str, offset: usize, diagnostics: &mut Diagnostics) -> String {
    let closed = source.len() > 1 && source.ends_with('"');
    let body_end = source.len() - usize::from(closed);
    let chars: Vec<(usize, char)> = source
        .char_indices()
        .filter(|(idx, _)| *idx > 0 && *idx < body_end)
        .collect();
    let at = |idx: usize| chars.get(idx).map(|(_, ch)| *ch);
    let is_blank = |ch: Option<char>| matches!(ch, Some(' ' | '\t'));

    let mut res = String::new();
    let mut idx = 0;
    while let Some(&(pos, ch)) = chars.get(idx) {
        match ch {
            '\r' if at(idx + 1) == Some('\n') => {}
            '\n' => {
                // Fold the line break and any blank lines after it.
                let mut fold = String::new();
                while let Some(next) = at(idx + 1) {
                    match next {
                        '\r' if at(idx + 2) != Some('\n') => break,
                        '\n' => fold.push('\n'),
                        ' ' | '\t' | '\r' => {}
                        _ => break,
                    }
                    idx += 1;
                }
                if fold.is_empty() {
                    fold.push(' ');
                }
                res.push_str(&fold);
            }
            '\\' => {
                idx += 1;
                let next = at(idx);
                let hex_len = match next {
                    Some('x') => 2,
                    Some('u') => 4,
                    Some('U') => 8,
                    _ => 0,
                };
                if let Some(code) = next.and_then(escape_code) {
                    res.push_str(code);
                } else if next == Some('\n') || (next == Some('\r') && at(idx + 1) == Some('\n')) {
                    // An escaped line break joins the lines without space.
                    if next == Some('\r') {
                        idx += 1;
                    }
                    while is_blank(at(idx + 1)) {
                        idx += 1;
                    }
                } else if hex_len > 0 {
                    let len = hex_len;
                    let start = chars.get(idx + 1).map_or(body_end, |(p, _)| *p);
                    let end = chars.get(idx + 1 + len).map_or(body_end, |(p, _)| *p);
                    let digits = &source[start..end];
                    let decoded = (digits.len() == len && digits.bytes().all(|b| b.is_ascii_hexdigit()))
                        .then(|| u32::from_str_radix(digits, 16).ok())
                        .flatten()
                        .and_then(char::from_u32);
                    if let Some(decoded) = decoded {
                        res.push(decoded);
                    } else {
                        let raw = &source[pos..end];
                        diagnostics.error(
                            offset + pos,
                            ErrorKind::BadDqEscape,
                            format!("Invalid escape sequence {raw}"),
                        );
                        res.push_str(raw);
                    }
                    idx += len;
                } else {
                    let raw: String = std::iter::once('\\').chain(next).collect();
                    diagnostics.error(
                        offset + pos,
                        ErrorKind::BadDqEscape,
                        format!("Invalid escape sequence {raw}"),
                    );
                    res.push_str(&raw);
                }
            }
            ' ' | '\t' => {
                // Trailing white space before a line break is dropped.
                let ws_start = idx;
                while is_blank(at(idx + 1)) {
                    idx += 1;
                }
                let next = at(idx + 1);
                let at_break =
                    next == Some('\n') || (next == Some('\r') && at(idx + 2) == Some('\n'));
                if !at_break {
                    res.extend(chars[ws_start..=idx].iter().map(|(_, ch)| *ch));
                }
            }
            _ => res.push(ch),
        }
        idx += 1;
    }
    if !closed {
        diagnostics.error(
            offset + source.len(),
            ErrorKind::MissingChar,
            "Missing closing \"quote",
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(kind: TokenKind, source: &str) -> FlowScalar {
        FlowScalar {
            kind,
            offset: 0,
            indent: 0,
            source: source.to_owned(),
            end: None,
        }
    }

    fn decode(kind: TokenKind, source: &str) -> (String, Diagnostics) {
        let mut diagnostics = Diagnostics::default();
        let text = resolve_flow_scalar(&scalar(kind, source), true, &mut diagnostics);
        (text.value, diagnostics)
    }

    #[test]
    fn test_plain_folding() {
        assert_eq!(decode(TokenKind::Scalar, "a\n  b").0, "a b");
        assert_eq!(decode(TokenKind::Scalar, "a  \n\n  b").0, "a\nb");
        assert_eq!(decode(TokenKind::Scalar, "a\n\n\nb").0, "a\n\nb");
        assert_eq!(decode(TokenKind::Scalar, "plain").0, "plain");
    }

    #[test]
    fn test_plain_bad_start() {
        let (_, diagnostics) = decode(TokenKind::Scalar, "@x");
        assert_eq!(diagnostics.errors[0].kind, ErrorKind::BadScalarStart);
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(decode(TokenKind::SingleQuotedScalar, "'it''s'").0, "it's");
        assert_eq!(decode(TokenKind::SingleQuotedScalar, "'a\n  b'").0, "a b");
        let (value, diagnostics) = decode(TokenKind::SingleQuotedScalar, "'open");
        assert_eq!(value, "open");
        assert_eq!(diagnostics.errors[0].kind, ErrorKind::MissingChar);
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, r#""a\tb\n""#).0, "a\tb\n");
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, r#""\x41é\U0001F600""#).0, "Aé😀");
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, "\"a \\\n   b\"").0, "a b");
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, "\"a\\\n   b\"").0, "ab");
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, "\"a  \n  b\"").0, "a b");
        assert_eq!(decode(TokenKind::DoubleQuotedScalar, "\"a\n\n  b\"").0, "a\nb");
    }

    #[test]
    fn test_double_quoted_bad_escape() {
        let (value, diagnostics) = decode(TokenKind::DoubleQuotedScalar, r#""\q\xZZ""#);
        assert_eq!(value, r"\q\xZZ");
        let kinds: Vec<ErrorKind> = diagnostics.errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::BadDqEscape, ErrorKind::BadDqEscape]);
        assert_eq!(diagnostics.errors[1].span.start, 3);
    }
}
