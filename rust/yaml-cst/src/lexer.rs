// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Context-aware YAML lexer.
//!
//! Splits the input into lexemes: exact slices of the source plus the
//! sentinels from [`crate::token`]. Concatenating all non-sentinel lexemes
//! reproduces the input.
//!
//! The lexer tracks:
//! - the indentation required for the next line to continue a scalar,
//! - the flow depth (inside `{}`/`[]`, `,` and brackets are delimiters and
//!   newlines do not end a construct),
//! - whether a `:` directly after the previous token is a value indicator
//!   (after a quoted scalar or a closing bracket in flow context).
//!
//! Input may arrive in chunks. When the buffered input ends in a construct
//! that might still extend and more input may follow, the lexer stops and
//! keeps the unconsumed tail until [`Lexer::feed`] is called again.

use std::collections::VecDeque;

use log::trace;

use crate::token::{BOM, DOCUMENT, FLOW_END, SCALAR};

/// Lexer state, as reached after the previous lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stream,
    LineStart,
    BlockStart,
    Doc,
    Flow,
    QuotedScalar,
    BlockScalar,
    PlainScalar,
}

fn is_empty(ch: Option<u8>) -> bool {
    matches!(ch, None | Some(b' ' | b'\n' | b'\r' | b'\t'))
}

fn is_flow_indicator(ch: Option<u8>) -> bool {
    matches!(ch, Some(b',' | b'[' | b']' | b'{' | b'}'))
}

fn is_not_anchor_char(ch: Option<u8>) -> bool {
    matches!(
        ch,
        None | Some(b' ' | b',' | b'[' | b']' | b'{' | b'}' | b'\n' | b'\r' | b'\t')
    )
}

fn is_tag_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            b'-' | b'#'
                | b';'
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'&'
                | b'='
                | b'+'
                | b'$'
                | b'_'
                | b'.'
                | b'!'
                | b'~'
                | b'*'
                | b'\''
                | b'('
                | b')'
        )
}

fn is_hex(ch: Option<u8>) -> bool {
    ch.is_some_and(|ch| ch.is_ascii_hexdigit())
}

/// Length in bytes of the UTF-8 sequence starting with `lead`.
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Pull-based YAML lexer.
///
/// Feed input with [`Lexer::feed`], then iterate to pull lexemes. With
/// `is_end_of_input = false` the iterator ends early when the remaining
/// buffer could still be extended by the next chunk.
#[derive(Debug, Default)]
pub struct Lexer {
    /// No more input will be fed.
    at_end: bool,
    /// Explicit block scalar indentation indicator, minus one.
    block_scalar_indent: Option<usize>,
    /// The current block scalar has the `+` chomping indicator.
    block_scalar_keep: bool,
    /// Unconsumed input.
    buffer: String,
    /// After a quoted scalar or a flow collection end, a following `:` is an
    /// indicator even when not followed by whitespace.
    flow_key: bool,
    /// Count of open flow collections.
    flow_level: usize,
    /// Minimum indentation for the next line of the current scalar.
    indent_next: usize,
    /// Indentation of the current line, including block indicators.
    indent_value: usize,
    /// State to resume from on the next feed.
    next: Option<State>,
    /// State of the active run; `None` when stopped.
    running: Option<State>,
    /// Position of the next unconsumed byte in `buffer`.
    pos: usize,
    /// Lexemes produced but not yet pulled.
    queue: VecDeque<String>,
}

impl Lexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` to the buffered input.
    ///
    /// Pass `is_end_of_input = true` with the final chunk (which may be empty)
    /// so that trailing partial constructs are flushed.
    pub fn feed(&mut self, chunk: &str, is_end_of_input: bool) {
        self.buffer.push_str(chunk);
        self.at_end = is_end_of_input;
        self.running = Some(self.next.take().unwrap_or(State::Stream));
    }

    fn byte(&self, idx: usize) -> Option<u8> {
        self.buffer.as_bytes().get(idx).copied()
    }

    /// Byte at a possibly negative index (negative indices are out of range).
    fn byte_at(&self, idx: isize) -> Option<u8> {
        usize::try_from(idx).ok().and_then(|idx| self.byte(idx))
    }

    fn char_at(&self, n: usize) -> Option<u8> {
        self.byte(self.pos + n)
    }

    fn has_chars(&self, n: usize) -> bool {
        self.pos + n <= self.buffer.len()
    }

    fn starts_with_at(&self, idx: usize, marker: &[u8]) -> bool {
        self.buffer
            .as_bytes()
            .get(idx..)
            .is_some_and(|rest| rest.starts_with(marker))
    }

    fn find_from(&self, from: usize, needle: u8) -> Option<usize> {
        self.buffer
            .as_bytes()
            .get(from..)?
            .iter()
            .position(|ch| *ch == needle)
            .map(|idx| idx + from)
    }

    /// Suspend in `state` until more input arrives.
    fn set_next(&mut self, state: State) -> Option<State> {
        self.buffer.drain(..self.pos);
        self.pos = 0;
        self.next = Some(state);
        trace!(
            "lexer waiting for input in {state:?} with {} buffered bytes",
            self.buffer.len()
        );
        None
    }

    /// Length of the current line (excluding the line break), or `None` when
    /// the line is not complete yet.
    fn get_line(&self) -> Option<usize> {
        match self.find_from(self.pos, b'\n') {
            None => self.at_end.then(|| self.buffer.len() - self.pos),
            Some(mut end) => {
                if end > self.pos && self.byte(end - 1) == Some(b'\r') {
                    end -= 1;
                }
                Some(end - self.pos)
            }
        }
    }

    fn line_byte(&self, line_start: usize, line_len: usize, n: usize) -> Option<u8> {
        if n < line_len {
            self.byte(line_start + n)
        } else {
            None
        }
    }

    fn at_line_end(&self) -> bool {
        let mut idx = self.pos;
        while matches!(self.byte(idx), Some(b' ' | b'\t')) {
            idx += 1;
        }
        match self.byte(idx) {
            None | Some(b'#' | b'\n') => true,
            Some(b'\r') => self.byte(idx + 1) == Some(b'\n'),
            _ => false,
        }
    }

    /// Where the scalar continues on the line starting at `offset`, or `None`
    /// if that line ends it.
    fn continue_scalar(&self, offset: usize) -> Option<usize> {
        let mut ch = self.byte(offset);
        if self.indent_next > 0 {
            let mut indent = 0;
            while ch == Some(b' ') {
                indent += 1;
                ch = self.byte(offset + indent);
            }
            if ch == Some(b'\r') {
                let next = self.byte(offset + indent + 1);
                if next == Some(b'\n') || (next.is_none() && !self.at_end) {
                    return Some(offset + indent + 1);
                }
            }
            return (ch == Some(b'\n')
                || indent >= self.indent_next
                || (ch.is_none() && !self.at_end))
                .then_some(offset + indent);
        }
        if matches!(ch, Some(b'-' | b'.'))
            && (self.starts_with_at(offset, b"---") || self.starts_with_at(offset, b"..."))
            && is_empty(self.byte(offset + 3))
        {
            return None;
        }
        Some(offset)
    }

    fn parse_next(&mut self, state: State) -> Option<State> {
        match state {
            State::Stream => self.parse_stream(),
            State::LineStart => self.parse_line_start(),
            State::BlockStart => self.parse_block_start(),
            State::Doc => self.parse_document(),
            State::Flow => self.parse_flow_collection(),
            State::QuotedScalar => self.parse_quoted_scalar(),
            State::BlockScalar => self.parse_block_scalar(),
            State::PlainScalar => self.parse_plain_scalar(),
        }
    }

    fn parse_stream(&mut self) -> Option<State> {
        let Some(mut line_len) = self.get_line() else {
            return self.set_next(State::Stream);
        };
        if self.starts_with_at(self.pos, BOM.as_bytes()) {
            self.push_count(BOM.len());
            line_len -= BOM.len();
        }
        let line_start = self.pos;
        if self.byte(line_start) == Some(b'%') {
            let line = self
                .buffer
                .as_bytes()
                .get(line_start..line_start + line_len)
                .unwrap_or_default();
            let mut dir_end = line_len;
            let mut comment = line.iter().position(|ch| *ch == b'#');
            while let Some(cs) = comment {
                if cs > 0 && matches!(line.get(cs - 1), Some(b' ' | b'\t')) {
                    dir_end = cs - 1;
                    break;
                }
                comment = line
                    .iter()
                    .skip(cs + 1)
                    .position(|ch| *ch == b'#')
                    .map(|idx| idx + cs + 1);
            }
            while dir_end > 0 && matches!(line.get(dir_end - 1), Some(b' ' | b'\t')) {
                dir_end -= 1;
            }
            let n = self.push_count(dir_end) + self.push_spaces(true);
            self.push_count(line_len - n);
            self.push_newline();
            return Some(State::Stream);
        }
        if self.at_line_end() {
            let spaces = self.push_spaces(true);
            self.push_count(line_len - spaces);
            self.push_newline();
            return Some(State::Stream);
        }
        self.queue.push_back(DOCUMENT.to_owned());
        self.parse_line_start()
    }

    fn parse_line_start(&mut self) -> Option<State> {
        // Indentation is only measured on whole lines.
        if self.get_line().is_none() {
            return self.set_next(State::LineStart);
        }
        let ch = self.char_at(0);
        if matches!(ch, Some(b'-' | b'.')) {
            if !self.at_end && !self.has_chars(4) {
                return self.set_next(State::LineStart);
            }
            let is_start = self.starts_with_at(self.pos, b"---");
            if (is_start || self.starts_with_at(self.pos, b"...")) && is_empty(self.char_at(3)) {
                self.push_count(3);
                self.indent_value = 0;
                self.indent_next = 0;
                return Some(if is_start { State::Doc } else { State::Stream });
            }
        }
        self.indent_value = self.push_spaces(false);
        if self.indent_next > self.indent_value && !is_empty(self.char_at(1)) {
            self.indent_next = self.indent_value;
        }
        self.parse_block_start()
    }

    fn parse_block_start(&mut self) -> Option<State> {
        let ch0 = self.char_at(0);
        let ch1 = self.char_at(1);
        if ch1.is_none() && !self.at_end {
            return self.set_next(State::BlockStart);
        }
        if matches!(ch0, Some(b'-' | b'?' | b':')) && is_empty(ch1) {
            let n = self.push_count(1) + self.push_spaces(true);
            self.indent_next = self.indent_value + 1;
            self.indent_value += n;
            return self.parse_block_start();
        }
        Some(State::Doc)
    }

    fn parse_document(&mut self) -> Option<State> {
        if self.get_line().is_none() {
            return self.set_next(State::Doc);
        }
        self.push_spaces(true);
        let Some(line_len) = self.get_line() else {
            return self.set_next(State::Doc);
        };
        let line_start = self.pos;
        let mut n = self.push_indicators();
        match self.line_byte(line_start, line_len, n) {
            Some(b'#') => {
                self.push_count(line_len - n);
                self.push_newline();
                self.parse_line_start()
            }
            None => {
                self.push_newline();
                self.parse_line_start()
            }
            Some(b'{' | b'[') => {
                self.push_count(1);
                self.flow_key = false;
                self.flow_level = 1;
                Some(State::Flow)
            }
            Some(b'}' | b']') => {
                // A closing bracket without a matching opening one
                self.push_count(1);
                Some(State::Doc)
            }
            Some(b'*') => {
                self.push_until(is_not_anchor_char);
                Some(State::Doc)
            }
            Some(b'"' | b'\'') => self.parse_quoted_scalar(),
            Some(b'|' | b'>') => {
                n += self.parse_block_scalar_header();
                n += self.push_spaces(true);
                self.push_count(line_len.saturating_sub(n));
                self.push_newline();
                self.parse_block_scalar()
            }
            Some(_) => self.parse_plain_scalar(),
        }
    }

    fn parse_flow_collection(&mut self) -> Option<State> {
        if !self.at_end {
            let mut idx = self.pos;
            while matches!(self.byte(idx), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                idx += 1;
            }
            if self.find_from(idx, b'\n').is_none() {
                return self.set_next(State::Flow);
            }
        }
        let mut indent = None;
        loop {
            let nl = self.push_newline();
            let mut spaces = 0;
            if nl > 0 {
                spaces = self.push_spaces(false);
                self.indent_value = spaces;
                indent = Some(spaces);
            }
            spaces += self.push_spaces(true);
            if nl + spaces == 0 {
                break;
            }
        }
        let Some(line_len) = self.get_line() else {
            return self.set_next(State::Flow);
        };
        let line_start = self.pos;
        let first = self.line_byte(line_start, line_len, 0);
        let under_indented = indent.is_some_and(|indent| indent < self.indent_next);
        let doc_marker = indent == Some(0)
            && (self.starts_with_at(line_start, b"---") || self.starts_with_at(line_start, b"..."))
            && is_empty(self.line_byte(line_start, line_len, 3));
        if (under_indented && first != Some(b'#')) || doc_marker {
            // Allow a closing bracket or separator of a top-level flow
            // collection one column left of its content.
            let at_flow_end_marker = indent.is_some()
                && indent == self.indent_next.checked_sub(1)
                && self.flow_level == 1
                && matches!(first, Some(b']' | b'}' | b','));
            if !at_flow_end_marker {
                self.flow_level = 0;
                self.queue.push_back(FLOW_END.to_owned());
                return self.parse_line_start();
            }
        }
        let mut n = 0;
        while self.line_byte(line_start, line_len, n) == Some(b',') {
            n += self.push_count(1);
            n += self.push_spaces(true);
            self.flow_key = false;
        }
        n += self.push_indicators();
        match self.line_byte(line_start, line_len, n) {
            None => Some(State::Flow),
            Some(b'#') => {
                self.push_count(line_len - n);
                Some(State::Flow)
            }
            Some(b'{' | b'[') => {
                self.push_count(1);
                self.flow_key = false;
                self.flow_level += 1;
                Some(State::Flow)
            }
            Some(b'}' | b']') => {
                self.push_count(1);
                self.flow_key = true;
                self.flow_level = self.flow_level.saturating_sub(1);
                Some(if self.flow_level > 0 {
                    State::Flow
                } else {
                    State::Doc
                })
            }
            Some(b'*') => {
                self.push_until(is_not_anchor_char);
                Some(State::Flow)
            }
            Some(b'"' | b'\'') => {
                self.flow_key = true;
                self.parse_quoted_scalar()
            }
            Some(b':')
                if self.flow_key
                    || is_empty(self.char_at(1))
                    || self.char_at(1) == Some(b',') =>
            {
                self.flow_key = false;
                self.push_count(1);
                self.push_spaces(true);
                Some(State::Flow)
            }
            Some(_) => {
                self.flow_key = false;
                self.parse_plain_scalar()
            }
        }
    }

    fn parse_quoted_scalar(&mut self) -> Option<State> {
        let quote = self.char_at(0).unwrap_or(b'"');
        let mut end = self.find_from(self.pos + 1, quote);
        if quote == b'\'' {
            while let Some(idx) = end {
                if self.byte(idx + 1) != Some(b'\'') {
                    break;
                }
                end = self.find_from(idx + 2, b'\'');
            }
        } else {
            while let Some(idx) = end {
                let mut backslashes = 0;
                while idx > backslashes && self.byte(idx - 1 - backslashes) == Some(b'\\') {
                    backslashes += 1;
                }
                if backslashes % 2 == 0 {
                    break;
                }
                end = self.find_from(idx + 1, b'"');
            }
        }
        // A line that cannot continue the scalar terminates it early.
        if let Some(limit) = end {
            let find_nl = |from: usize| {
                self.find_from(from, b'\n')
                    .filter(|idx| *idx < limit)
            };
            let mut nl = find_nl(self.pos);
            while let Some(idx) = nl {
                let Some(cs) = self.continue_scalar(idx + 1) else {
                    break;
                };
                nl = find_nl(cs);
            }
            if let Some(idx) = nl {
                let cr = idx > 0 && self.byte(idx - 1) == Some(b'\r');
                end = Some(idx - if cr { 2 } else { 1 });
            }
        }
        let end = match end {
            Some(end) => end + 1,
            None if !self.at_end => return self.set_next(State::QuotedScalar),
            None => self.buffer.len(),
        };
        self.push_to_index(end, false);
        Some(if self.flow_level > 0 {
            State::Flow
        } else {
            State::Doc
        })
    }

    fn parse_block_scalar_header(&mut self) -> usize {
        self.block_scalar_indent = None;
        self.block_scalar_keep = false;
        let mut idx = self.pos;
        loop {
            idx += 1;
            match self.byte(idx) {
                Some(b'+') => self.block_scalar_keep = true,
                Some(digit @ b'1'..=b'9') => {
                    self.block_scalar_indent = Some(usize::from(digit - b'0') - 1);
                }
                Some(b'-') => {}
                _ => break,
            }
        }
        self.push_until(|ch| is_empty(ch) || ch == Some(b'#'))
    }

    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "Buffer offsets are far below isize::MAX; -1 marks 'before the buffer'"
    )]
    fn parse_block_scalar(&mut self) -> Option<State> {
        let mut nl = self.pos as isize - 1;
        let mut indent = 0;
        let mut idx = self.pos;
        let mut ch;
        loop {
            ch = self.byte(idx);
            match ch {
                Some(b' ') => indent += 1,
                Some(b'\n') => {
                    nl = idx as isize;
                    indent = 0;
                }
                Some(b'\r') => {
                    let next = self.byte(idx + 1);
                    if next.is_none() && !self.at_end {
                        return self.set_next(State::BlockScalar);
                    }
                    if next != Some(b'\n') {
                        break;
                    }
                }
                _ => break,
            }
            idx += 1;
        }
        if ch.is_none() && !self.at_end {
            return self.set_next(State::BlockScalar);
        }
        if indent >= self.indent_next {
            self.indent_next = match self.block_scalar_indent {
                None => indent,
                Some(explicit) => explicit + self.indent_next.max(1),
            };
            loop {
                let Some(cs) = self.continue_scalar((nl + 1) as usize) else {
                    break;
                };
                match self.find_from(cs, b'\n') {
                    Some(next_nl) => nl = next_nl as isize,
                    None => {
                        nl = -1;
                        break;
                    }
                }
            }
            if nl == -1 {
                if !self.at_end {
                    return self.set_next(State::BlockScalar);
                }
                nl = self.buffer.len() as isize;
            }
        }
        // Trailing blank lines belong to the scalar only with `+` chomping,
        // or when a tab makes them ambiguous.
        let mut idx = (nl + 1) as usize;
        let mut ch = self.byte(idx);
        while ch == Some(b' ') {
            idx += 1;
            ch = self.byte(idx);
        }
        if ch == Some(b'\t') {
            while matches!(ch, Some(b'\t' | b' ' | b'\r' | b'\n')) {
                idx += 1;
                ch = self.byte(idx);
            }
            nl = idx as isize - 1;
        } else if !self.block_scalar_keep {
            loop {
                let mut back = nl - 1;
                let mut ch = self.byte_at(back);
                if ch == Some(b'\r') {
                    back -= 1;
                    ch = self.byte_at(back);
                }
                let last_char = back;
                while ch == Some(b' ') {
                    back -= 1;
                    ch = self.byte_at(back);
                }
                if ch == Some(b'\n')
                    && back >= self.pos as isize
                    && back + 1 + indent as isize > last_char
                {
                    nl = back;
                } else {
                    break;
                }
            }
        }
        self.queue.push_back(SCALAR.to_owned());
        self.push_to_index(((nl + 1) as usize).min(self.buffer.len()), true);
        self.parse_line_start()
    }

    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "Buffer offsets are far below isize::MAX; -1 marks 'before the buffer'"
    )]
    fn parse_plain_scalar(&mut self) -> Option<State> {
        let in_flow = self.flow_level > 0;
        let mut end = self.pos as isize - 1;
        let mut idx = self.pos as isize - 1;
        let mut ch;
        loop {
            idx += 1;
            ch = self.byte_at(idx);
            let Some(mut cur) = ch else {
                break;
            };
            if cur == b':' {
                let next = self.byte_at(idx + 1);
                if is_empty(next) || (in_flow && is_flow_indicator(next)) {
                    break;
                }
                end = idx;
            } else if is_empty(Some(cur)) {
                let mut next = self.byte_at(idx + 1);
                if cur == b'\r' {
                    if next == Some(b'\n') {
                        idx += 1;
                        cur = b'\n';
                        next = self.byte_at(idx + 1);
                    } else {
                        end = idx;
                    }
                }
                if next == Some(b'#') || (in_flow && is_flow_indicator(next)) {
                    break;
                }
                if cur == b'\n' {
                    let Some(cs) = self.continue_scalar((idx + 1) as usize) else {
                        break;
                    };
                    idx = idx.max(cs as isize - 2);
                }
            } else {
                if in_flow && is_flow_indicator(Some(cur)) {
                    break;
                }
                idx += utf8_len(cur) as isize - 1;
                end = idx;
            }
        }
        if ch.is_none() && !self.at_end {
            return self.set_next(State::PlainScalar);
        }
        self.queue.push_back(SCALAR.to_owned());
        self.push_to_index(((end + 1) as usize).min(self.buffer.len()), true);
        Some(if in_flow { State::Flow } else { State::Doc })
    }

    fn push_count(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let end = (self.pos + n).min(self.buffer.len());
        let lexeme = self.buffer.get(self.pos..end).unwrap_or_default().to_owned();
        self.queue.push_back(lexeme);
        let n = end - self.pos;
        self.pos = end;
        n
    }

    fn push_to_index(&mut self, idx: usize, allow_empty: bool) -> usize {
        let lexeme = self.buffer.get(self.pos..idx).unwrap_or_default();
        if !lexeme.is_empty() {
            let len = lexeme.len();
            self.queue.push_back(lexeme.to_owned());
            self.pos += len;
            return len;
        }
        if allow_empty {
            self.queue.push_back(String::new());
        }
        0
    }

    fn push_indicators(&mut self) -> usize {
        match self.char_at(0) {
            Some(b'!') => self.push_tag() + self.push_spaces(true) + self.push_indicators(),
            Some(b'&') => {
                self.push_until(is_not_anchor_char) + self.push_spaces(true) + self.push_indicators()
            }
            Some(b'-' | b'?' | b':') => {
                let in_flow = self.flow_level > 0;
                let ch1 = self.char_at(1);
                if !(is_empty(ch1) || (in_flow && is_flow_indicator(ch1))) {
                    return 0;
                }
                if !in_flow {
                    self.indent_next = self.indent_value + 1;
                } else if self.flow_key {
                    self.flow_key = false;
                }
                self.push_count(1) + self.push_spaces(true) + self.push_indicators()
            }
            _ => 0,
        }
    }

    fn push_tag(&mut self) -> usize {
        if self.char_at(1) == Some(b'<') {
            let mut idx = self.pos + 2;
            while !is_empty(self.byte(idx)) && self.byte(idx) != Some(b'>') {
                idx += 1;
            }
            let end = if self.byte(idx) == Some(b'>') {
                idx + 1
            } else {
                idx
            };
            return self.push_to_index(end, false);
        }
        let mut idx = self.pos + 1;
        loop {
            match self.byte(idx) {
                Some(ch) if is_tag_char(ch) => idx += 1,
                Some(b'%') if is_hex(self.byte(idx + 1)) && is_hex(self.byte(idx + 2)) => idx += 3,
                _ => break,
            }
        }
        self.push_to_index(idx, false)
    }

    fn push_newline(&mut self) -> usize {
        match (self.char_at(0), self.char_at(1)) {
            (Some(b'\n'), _) => self.push_count(1),
            (Some(b'\r'), Some(b'\n')) => self.push_count(2),
            _ => 0,
        }
    }

    fn push_spaces(&mut self, allow_tabs: bool) -> usize {
        let mut idx = self.pos;
        while matches!(self.byte(idx), Some(b' ')) || (allow_tabs && self.byte(idx) == Some(b'\t'))
        {
            idx += 1;
        }
        let n = idx - self.pos;
        if n > 0 {
            self.push_count(n);
        }
        n
    }

    fn push_until(&mut self, test: impl Fn(Option<u8>) -> bool) -> usize {
        let mut idx = self.pos;
        while !test(self.byte(idx)) {
            idx += 1;
        }
        self.push_to_index(idx, false)
    }
}

impl Iterator for Lexer {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(lexeme) = self.queue.pop_front() {
                return Some(lexeme);
            }
            let state = self.running?;
            if self.at_end && !self.has_chars(1) {
                self.running = None;
                return None;
            }
            self.running = self.parse_next(state);
        }
    }
}

/// Lex a complete input into lexemes.
#[must_use]
pub fn lex(source: &str) -> Vec<String> {
    let mut lexer = Lexer::new();
    lexer.feed(source, true);
    lexer.collect()
}
