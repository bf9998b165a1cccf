// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Span types for tracking source locations.

use chumsky::span::SimpleSpan;
use chumsky::span::Span as _;

/// A span representing a range in the source code.
///
/// This is an alias for chumsky's `SimpleSpan`, which tracks byte offsets.
/// The span is a half-open range `[start, end)`.
pub type Span = SimpleSpan<usize>;

/// Build a span from a byte range.
#[must_use]
pub fn span(start: usize, end: usize) -> Span {
    Span::new((), start..end.max(start))
}

/// A one-based line and column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

/// Records line start offsets as the parser reports newlines, and maps byte
/// offsets back to line/column positions.
#[derive(Debug, Clone, Default)]
pub struct LineCounter {
    line_starts: Vec<usize>,
}

impl LineCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the offset at which a new line starts.
    pub fn add_new_line(&mut self, offset: usize) {
        if self.line_starts.last().is_none_or(|last| *last < offset) {
            self.line_starts.push(offset);
        }
    }

    /// Number of line starts seen so far.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`, with both line and column counted from 1.
    #[must_use]
    pub fn line_pos(&self, offset: usize) -> Position {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => Position {
                line: idx + 1,
                col: 1,
            },
            Err(0) => Position {
                line: 0,
                col: offset + 1,
            },
            Err(idx) => {
                let start = self.line_starts.get(idx - 1).copied().unwrap_or_default();
                Position {
                    line: idx,
                    col: offset - start + 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_helper() {
        let sp = span(3, 7);
        assert_eq!(sp.start, 3);
        assert_eq!(sp.end, 7);
        // End never precedes start.
        assert_eq!(span(5, 2).end, 5);
    }

    #[test]
    fn test_line_counter() {
        let mut lc = LineCounter::new();
        for offset in [0, 4, 9] {
            lc.add_new_line(offset);
        }
        assert_eq!(lc.lines(), 3);
        assert_eq!(lc.line_pos(0), Position { line: 1, col: 1 });
        assert_eq!(lc.line_pos(6), Position { line: 2, col: 3 });
        assert_eq!(lc.line_pos(12), Position { line: 3, col: 4 });
    }
}
