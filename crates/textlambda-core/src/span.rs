//! Source location tracking for error reporting.
//!
//! Every token, AST node and compile error carries a [`Span`] so that a
//! failure can be reported as `line:col` against the expression text.

use std::fmt;

/// A region of expression source.
///
/// Lines and columns are 1-indexed; columns count characters. `offset` is
/// the byte offset of the first character from the start of the source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset from the start of the source.
    pub offset: u32,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, in characters).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(offset: u32, line: u32, col: u32, len: u32) -> Self {
        Self {
            offset,
            line,
            col,
            len,
        }
    }

    /// A zero-length span, used for the end-of-input sentinel.
    #[inline]
    pub fn point(offset: u32, line: u32, col: u32) -> Self {
        Self::new(offset, line, col, 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset one past the last covered byte.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// The result keeps the line/column of whichever span starts first.
    pub fn to(self, other: Span) -> Span {
        let (first, last) = if other.offset < self.offset {
            (other, self)
        } else {
            (self, other)
        };
        Span {
            offset: first.offset,
            line: first.line,
            col: first.col,
            len: last.end().max(first.end()) - first.offset,
        }
    }

    /// The source text this span covers, if it lies within `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.offset as usize..self.end() as usize)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}
