//! Backtrackable view over the lexed token buffer.

use textlambda_core::{CompileError, Span};

use super::token::{Token, TokenKind};

/// A saved stream position, restored to undo a tentative parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    split: bool,
    prev: Span,
}

/// Cursor over an immutable, `Eof`-terminated token slice.
///
/// Closing nested type arguments (`List<List<int>>`) needs `>>` to act as
/// two `>` tokens; [`split_shift`](Self::split_shift) consumes the first
/// half and leaves a synthesized `>` in its place. The split is part of the
/// [`Mark`], so restoring undoes it.
pub struct TokenStream<'ast> {
    tokens: &'ast [Token<'ast>],
    pos: usize,
    split: bool,
    prev: Span,
}

impl<'ast> TokenStream<'ast> {
    pub fn new(tokens: &'ast [Token<'ast>]) -> Self {
        debug_assert!(tokens.last().is_some_and(|t| t.kind == TokenKind::Eof));
        Self {
            tokens,
            pos: 0,
            split: false,
            prev: Span::default(),
        }
    }

    fn token_at(&self, index: usize) -> Token<'ast> {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens
            .get(index.min(last))
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Span::default()))
    }

    /// The next token, not consumed.
    pub fn peek(&self) -> Token<'ast> {
        let token = self.token_at(self.pos);
        if self.split {
            let mut span = token.span;
            span.offset += 1;
            span.col += 1;
            span.len = 1;
            Token::new(TokenKind::Greater, ">", span)
        } else {
            token
        }
    }

    /// The token `n` places ahead (0 = next), not consumed.
    pub fn peek_nth(&self, n: usize) -> Token<'ast> {
        if n == 0 {
            self.peek()
        } else {
            self.token_at(self.pos + n)
        }
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume and return the next token. `Eof` is never consumed past.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        self.prev = token.span;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        self.split = false;
        token
    }

    /// Consume the next token if it is `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind` if present. When it is absent, a `required` symbol is a
    /// syntax error; an optional one reports `false`.
    pub fn expect(&mut self, kind: TokenKind, required: bool) -> Result<bool, CompileError> {
        if self.eat(kind) {
            return Ok(true);
        }
        if required {
            let found = self.peek();
            return Err(CompileError::syntax(
                found.span,
                format!("expected '{}', found '{}'", kind, describe(&found)),
            ));
        }
        Ok(false)
    }

    /// Treat a pending `>>` as two `>` tokens and consume the first.
    pub fn split_shift(&mut self) -> bool {
        if !self.split && self.peek().kind == TokenKind::GreaterGreater {
            let mut span = self.peek().span;
            span.len = 1;
            self.prev = span;
            self.split = true;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn save(&self) -> Mark {
        Mark {
            pos: self.pos,
            split: self.split,
            prev: self.prev,
        }
    }

    #[inline]
    pub fn restore(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.split = mark.split;
        self.prev = mark.prev;
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        self.prev
    }

    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }
}

/// How a token reads in an error message.
pub fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Eof => TokenKind::Eof.as_str().to_string(),
        TokenKind::String => format!("\"{}\"", token.lexeme),
        TokenKind::Char => format!("'{}'", token.lexeme),
        _ => token.lexeme.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn save_and_restore_rewind() {
        let arena = Bump::new();
        let tokens = Lexer::new("a + b", &arena).tokenize().unwrap();
        let mut stream = TokenStream::new(tokens);
        let mark = stream.save();
        assert_eq!(stream.advance().lexeme, "a");
        assert_eq!(stream.advance().kind, TokenKind::Plus);
        stream.restore(mark);
        assert_eq!(stream.peek().lexeme, "a");
    }

    #[test]
    fn eof_is_sticky() {
        let arena = Bump::new();
        let tokens = Lexer::new("x", &arena).tokenize().unwrap();
        let mut stream = TokenStream::new(tokens);
        stream.advance();
        assert!(stream.is_at_end());
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.peek_nth(3).kind, TokenKind::Eof);
    }

    #[test]
    fn expect_reports_the_found_token() {
        let arena = Bump::new();
        let tokens = Lexer::new("a : b", &arena).tokenize().unwrap();
        let mut stream = TokenStream::new(tokens);
        stream.advance();
        assert_eq!(stream.expect(TokenKind::Comma, false), Ok(false));
        let err = stream.expect(TokenKind::RightParen, true).unwrap_err();
        assert!(err.to_string().contains("expected ')'"));
        assert_eq!(stream.expect(TokenKind::Colon, true), Ok(true));
    }

    #[test]
    fn shift_splits_into_two_closers() {
        let arena = Bump::new();
        let tokens = Lexer::new(">> x", &arena).tokenize().unwrap();
        let mut stream = TokenStream::new(tokens);
        let mark = stream.save();
        assert!(stream.split_shift());
        assert_eq!(stream.peek().kind, TokenKind::Greater);
        assert_eq!(stream.peek().span.col, 2);
        assert_eq!(stream.advance().kind, TokenKind::Greater);
        assert_eq!(stream.peek().lexeme, "x");

        stream.restore(mark);
        assert_eq!(stream.peek().kind, TokenKind::GreaterGreater);
    }
}
