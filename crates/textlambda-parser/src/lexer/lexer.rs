//! Main lexer implementation.
//!
//! The [`Lexer`] converts expression text into [`Token`]s, dispatching on
//! the first character of each token. Lexemes are copied into the arena, so
//! the token buffer outlives the borrowed source.
//!
//! Lexing is fail-fast: the first malformed literal or stray character ends
//! the scan with a [`LexError`].

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use textlambda_core::{Decimal, LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{NumberLiteral, Token, TokenKind, lookup_keyword};

pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
}

/// Position of the first character of the token being scanned.
#[derive(Clone, Copy)]
struct Start {
    offset: u32,
    line: u32,
    col: u32,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
        }
    }

    /// Lex the whole input into an arena slice terminated by an `Eof` token.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn tokenize(mut self) -> Result<&'ast [Token<'ast>], LexError> {
        let mut tokens = BumpVec::new_in(self.arena);
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                return Ok(tokens.into_bump_slice());
            }
        }
    }

    /// Scan the next token; `Eof` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token<'ast>, LexError> {
        self.skip_trivia()?;
        let start = self.start();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start.offset, start.line, start.col),
            ));
        };

        match c {
            '"' => self.scan_string(start),
            '\'' => self.scan_char(start),
            '@' => self.scan_at(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            c if is_ident_start(c) => Ok(self.scan_identifier(start)),
            _ => self.scan_operator(start),
        }
    }

    fn start(&self) -> Start {
        Start {
            offset: self.cursor.offset(),
            line: self.cursor.line(),
            col: self.cursor.column(),
        }
    }

    fn span_from(&self, start: Start) -> Span {
        Span::new(
            start.offset,
            start.line,
            start.col,
            self.cursor.offset() - start.offset,
        )
    }

    /// Token whose lexeme is the source text it covers.
    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.span_from(start))
    }

    // =========================================
    // Whitespace and comments
    // =========================================

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if self.cursor.check_str("//") {
                self.cursor.eat_while(|c| c != '\n');
            } else if self.cursor.check_str("/*") {
                let start = self.start();
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.is_eof() {
                        return Err(LexError::UnterminatedComment {
                            span: self.span_from(start),
                        });
                    }
                    if self.cursor.check_str("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                return Ok(());
            }
        }
    }

    // =========================================
    // Strings and characters
    // =========================================

    fn scan_string(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        self.cursor.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(LexError::UnterminatedString {
                        span: self.span_from(start),
                    });
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => text.push(self.scan_escape()?),
                Some(c) => {
                    self.cursor.advance();
                    text.push(c);
                }
            }
        }
        Ok(self.literal_token(TokenKind::String, &text, start))
    }

    /// `@"..."` verbatim string, or `@name` verbatim identifier.
    fn scan_at(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        self.cursor.advance(); // '@'
        if self.cursor.check(is_ident_start) {
            let name = self.cursor.eat_while(is_ident_continue);
            let lexeme = self.arena.alloc_str(name);
            return Ok(Token::new(TokenKind::Identifier, lexeme, self.span_from(start)));
        }
        if !self.cursor.eat('"') {
            return Err(LexError::UnexpectedChar {
                ch: '@',
                span: self.span_from(start),
            });
        }
        let mut text = String::new();
        loop {
            match self.cursor.advance() {
                None => {
                    return Err(LexError::UnterminatedString {
                        span: self.span_from(start),
                    });
                }
                Some('"') if self.cursor.eat('"') => text.push('"'),
                Some('"') => break,
                Some(c) => text.push(c),
            }
        }
        Ok(self.literal_token(TokenKind::String, &text, start))
    }

    fn scan_char(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        self.cursor.advance(); // opening quote
        let mut chars = Vec::with_capacity(1);
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(LexError::UnterminatedChar {
                        span: self.span_from(start),
                    });
                }
                Some('\'') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => chars.push(self.scan_escape()?),
                Some(c) => {
                    self.cursor.advance();
                    chars.push(c);
                }
            }
        }
        if chars.len() != 1 {
            return Err(LexError::InvalidChar {
                span: self.span_from(start),
            });
        }
        let text: String = chars.into_iter().collect();
        Ok(self.literal_token(TokenKind::Char, &text, start))
    }

    fn literal_token(&self, kind: TokenKind, decoded: &str, start: Start) -> Token<'ast> {
        Token::new(kind, self.arena.alloc_str(decoded), self.span_from(start))
    }

    /// Decode one escape sequence; the cursor is on the backslash.
    fn scan_escape(&mut self) -> Result<char, LexError> {
        let start = self.start();
        self.cursor.advance(); // '\'
        let invalid = |lexer: &Self, escape: String| LexError::InvalidEscape {
            escape,
            span: lexer.span_from(start),
        };
        let Some(c) = self.cursor.advance() else {
            return Err(LexError::UnterminatedString {
                span: self.span_from(start),
            });
        };
        Ok(match c {
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            'u' | 'x' | 'U' => {
                let (min, max) = match c {
                    'u' => (4, 4),
                    'x' => (1, 4),
                    _ => (8, 8),
                };
                let mut digits = String::new();
                while digits.len() < max && self.cursor.check(|d| d.is_ascii_hexdigit()) {
                    digits.extend(self.cursor.advance());
                }
                if digits.len() < min {
                    return Err(invalid(self, format!("{c}{digits}")));
                }
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(self, format!("{c}{digits}")))?
            }
            other => return Err(invalid(self, other.to_string())),
        })
    }

    // =========================================
    // Numbers
    // =========================================

    fn scan_number(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        if self.cursor.check_str("0x") || self.cursor.check_str("0X") {
            return self.scan_hex_number(start);
        }

        let mut is_real = false;
        self.consume_digits();
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.consume_digits();
            is_real = true;
        }
        let mut has_exponent = false;
        if let Some('e' | 'E') = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if !self.cursor.check(|c| c.is_ascii_digit()) {
                return Err(self.invalid_number(start, "exponent has no digits"));
            }
            self.consume_digits();
            is_real = true;
            has_exponent = true;
        }

        let body: String = self
            .cursor
            .slice_from(start.offset)
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let suffix = self.cursor.eat_while(is_ident_continue);

        let number = match suffix {
            "" if is_real => body.parse().ok().map(NumberLiteral::Double),
            "" => match body.parse::<i64>() {
                Ok(v) => Some(i32::try_from(v).map_or(NumberLiteral::Long(v), NumberLiteral::Int)),
                Err(_) => return Err(self.invalid_number(start, "integer literal is too large")),
            },
            "d" | "D" => body.parse().ok().map(NumberLiteral::Double),
            "f" | "F" => body.parse().ok().map(NumberLiteral::Float),
            "m" | "M" => parse_decimal(&body, has_exponent).map(NumberLiteral::Decimal),
            _ if is_real => {
                return Err(self.invalid_number(start, "real literal cannot take an integer suffix"));
            }
            _ => match suffix.to_ascii_lowercase().as_str() {
                "l" => body.parse().ok().map(NumberLiteral::Long),
                "u" => body.parse::<u64>().ok().map(|v| {
                    u32::try_from(v).map_or(NumberLiteral::ULong(v), NumberLiteral::UInt)
                }),
                "ul" | "lu" => body.parse().ok().map(NumberLiteral::ULong),
                _ => return Err(self.invalid_number(start, "unknown suffix")),
            },
        };

        let number = number.ok_or_else(|| self.invalid_number(start, "value out of range"))?;
        let mut token = self.make_token(TokenKind::Number, start);
        token.number = Some(number);
        Ok(token)
    }

    fn scan_hex_number(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        self.cursor.advance(); // '0'
        self.cursor.advance(); // 'x'
        let digits: String = self
            .cursor
            .eat_while(|c| c.is_ascii_hexdigit() || c == '_')
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let suffix = self.cursor.eat_while(is_ident_continue).to_ascii_lowercase();
        if digits.is_empty() {
            return Err(self.invalid_number(start, "expected hex digits"));
        }
        let value = u64::from_str_radix(&digits, 16)
            .map_err(|_| self.invalid_number(start, "value out of range"))?;
        let number = match suffix.as_str() {
            "" => i32::try_from(value)
                .map(NumberLiteral::Int)
                .or_else(|_| u32::try_from(value).map(NumberLiteral::UInt))
                .or_else(|_| i64::try_from(value).map(NumberLiteral::Long))
                .unwrap_or(NumberLiteral::ULong(value)),
            "l" => NumberLiteral::Long(value as i64),
            "u" => u32::try_from(value).map_or(NumberLiteral::ULong(value), NumberLiteral::UInt),
            "ul" | "lu" => NumberLiteral::ULong(value),
            _ => return Err(self.invalid_number(start, "unknown suffix")),
        };
        let mut token = self.make_token(TokenKind::Number, start);
        token.number = Some(number);
        Ok(token)
    }

    fn consume_digits(&mut self) {
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
    }

    fn invalid_number(&self, start: Start, detail: &str) -> LexError {
        LexError::InvalidNumber {
            text: self.cursor.slice_from(start.offset).to_string(),
            detail: detail.to_string(),
            span: self.span_from(start),
        }
    }

    // =========================================
    // Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let ident = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(ident).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Operators
    // =========================================

    /// Scan an operator or punctuation token, longest match first.
    fn scan_operator(&mut self, start: Start) -> Result<Token<'ast>, LexError> {
        let Some(c) = self.cursor.advance() else {
            return Ok(self.make_token(TokenKind::Eof, start));
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (',', _) => TokenKind::Comma,
            ('.', _) => TokenKind::Dot,
            (':', _) => TokenKind::Colon,
            (';', _) => TokenKind::Semicolon,
            ('~', _) => TokenKind::Tilde,

            ('+', Some('+')) => { self.cursor.advance(); TokenKind::PlusPlus }
            ('+', Some('=')) => { self.cursor.advance(); TokenKind::PlusEqual }
            ('+', _) => TokenKind::Plus,

            ('-', Some('-')) => { self.cursor.advance(); TokenKind::MinusMinus }
            ('-', Some('=')) => { self.cursor.advance(); TokenKind::MinusEqual }
            ('-', Some('>')) => { self.cursor.advance(); TokenKind::Arrow }
            ('-', _) => TokenKind::Minus,

            ('*', Some('=')) => { self.cursor.advance(); TokenKind::StarEqual }
            ('*', _) => TokenKind::Star,
            ('/', Some('=')) => { self.cursor.advance(); TokenKind::SlashEqual }
            ('/', _) => TokenKind::Slash,
            ('%', Some('=')) => { self.cursor.advance(); TokenKind::PercentEqual }
            ('%', _) => TokenKind::Percent,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', Some('>')) => { self.cursor.advance(); TokenKind::FatArrow }
            ('=', _) => TokenKind::Equal,

            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('!', _) => TokenKind::Bang,

            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', Some('<')) => {
                self.cursor.advance();
                if self.cursor.eat('=') { TokenKind::LessLessEqual } else { TokenKind::LessLess }
            }
            ('<', _) => TokenKind::Less,

            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', Some('>')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::GreaterGreaterEqual
                } else {
                    TokenKind::GreaterGreater
                }
            }
            ('>', _) => TokenKind::Greater,

            ('&', Some('&')) => { self.cursor.advance(); TokenKind::AmpAmp }
            ('&', Some('=')) => { self.cursor.advance(); TokenKind::AmpEqual }
            ('&', _) => TokenKind::Amp,

            ('|', Some('|')) => { self.cursor.advance(); TokenKind::PipePipe }
            ('|', Some('=')) => { self.cursor.advance(); TokenKind::PipeEqual }
            ('|', _) => TokenKind::Pipe,

            ('^', Some('=')) => { self.cursor.advance(); TokenKind::CaretEqual }
            ('^', _) => TokenKind::Caret,

            ('?', Some('?')) => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    TokenKind::QuestionQuestionEqual
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            ('?', _) => TokenKind::Question,

            _ => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    span: self.span_from(start),
                });
            }
        };

        Ok(self.make_token(kind, start))
    }
}

fn parse_decimal(body: &str, has_exponent: bool) -> Option<Decimal> {
    if has_exponent {
        Decimal::from_scientific(body).ok()
    } else {
        body.parse().ok()
    }
}
