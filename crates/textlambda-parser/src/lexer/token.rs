//! Token types and definitions for the expression lexer.

use std::fmt;

use textlambda_core::{Decimal, Span, Value};

/// A token from the expression text.
///
/// The `'ast` lifetime refers to the arena holding the lexeme. For string
/// and character literals the lexeme is the decoded body, not the quoted
/// source text.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
    /// Decoded value of a `Number` token.
    pub number: Option<NumberLiteral>,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            span,
            number: None,
        }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// A numeric literal after suffix interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
}

impl NumberLiteral {
    pub fn to_value(self) -> Value {
        match self {
            NumberLiteral::Int(v) => Value::Int(v),
            NumberLiteral::UInt(v) => Value::UInt(v),
            NumberLiteral::Long(v) => Value::Long(v),
            NumberLiteral::ULong(v) => Value::ULong(v),
            NumberLiteral::Float(v) => Value::Float(v),
            NumberLiteral::Double(v) => Value::Double(v),
            NumberLiteral::Decimal(v) => Value::Decimal(v),
        }
    }
}

/// All token types of the expression language.
///
/// Operators that the grammar rejects (assignment, increment, `->`) are
/// still lexed so that they can be reported precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `1.5`, `10L`, `2.5m`
    Number,
    /// `"text"`, `@"verbatim"`
    String,
    /// `'c'`
    Char,

    Identifier,

    // =========================================
    // Keywords
    // =========================================
    True,
    False,
    Null,
    New,
    TypeOf,
    SizeOf,
    Is,
    As,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Colon,
    Semicolon,
    /// `=>`
    FatArrow,
    /// `->`
    Arrow,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    LessLess,
    GreaterGreater,
    EqualEqual,
    BangEqual,
    Question,
    QuestionQuestion,
    PlusPlus,
    MinusMinus,

    // =========================================
    // Assignment (lexed, never accepted)
    // =========================================
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    QuestionQuestionEqual,

    Eof,
}

impl TokenKind {
    /// Source spelling for symbols and keywords; a category name otherwise.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            String => "string literal",
            Char => "character literal",
            Identifier => "identifier",
            True => "true",
            False => "false",
            Null => "null",
            New => "new",
            TypeOf => "typeof",
            SizeOf => "sizeof",
            Is => "is",
            As => "as",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftBrace => "{",
            RightBrace => "}",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            Semicolon => ";",
            FatArrow => "=>",
            Arrow => "->",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            Bang => "!",
            AmpAmp => "&&",
            PipePipe => "||",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            LessLess => "<<",
            GreaterGreater => ">>",
            EqualEqual => "==",
            BangEqual => "!=",
            Question => "?",
            QuestionQuestion => "??",
            PlusPlus => "++",
            MinusMinus => "--",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            AmpEqual => "&=",
            PipeEqual => "|=",
            CaretEqual => "^=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            QuestionQuestionEqual => "??=",
            Eof => "end of input",
        }
    }

    /// Assignment in any form.
    pub fn is_assignment(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Equal
                | PlusEqual
                | MinusEqual
                | StarEqual
                | SlashEqual
                | PercentEqual
                | AmpEqual
                | PipeEqual
                | CaretEqual
                | LessLessEqual
                | GreaterGreaterEqual
                | QuestionQuestionEqual
        )
    }

    pub fn is_closing_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords of the expression language. Primitive aliases (`int`,
/// `double`, ...) are ordinary identifiers resolved as type names.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "new" => TokenKind::New,
        "typeof" => TokenKind::TypeOf,
        "sizeof" => TokenKind::SizeOf,
        "is" => TokenKind::Is,
        "as" => TokenKind::As,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(lookup_keyword("typeof"), Some(TokenKind::TypeOf));
        assert_eq!(lookup_keyword("as"), Some(TokenKind::As));
        assert_eq!(lookup_keyword("int"), None);
        assert_eq!(lookup_keyword("Typeof"), None);
    }

    #[test]
    fn assignment_kinds() {
        assert!(TokenKind::Equal.is_assignment());
        assert!(TokenKind::QuestionQuestionEqual.is_assignment());
        assert!(!TokenKind::EqualEqual.is_assignment());
    }

    #[test]
    fn number_literal_values() {
        assert_eq!(NumberLiteral::Long(10).to_value(), Value::Long(10));
        assert_eq!(NumberLiteral::Double(1.5).to_value(), Value::Double(1.5));
    }
}
