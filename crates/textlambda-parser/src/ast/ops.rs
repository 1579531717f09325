//! Operator definitions and the precedence table.
//!
//! [`precedence`] is the only place binding strength is decided; the
//! precedence-climbing loop consults it for every operator it sees. Higher
//! numbers bind tighter, and the loop only consumes an operator whose
//! precedence is strictly greater than the current minimum, so every binary
//! level is left-associative.

use std::fmt;

use crate::lexer::TokenKind;

/// Whether a symbol is being looked up where an operand is expected
/// (prefix) or after one (infix/postfix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    Infix,
}

/// Grouping, invocation and indexing.
pub const PREC_PRIMARY: u8 = 100;
/// Member access, `new`, `typeof`, postfix `++`/`--`, `->`.
pub const PREC_POSTFIX: u8 = 13;
/// Prefix `+ - ! ~`, casts, `sizeof`, prefix `++`/`--`.
pub const PREC_UNARY: u8 = 12;
pub const PREC_MULTIPLICATIVE: u8 = 11;
pub const PREC_ADDITIVE: u8 = 10;
pub const PREC_SHIFT: u8 = 9;
/// Relational operators plus `is` and `as`.
pub const PREC_RELATIONAL: u8 = 8;
pub const PREC_EQUALITY: u8 = 7;
pub const PREC_BITWISE: u8 = 6;
/// `&&`, `||` and the conditional `?`.
pub const PREC_LOGICAL: u8 = 5;
/// `??` and every assignment form.
pub const PREC_ASSIGNMENT: u8 = 4;

/// Precedence of `kind` in the given position, or `None` when the symbol is
/// not an operator there. Separators (`,` `:` `;`), closing brackets and
/// end of input have no infix precedence and stop the loop.
pub fn precedence(kind: TokenKind, fixity: Fixity) -> Option<u8> {
    use TokenKind::*;
    match fixity {
        Fixity::Prefix => match kind {
            LeftParen => Some(PREC_UNARY),
            Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus | SizeOf => Some(PREC_UNARY),
            New | TypeOf => Some(PREC_POSTFIX),
            _ => None,
        },
        Fixity::Infix => match kind {
            LeftParen | LeftBracket => Some(PREC_PRIMARY),
            Dot | Arrow | PlusPlus | MinusMinus => Some(PREC_POSTFIX),
            Star | Slash | Percent => Some(PREC_MULTIPLICATIVE),
            Plus | Minus => Some(PREC_ADDITIVE),
            LessLess | GreaterGreater => Some(PREC_SHIFT),
            Less | Greater | LessEqual | GreaterEqual | Is | As => Some(PREC_RELATIONAL),
            EqualEqual | BangEqual => Some(PREC_EQUALITY),
            Amp | Caret | Pipe => Some(PREC_BITWISE),
            AmpAmp | PipePipe | Question => Some(PREC_LOGICAL),
            QuestionQuestion => Some(PREC_ASSIGNMENT),
            k if k.is_assignment() => Some(PREC_ASSIGNMENT),
            _ => None,
        },
    }
}

/// Binary operators that build a [`Binary`](super::ExprKind::Binary) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitOr,
    BitXor,
    /// `&&`, short-circuiting
    And,
    /// `||`, short-circuiting
    Or,
}

impl BinaryOp {
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Rem,
            LessLess => BinaryOp::Shl,
            GreaterGreater => BinaryOp::Shr,
            Less => BinaryOp::Less,
            Greater => BinaryOp::Greater,
            LessEqual => BinaryOp::LessEqual,
            GreaterEqual => BinaryOp::GreaterEqual,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            Amp => BinaryOp::BitAnd,
            Pipe => BinaryOp::BitOr,
            Caret => BinaryOp::BitXor,
            AmpAmp => BinaryOp::And,
            PipePipe => BinaryOp::Or,
            _ => return None,
        })
    }

    /// `+ - * / %`, the operators subject to numeric promotion.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators. Unary `+` is accepted but builds no node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!b` on bool
    Not,
    /// `~n` or `!n` on an integer
    BitNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        })
    }
}

/// `is` / `as`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTestOp {
    Is,
    As,
}
