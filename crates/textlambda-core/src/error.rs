//! Error types for every phase: lexing, compiling, registering and invoking.
//!
//! ```text
//! CompileError
//! ├── Lex               - malformed literal or unrecognised character
//! ├── Syntax            - expected symbol missing
//! ├── UnmatchedBracket  - closer does not match its opener, or never arrives
//! ├── UnknownConstruct  - token sequence outside the supported grammar
//! ├── TypeNotFound      - type name unresolved under every namespace
//! ├── MemberNotFound    - member, overload, constructor or indexer missing
//! ├── TypeMismatch      - operator or conversion not applicable
//! └── SignatureMismatch - lambda header disagrees with the target signature
//!
//! RuntimeError          - failures raised while a compiled function runs
//! NativeError           - failures raised by host callables
//! RegistrationError     - inconsistent registry contents
//! ```

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated character literal at {span}")]
    UnterminatedChar { span: Span },

    #[error("character literal must contain exactly one character at {span}")]
    InvalidChar { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("invalid escape sequence '\\{escape}' at {span}")]
    InvalidEscape { escape: String, span: Span },

    #[error("invalid number '{text}' at {span}: {detail}")]
    InvalidNumber {
        text: String,
        detail: String,
        span: Span,
    },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span }
            | LexError::InvalidChar { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Compile Errors
// ============================================================================

/// Fieldless discriminant of [`CompileError`], for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    Lex,
    Syntax,
    UnmatchedBracket,
    UnknownConstruct,
    TypeNotFound,
    MemberNotFound,
    TypeMismatch,
    SignatureMismatch,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompileErrorKind::Lex => "lex error",
            CompileErrorKind::Syntax => "syntax error",
            CompileErrorKind::UnmatchedBracket => "unmatched bracket",
            CompileErrorKind::UnknownConstruct => "unknown construct",
            CompileErrorKind::TypeNotFound => "type not found",
            CompileErrorKind::MemberNotFound => "member not found",
            CompileErrorKind::TypeMismatch => "type mismatch",
            CompileErrorKind::SignatureMismatch => "signature mismatch",
        };
        f.write_str(name)
    }
}

/// A positioned failure that aborted compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    #[error("unmatched bracket at {span}: {message}")]
    UnmatchedBracket { message: String, span: Span },

    #[error("unsupported construct '{text}' at {span}")]
    UnknownConstruct { text: String, span: Span },

    #[error("type '{name}' not found at {span}")]
    TypeNotFound { name: String, span: Span },

    #[error("'{member}' not found on '{owner}' at {span}")]
    MemberNotFound {
        owner: String,
        member: String,
        span: Span,
    },

    #[error("type mismatch at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    #[error("signature mismatch at {span}: {message}")]
    SignatureMismatch { message: String, span: Span },
}

impl CompileError {
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn unmatched(span: Span, message: impl Into<String>) -> Self {
        CompileError::UnmatchedBracket {
            message: message.into(),
            span,
        }
    }

    pub fn unknown(span: Span, text: impl Into<String>) -> Self {
        CompileError::UnknownConstruct {
            text: text.into(),
            span,
        }
    }

    pub fn type_not_found(span: Span, name: impl Into<String>) -> Self {
        CompileError::TypeNotFound {
            name: name.into(),
            span,
        }
    }

    pub fn member_not_found(span: Span, owner: impl fmt::Display, member: impl Into<String>) -> Self {
        CompileError::MemberNotFound {
            owner: owner.to_string(),
            member: member.into(),
            span,
        }
    }

    pub fn mismatch(span: Span, message: impl Into<String>) -> Self {
        CompileError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn signature(span: Span, message: impl Into<String>) -> Self {
        CompileError::SignatureMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> CompileErrorKind {
        match self {
            CompileError::Lex(_) => CompileErrorKind::Lex,
            CompileError::Syntax { .. } => CompileErrorKind::Syntax,
            CompileError::UnmatchedBracket { .. } => CompileErrorKind::UnmatchedBracket,
            CompileError::UnknownConstruct { .. } => CompileErrorKind::UnknownConstruct,
            CompileError::TypeNotFound { .. } => CompileErrorKind::TypeNotFound,
            CompileError::MemberNotFound { .. } => CompileErrorKind::MemberNotFound,
            CompileError::TypeMismatch { .. } => CompileErrorKind::TypeMismatch,
            CompileError::SignatureMismatch { .. } => CompileErrorKind::SignatureMismatch,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span(),
            CompileError::Syntax { span, .. }
            | CompileError::UnmatchedBracket { span, .. }
            | CompileError::UnknownConstruct { span, .. }
            | CompileError::TypeNotFound { span, .. }
            | CompileError::MemberNotFound { span, .. }
            | CompileError::TypeMismatch { span, .. }
            | CompileError::SignatureMismatch { span, .. } => *span,
        }
    }

    /// Render the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let span = self.span();
        let mut out = format!("error: {self}\n");
        if let Some(line) = source.lines().nth(span.line.saturating_sub(1) as usize) {
            let indent = " ".repeat(span.col.saturating_sub(1) as usize);
            let marker = "^".repeat(span.len.max(1) as usize);
            out.push_str(&format!("{:>4} | {line}\n     | {indent}{marker}\n", span.line));
        }
        out
    }
}

// ============================================================================
// Value conversion
// ============================================================================

/// A value did not have the shape a Rust-side conversion required.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueMismatch {
    pub expected: String,
    pub found: String,
}

impl ValueMismatch {
    pub fn new(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

// ============================================================================
// Native Errors
// ============================================================================

/// Failure reported by a host callable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    #[error("argument {index} requested but only {count} supplied")]
    ArgumentIndex { index: usize, count: usize },

    #[error("argument {index}: {source}")]
    ArgumentType {
        index: usize,
        #[source]
        source: ValueMismatch,
    },

    #[error("receiver: {0}")]
    Receiver(ValueMismatch),

    #[error("member requires an instance receiver")]
    MissingReceiver,

    #[error("{0}")]
    Other(String),
}

impl NativeError {
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other(message.into())
    }
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Failure while invoking a compiled function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("attempted to divide by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("object reference not set to an instance: {context}")]
    NullReference { context: String },

    #[error("nullable object must have a value")]
    NullValue,

    #[error("unable to cast {from} to {to}")]
    InvalidCast { from: String, to: String },

    #[error("index {index} is outside the bounds of an array of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {index} has the wrong type: {source}")]
    ArgumentType {
        index: usize,
        #[source]
        source: ValueMismatch,
    },

    #[error("result: {0}")]
    ResultType(ValueMismatch),

    #[error(transparent)]
    Native(#[from] NativeError),
}

// ============================================================================
// Registration Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("type '{name}' derives from unregistered type '{base}'")]
    UnknownBase { name: String, base: String },

    #[error("type '{name}' is not registered")]
    UnknownType { name: String },
}
