//! Lexical analysis for expression text.

mod cursor;
mod lexer;
mod stream;
mod token;

pub use lexer::Lexer;
pub use stream::{Mark, TokenStream, describe};
pub use token::{NumberLiteral, Token, TokenKind, lookup_keyword};
