//! Lexer and parser for textlambda expressions.
//!
//! Turns source text such as `(x, y) => x * 2 + y` into a typed
//! [`Expr`](ast::Expr) tree bound to a [`ParameterList`](ast::ParameterList):
//!
//! - [`lexer`] - tokens, the character cursor and a backtrackable token stream
//! - [`ast`] - the typed tree, precedence table, numeric promotion and the
//!   precedence-climbing parser that resolves names as it goes

use bumpalo::Bump;
use textlambda_core::{CompileError, DataType};
use textlambda_registry::TypeUniverse;
use tracing::debug;

pub mod ast;
pub mod lexer;

pub use ast::{Expr, ExprKind, ParamSpec, ParameterList, ParsedLambda, Parser};
pub use lexer::{Lexer, Token, TokenKind};

/// Lex and parse `source` against `universe`.
///
/// Names not found as written are retried under each of `namespaces`, in
/// order. `default_instance` adds an implicit receiver parameter in front of
/// `declared`. With `declared` as `None` the lambda header alone defines the
/// parameters.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse(
    source: &str,
    universe: &dyn TypeUniverse,
    declared: Option<&[ParamSpec]>,
    default_instance: Option<DataType>,
    namespaces: &[String],
) -> Result<ParsedLambda, CompileError> {
    debug!(source, ?namespaces, "parsing expression");
    let arena = Bump::new();
    let tokens = Lexer::new(source, &arena).tokenize()?;
    Parser::new(tokens, universe, namespaces).parse_lambda(declared, default_instance)
}
