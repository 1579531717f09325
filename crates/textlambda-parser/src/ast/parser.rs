//! Parser state shared by the expression, primary, type and header passes.
//!
//! Resolution is interleaved with parsing: every node is built already
//! typed, so the parser holds the [`TypeUniverse`] it resolves names against
//! and the [`ParameterList`] visible to the body.

use textlambda_core::{CompileError, DataType, Span};
use textlambda_registry::TypeUniverse;

use super::expr::Expr;
use super::promotion::implicitly_converts;
use super::scope::ParameterList;
use crate::lexer::{Token, TokenKind, TokenStream};

/// The bracket an expression is nested in, which decides how a closing
/// bracket or end of input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    None,
    Paren,
    Square,
    Brace,
}

impl Bracket {
    pub fn opener(self) -> Option<TokenKind> {
        match self {
            Bracket::None => None,
            Bracket::Paren => Some(TokenKind::LeftParen),
            Bracket::Square => Some(TokenKind::LeftBracket),
            Bracket::Brace => Some(TokenKind::LeftBrace),
        }
    }

    pub fn closer(self) -> Option<TokenKind> {
        match self {
            Bracket::None => None,
            Bracket::Paren => Some(TokenKind::RightParen),
            Bracket::Square => Some(TokenKind::RightBracket),
            Bracket::Brace => Some(TokenKind::RightBrace),
        }
    }
}

pub struct Parser<'a, 'ast> {
    pub(crate) stream: TokenStream<'ast>,
    pub(crate) universe: &'a dyn TypeUniverse,
    pub(crate) namespaces: &'a [String],
    pub(crate) params: ParameterList,
}

impl<'a, 'ast> Parser<'a, 'ast> {
    pub fn new(
        tokens: &'ast [Token<'ast>],
        universe: &'a dyn TypeUniverse,
        namespaces: &'a [String],
    ) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            universe,
            namespaces,
            params: ParameterList::default(),
        }
    }

    /// Parameters in scope; populated by the lambda header pass.
    pub fn parameters(&self) -> &ParameterList {
        &self.params
    }

    pub(crate) fn set_parameters(&mut self, params: ParameterList) {
        self.params = params;
    }

    /// Resolve a (possibly dotted) name as a keyword alias, a qualified
    /// name, then under each namespace in order. The first match wins.
    pub(crate) fn resolve_type_name(&self, name: &str) -> Option<DataType> {
        DataType::from_alias(name)
            .or_else(|| self.universe.resolve_by_name(name))
            .or_else(|| {
                self.namespaces
                    .iter()
                    .find_map(|ns| self.universe.resolve_by_name(&format!("{ns}.{name}")))
            })
    }

    /// Close the generic definition `name`N` over `args`.
    pub(crate) fn resolve_generic(&self, name: &str, args: &[DataType]) -> Option<DataType> {
        let definition = self.resolve_type_name(&format!("{name}`{}", args.len()))?;
        self.universe.instantiate(&definition, args)
    }

    pub(crate) fn convert_implicit(&self, expr: Expr, to: &DataType) -> Result<Expr, CompileError> {
        if implicitly_converts(self.universe, &expr.ty, to) {
            Ok(expr.cast_to(to))
        } else {
            Err(CompileError::mismatch(
                expr.span,
                format!("cannot implicitly convert type '{}' to '{to}'", expr.ty),
            ))
        }
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.to(self.stream.previous_span())
    }
}

/// `Name(int, string)`, as member-not-found errors print call sites.
pub(crate) fn signature_text(name: &str, arg_types: &[DataType]) -> String {
    let args: Vec<String> = arg_types.iter().map(ToString::to_string).collect();
    format!("{name}({})", args.join(", "))
}

pub(crate) fn types_of(args: &[Expr]) -> Vec<DataType> {
    args.iter().map(|arg| arg.ty.clone()).collect()
}
