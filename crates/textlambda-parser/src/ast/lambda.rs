//! The optional `(params) =>` header and the parse entry point.

use textlambda_core::{CompileError, DataType, Span};
use tracing::debug;

use super::expr::Expr;
use super::parser::{Bracket, Parser};
use super::scope::{ParamSpec, ParameterList};
use crate::lexer::{TokenKind, describe};

/// A parsed expression body with the parameters it was bound against.
#[derive(Debug, Clone)]
pub struct ParsedLambda {
    pub params: ParameterList,
    pub body: Expr,
}

struct HeaderParam<'ast> {
    name: &'ast str,
    ty: Option<DataType>,
    span: Span,
}

impl<'a, 'ast> Parser<'a, 'ast> {
    /// Parse a whole source text: an optional header, then one expression
    /// running to end of input.
    ///
    /// `declared` is the target signature's parameter list, without the
    /// default instance, or `None` when the header decides the parameters;
    /// `default_instance` becomes ordinal 0 when given.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_lambda(
        mut self,
        declared: Option<&[ParamSpec]>,
        default_instance: Option<DataType>,
    ) -> Result<ParsedLambda, CompileError> {
        let mut params = ParameterList::new(default_instance);
        let start = self.stream.peek().span;

        match self.read_header() {
            Some(header) => {
                debug!(parameters = header.len(), "lambda header recognised");
                bind_header(&mut params, &header, declared, self.span_from(start))?;
            }
            None => {
                for (i, spec) in declared.unwrap_or_default().iter().enumerate() {
                    let name = spec.name.clone().unwrap_or_else(|| format!("arg{i}"));
                    params.push(name, spec.ty.clone().unwrap_or(DataType::Object));
                }
            }
        }
        self.set_parameters(params);

        let body = self.parse_expression(0, Bracket::None)?;
        if !self.stream.is_at_end() {
            let extra = self.stream.peek();
            return Err(CompileError::syntax(
                extra.span,
                format!("unexpected '{}' after the expression", describe(&extra)),
            ));
        }
        debug!(params = %self.params, ty = %body.ty, nodes = body.node_count(), "parsed lambda body");
        Ok(ParsedLambda {
            params: self.params,
            body,
        })
    }

    /// `x =>`, `() =>`, `(a, b) =>` or `(int a, double b) =>`. Anything else
    /// rewinds and reports `None`, leaving the tokens to the body.
    fn read_header(&mut self) -> Option<Vec<HeaderParam<'ast>>> {
        let first = self.stream.peek();
        if first.kind == TokenKind::Identifier && self.stream.peek_nth(1).kind == TokenKind::FatArrow {
            self.stream.advance();
            self.stream.advance();
            return Some(vec![HeaderParam {
                name: first.lexeme,
                ty: None,
                span: first.span,
            }]);
        }
        if first.kind != TokenKind::LeftParen {
            return None;
        }

        let mark = self.stream.save();
        let header = self.read_parenthesised_header();
        if header.is_none() {
            self.stream.restore(mark);
        }
        header
    }

    fn read_parenthesised_header(&mut self) -> Option<Vec<HeaderParam<'ast>>> {
        self.stream.advance();
        let mut header = Vec::new();
        if !self.stream.eat(TokenKind::RightParen) {
            loop {
                let start = self.stream.peek();
                let untyped = start.kind == TokenKind::Identifier
                    && matches!(
                        self.stream.peek_nth(1).kind,
                        TokenKind::Comma | TokenKind::RightParen
                    );
                let ty = if untyped { None } else { Some(self.read_type()?) };
                let name = self.stream.peek();
                if name.kind != TokenKind::Identifier {
                    return None;
                }
                self.stream.advance();
                header.push(HeaderParam {
                    name: name.lexeme,
                    ty,
                    span: start.span.to(name.span),
                });

                if self.stream.eat(TokenKind::Comma) {
                    continue;
                }
                if self.stream.eat(TokenKind::RightParen) {
                    break;
                }
                return None;
            }
        }
        self.stream.eat(TokenKind::FatArrow).then_some(header)
    }
}

fn bind_header(
    params: &mut ParameterList,
    header: &[HeaderParam<'_>],
    declared: Option<&[ParamSpec]>,
    span: Span,
) -> Result<(), CompileError> {
    if let Some(declared) = declared
        && header.len() != declared.len()
    {
        return Err(CompileError::signature(
            span,
            format!(
                "the lambda declares {} parameter(s) but the signature has {}",
                header.len(),
                declared.len()
            ),
        ));
    }
    for (i, param) in header.iter().enumerate() {
        if header[..i].iter().any(|earlier| earlier.name == param.name) {
            return Err(CompileError::syntax(
                param.span,
                format!("duplicate parameter name '{}'", param.name),
            ));
        }
        let expected = declared
            .and_then(|declared| declared.get(i))
            .and_then(|spec| spec.ty.as_ref());
        let ty = match (&param.ty, expected) {
            (Some(explicit), Some(expected)) if explicit != expected => {
                return Err(CompileError::signature(
                    param.span,
                    format!(
                        "parameter '{}' is declared '{explicit}' but the signature passes '{expected}'",
                        param.name
                    ),
                ));
            }
            (Some(ty), _) | (None, Some(ty)) => ty.clone(),
            (None, None) => DataType::Object,
        };
        params.push(param.name, ty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use textlambda_core::CompileErrorKind;

    use super::*;
    use crate::ast::ExprKind;

    fn parse(source: &str, declared: &[ParamSpec]) -> Result<ParsedLambda, CompileError> {
        let registry = textlambda_modules::standard_registry().unwrap();
        crate::parse(source, &registry, Some(declared), None, &[])
    }

    fn names(parsed: &ParsedLambda) -> Vec<&str> {
        parsed.params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn single_parameter_without_parentheses() {
        let parsed = parse("x => x + 1", &[ParamSpec::typed(DataType::INT)]).unwrap();
        assert_eq!(names(&parsed), ["x"]);
        assert_eq!(parsed.body.ty, DataType::INT);
    }

    #[test]
    fn empty_header() {
        let parsed = parse("() => 42", &[]).unwrap();
        assert!(parsed.params.is_empty());
        assert_eq!(parsed.body.as_literal(), Some(&textlambda_core::Value::Int(42)));
    }

    #[test]
    fn header_names_override_declared_names() {
        let declared = [
            ParamSpec::named("first", DataType::INT),
            ParamSpec::named("second", DataType::INT),
        ];
        let parsed = parse("(a, b) => a - b", &declared).unwrap();
        assert_eq!(names(&parsed), ["a", "b"]);
        assert_eq!(parse("(a, b) => first", &declared).unwrap_err().kind(), CompileErrorKind::TypeNotFound);
    }

    #[test]
    fn typed_header_fills_untyped_signature() {
        let declared = [ParamSpec::untyped(), ParamSpec::untyped()];
        let parsed = parse("(int a, b) => a", &declared).unwrap();
        assert_eq!(parsed.params.types(), [DataType::INT, DataType::Object]);
        assert_eq!(parsed.body.ty, DataType::INT);

        let nullable = parse("(int? a, string b) => a", &declared).unwrap();
        assert_eq!(nullable.body.ty, DataType::nullable(DataType::INT));
    }

    #[test]
    fn header_alone_declares_parameters() {
        let registry = textlambda_modules::standard_registry().unwrap();
        let infer = |source: &str| crate::parse(source, &registry, None, None, &[]);

        let parsed = infer("(int a, double b) => a * b").unwrap();
        assert_eq!(names(&parsed), ["a", "b"]);
        assert_eq!(parsed.params.types(), [DataType::INT, DataType::DOUBLE]);
        assert_eq!(parsed.body.ty, DataType::DOUBLE);

        let parsed = infer("x => x").unwrap();
        assert_eq!(parsed.params.types(), [DataType::Object]);

        assert!(infer("1 + 2").unwrap().params.is_empty());
        assert_eq!(infer("(a, a) => a").unwrap_err().kind(), CompileErrorKind::Syntax);
    }

    #[test]
    fn header_must_agree_with_signature() {
        let declared = [ParamSpec::typed(DataType::DOUBLE)];
        let count = parse("(a, b) => a", &declared).unwrap_err();
        assert_eq!(count.kind(), CompileErrorKind::SignatureMismatch);
        let ty = parse("(int a) => a", &declared).unwrap_err();
        assert_eq!(ty.kind(), CompileErrorKind::SignatureMismatch);
        assert!(parse("(double a) => a", &declared).is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let declared = [ParamSpec::untyped(), ParamSpec::untyped()];
        let err = parse("(a, a) => a", &declared).unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Syntax);
    }

    #[test]
    fn headerless_bodies_use_declared_or_positional_names() {
        let named = parse("x * 2", &[ParamSpec::named("x", DataType::INT)]).unwrap();
        assert_eq!(names(&named), ["x"]);

        let declared = [ParamSpec::typed(DataType::INT), ParamSpec::typed(DataType::INT)];
        let positional = parse("arg0 + arg1", &declared).unwrap();
        assert_eq!(names(&positional), ["arg0", "arg1"]);
    }

    #[test]
    fn parenthesised_body_is_not_a_header() {
        let declared = [ParamSpec::named("x", DataType::INT)];
        let parsed = parse("(x) + 1", &declared).unwrap();
        assert!(matches!(parsed.body.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn default_instance_comes_first() {
        let registry = textlambda_modules::standard_registry().unwrap();
        let declared = [ParamSpec::named("n", DataType::INT)];
        let parsed =
            crate::parse("Substring(n)", &registry, Some(&declared), Some(DataType::String), &[]).unwrap();
        assert_eq!(names(&parsed), ["this", "n"]);
        assert_eq!(parsed.params.find("n").map(|p| p.ordinal), Some(1));
        assert_eq!(parsed.body.ty, DataType::String);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse("1 2", &[]).unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Syntax);
        assert_eq!(err.span().col, 3);
    }
}
