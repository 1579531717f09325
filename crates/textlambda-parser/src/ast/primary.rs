//! Operand positions: literals, prefix operators, casts and groups, object
//! creation, `typeof`/`sizeof`, and identifier resolution.

use textlambda_core::{CompileError, DataType, Span, Value};
use textlambda_registry::MemberFlags;
use tracing::trace;

use super::expr::{ArrayInit, Expr, ExprKind, Initializer};
use super::ops::{Fixity, PREC_UNARY, UnaryOp, precedence};
use super::parser::{Bracket, Parser, signature_text, types_of};
use super::promotion::cast_allowed;
use super::scope::Parameter;
use crate::lexer::{Token, TokenKind, describe};

impl<'a, 'ast> Parser<'a, 'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn parse_primary(&mut self, ctx: Bracket) -> Result<Expr, CompileError> {
        let token = self.stream.peek();
        match token.kind {
            TokenKind::Number => {
                self.stream.advance();
                let number = token
                    .number
                    .ok_or_else(|| CompileError::syntax(token.span, "malformed number"))?;
                let value = number.to_value();
                let ty = value.runtime_type();
                Ok(Expr::literal(value, ty, token.span))
            }
            TokenKind::String => {
                self.stream.advance();
                Ok(Expr::literal(Value::string(token.lexeme), DataType::String, token.span))
            }
            TokenKind::Char => {
                self.stream.advance();
                let c = token
                    .lexeme
                    .chars()
                    .next()
                    .ok_or_else(|| CompileError::syntax(token.span, "empty character literal"))?;
                Ok(Expr::literal(Value::Char(c), DataType::CHAR, token.span))
            }
            TokenKind::True | TokenKind::False => {
                self.stream.advance();
                let value = Value::Bool(token.kind == TokenKind::True);
                Ok(Expr::literal(value, DataType::BOOL, token.span))
            }
            TokenKind::Null => {
                self.stream.advance();
                Ok(Expr::literal(Value::Null, DataType::Null, token.span))
            }
            TokenKind::LeftParen => self.parse_paren(ctx),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde => {
                self.parse_unary(token, ctx)
            }
            TokenKind::New => self.parse_new(),
            TokenKind::TypeOf => self.parse_typeof(),
            TokenKind::SizeOf => self.parse_sizeof(),
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::Eof => Err(match ctx.closer() {
                Some(closer) => CompileError::unmatched(
                    token.span,
                    format!("expected '{closer}' before end of input"),
                ),
                None => CompileError::syntax(token.span, "expected an expression, found end of input"),
            }),
            kind if kind.is_closing_bracket() => Err(match ctx.closer() {
                Some(closer) if closer == kind => CompileError::syntax(
                    token.span,
                    format!("expected an expression before '{kind}'"),
                ),
                _ => CompileError::unmatched(
                    token.span,
                    format!("'{kind}' has no matching opening bracket"),
                ),
            }),
            // prefix `++`/`--`, assignment forms, stray punctuation
            _ => Err(CompileError::unknown(token.span, describe(&token))),
        }
    }

    fn parse_unary(&mut self, op: Token<'ast>, ctx: Bracket) -> Result<Expr, CompileError> {
        self.stream.advance();
        let prec = precedence(op.kind, Fixity::Prefix).unwrap_or(PREC_UNARY);
        let operand = self.parse_expression(prec, ctx)?;
        let mismatch = || {
            CompileError::mismatch(
                op.span,
                format!(
                    "operator '{}' cannot be applied to operand of type '{}'",
                    op.lexeme, operand.ty
                ),
            )
        };

        let unary = match op.kind {
            TokenKind::Plus if operand.ty.is_numeric() => return Ok(operand),
            TokenKind::Minus if operand.ty.primitive().is_some_and(|k| k.is_signed()) => {
                UnaryOp::Neg
            }
            TokenKind::Bang | TokenKind::Tilde if operand.ty.is_bool() => UnaryOp::Not,
            TokenKind::Bang | TokenKind::Tilde if operand.ty.is_integral() => UnaryOp::BitNot,
            _ => return Err(mismatch()),
        };
        let span = op.span.to(operand.span);
        let ty = operand.ty.clone();
        Ok(Expr::new(
            ExprKind::Unary {
                op: unary,
                operand: Box::new(operand),
            },
            ty,
            span,
        ))
    }

    /// `(T)operand` when the parenthesised tokens read as a type, otherwise
    /// a grouped expression.
    fn parse_paren(&mut self, ctx: Bracket) -> Result<Expr, CompileError> {
        let open = self.stream.advance();
        let mark = self.stream.save();
        if let Some(target) = self.read_type()
            && self.stream.eat(TokenKind::RightParen)
        {
            let prec = precedence(TokenKind::LeftParen, Fixity::Prefix).unwrap_or(PREC_UNARY);
            let operand = self.parse_expression(prec, ctx)?;
            if !cast_allowed(self.universe, &operand.ty, &target) {
                return Err(CompileError::mismatch(
                    open.span.to(operand.span),
                    format!("cannot convert type '{}' to '{target}'", operand.ty),
                ));
            }
            let span = open.span.to(operand.span);
            if operand.ty == target {
                return Ok(operand);
            }
            return Ok(Expr::new(
                ExprKind::Cast {
                    operand: Box::new(operand),
                },
                target,
                span,
            ));
        }
        trace!(at = %open.span, "parenthesised tokens are not a type, parsing a group");
        self.stream.restore(mark);
        let inner = self.parse_expression(0, Bracket::Paren)?;
        self.stream.expect(TokenKind::RightParen, true)?;
        Ok(inner)
    }

    fn parse_new(&mut self) -> Result<Expr, CompileError> {
        let keyword = self.stream.advance();
        let ty = self.expect_type()?;

        if let Some(element) = ty.element_type().cloned() {
            if !self.stream.check(TokenKind::LeftBrace) {
                let found = self.stream.peek();
                return Err(CompileError::syntax(
                    found.span,
                    format!("expected '{{' after '{ty}', found '{}'", describe(&found)),
                ));
            }
            let items = self
                .parse_arguments(Bracket::Brace)?
                .into_iter()
                .map(|item| self.convert_implicit(item, &element))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Expr::new(
                ExprKind::NewArray {
                    element,
                    init: ArrayInit::Items(items),
                },
                ty,
                self.span_from(keyword.span),
            ));
        }

        if self.stream.check(TokenKind::LeftBracket) {
            let open = self.stream.peek();
            let bounds = self.parse_arguments(Bracket::Square)?;
            let [length] = <[Expr; 1]>::try_from(bounds).map_err(|_| {
                CompileError::mismatch(open.span, "only single-dimension arrays can be created")
            })?;
            if !length.ty.is_integral() {
                return Err(CompileError::mismatch(
                    length.span,
                    format!("array length must be an integer, found '{}'", length.ty),
                ));
            }
            return Ok(Expr::new(
                ExprKind::NewArray {
                    element: ty.clone(),
                    init: ArrayInit::Length(Box::new(length)),
                },
                DataType::array(ty),
                self.span_from(keyword.span),
            ));
        }

        let args = match self.stream.peek().kind {
            TokenKind::LeftParen => self.parse_arguments(Bracket::Paren)?,
            TokenKind::LeftBrace => Vec::new(),
            _ => {
                let found = self.stream.peek();
                return Err(CompileError::syntax(
                    found.span,
                    format!("expected '(', '[' or '{{' after '{ty}', found '{}'", describe(&found)),
                ));
            }
        };
        let arg_types = types_of(&args);
        let constructor = self
            .universe
            .resolve_constructor(&ty, &arg_types)
            .ok_or_else(|| {
                CompileError::member_not_found(
                    keyword.span,
                    &ty,
                    signature_text(".ctor", &arg_types),
                )
            })?;
        let initializer = if self.stream.check(TokenKind::LeftBrace) {
            Some(self.parse_initializer(&ty)?)
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::New {
                constructor,
                args,
                initializer,
            },
            ty,
            self.span_from(keyword.span),
        ))
    }

    /// `{ A = x, B = y }` assigns members; `{ x, y }` calls `Add` per item.
    fn parse_initializer(&mut self, ty: &DataType) -> Result<Initializer, CompileError> {
        let assigns_members = self.stream.peek_nth(1).kind == TokenKind::Identifier
            && self.stream.peek_nth(2).kind == TokenKind::Equal;
        if !assigns_members {
            let items = self.parse_arguments(Bracket::Brace)?;
            let mut adds = Vec::with_capacity(items.len());
            for item in items {
                let arg_types = [item.ty.clone()];
                let add = self
                    .universe
                    .resolve_method(ty, "Add", &arg_types, false)
                    .ok_or_else(|| {
                        CompileError::member_not_found(
                            item.span,
                            ty,
                            signature_text("Add", &arg_types),
                        )
                    })?;
                adds.push((add, item));
            }
            return Ok(Initializer::Collection(adds));
        }

        self.stream.advance();
        let mut members = Vec::new();
        loop {
            let name = self.stream.peek();
            if name.kind != TokenKind::Identifier {
                return Err(CompileError::syntax(
                    name.span,
                    format!("expected a member name, found '{}'", describe(&name)),
                ));
            }
            self.stream.advance();
            self.stream.expect(TokenKind::Equal, true)?;
            let member = self
                .universe
                .resolve_member(ty, name.lexeme, false)
                .ok_or_else(|| CompileError::member_not_found(name.span, ty, name.lexeme))?;
            if member.setter.is_none() && !member.flags.contains(MemberFlags::WRITABLE) {
                return Err(CompileError::mismatch(
                    name.span,
                    format!("'{ty}.{}' is read-only", member.name),
                ));
            }
            let value = self.parse_expression(0, Bracket::Brace)?;
            let value = self.convert_implicit(value, &member.ty)?;
            members.push((member, value));

            if self.stream.eat(TokenKind::Comma) {
                if self.stream.eat(TokenKind::RightBrace) {
                    break;
                }
                continue;
            }
            self.stream.expect(TokenKind::RightBrace, true)?;
            break;
        }
        Ok(Initializer::Members(members))
    }

    fn parse_typeof(&mut self) -> Result<Expr, CompileError> {
        let keyword = self.stream.advance();
        let ty = self.parenthesised_type()?;
        Ok(Expr::new(
            ExprKind::TypeOf(ty),
            DataType::class("System.Type"),
            self.span_from(keyword.span),
        ))
    }

    fn parse_sizeof(&mut self) -> Result<Expr, CompileError> {
        let keyword = self.stream.advance();
        let ty = self.parenthesised_type()?;
        let span = self.span_from(keyword.span);
        if ty.primitive().is_none() {
            return Err(CompileError::mismatch(
                span,
                format!("'{ty}' does not have a predefined size"),
            ));
        }
        Ok(Expr::new(ExprKind::SizeOf(ty), DataType::INT, span))
    }

    fn parenthesised_type(&mut self) -> Result<DataType, CompileError> {
        self.stream.expect(TokenKind::LeftParen, true)?;
        let ty = self.expect_type()?;
        self.stream.expect(TokenKind::RightParen, true)?;
        Ok(ty)
    }

    /// A bare identifier: a lambda parameter, a member of the default
    /// instance, or the start of a static `Type.Member` path, in that order.
    fn parse_identifier(&mut self) -> Result<Expr, CompileError> {
        let ident = self.stream.peek();
        if let Some(param) = self.params.find(ident.lexeme) {
            let expr = parameter_expr(param, ident.span);
            self.stream.advance();
            return Ok(expr);
        }
        if let Some(instance) = self.params.default_instance().cloned()
            && let Some(expr) = self.parse_default_instance_member(&instance, ident)?
        {
            return Ok(expr);
        }
        self.parse_static_access(ident)
    }

    fn parse_default_instance_member(
        &mut self,
        instance: &Parameter,
        ident: Token<'ast>,
    ) -> Result<Option<Expr>, CompileError> {
        let name = ident.lexeme;
        let receiver = || Box::new(parameter_expr(instance, ident.span));

        if self.stream.peek_nth(1).kind == TokenKind::LeftParen {
            self.stream.advance();
            let args = self.parse_arguments(Bracket::Paren)?;
            let arg_types = types_of(&args);
            let span = self.span_from(ident.span);
            let (target, method) = if let Some(method) =
                self.universe.resolve_method(&instance.ty, name, &arg_types, false)
            {
                (Some(receiver()), method)
            } else if let Some(method) =
                self.universe.resolve_method(&instance.ty, name, &arg_types, true)
            {
                (None, method)
            } else {
                return Err(CompileError::member_not_found(
                    ident.span,
                    &instance.ty,
                    signature_text(name, &arg_types),
                ));
            };
            let ty = method.return_type.clone();
            return Ok(Some(Expr::new(
                ExprKind::Call {
                    target,
                    method,
                    args,
                },
                ty,
                span,
            )));
        }

        let (target, member) =
            if let Some(member) = self.universe.resolve_member(&instance.ty, name, false) {
                (Some(receiver()), member)
            } else if let Some(member) = self.universe.resolve_member(&instance.ty, name, true) {
                (None, member)
            } else {
                return Ok(None);
            };
        self.stream.advance();
        let ty = member.ty.clone();
        Ok(Some(Expr::new(
            ExprKind::Member { target, member },
            ty,
            ident.span,
        )))
    }

    /// `Type.Member` or `Type.Method(args)`, where `Type` may be dotted or
    /// generic.
    fn parse_static_access(&mut self, ident: Token<'ast>) -> Result<Expr, CompileError> {
        let mark = self.stream.save();
        let Some(ty) = self.read_type_path() else {
            self.stream.restore(mark);
            return Err(self.unresolved_name());
        };
        if !self.stream.eat(TokenKind::Dot) {
            let found = self.stream.peek();
            return Err(CompileError::syntax(
                found.span,
                format!("'{ty}' is a type; expected '.' and a member name"),
            ));
        }
        let name = self.stream.peek();
        if name.kind != TokenKind::Identifier {
            return Err(CompileError::syntax(
                name.span,
                format!("expected a member name after '.', found '{}'", describe(&name)),
            ));
        }
        self.stream.advance();

        if self.stream.check(TokenKind::LeftParen) {
            let args = self.parse_arguments(Bracket::Paren)?;
            let arg_types = types_of(&args);
            let method = self
                .universe
                .resolve_method(&ty, name.lexeme, &arg_types, true)
                .ok_or_else(|| {
                    CompileError::member_not_found(
                        name.span,
                        &ty,
                        signature_text(name.lexeme, &arg_types),
                    )
                })?;
            let ret = method.return_type.clone();
            return Ok(Expr::new(
                ExprKind::Call {
                    target: None,
                    method,
                    args,
                },
                ret,
                self.span_from(ident.span),
            ));
        }

        let member = self
            .universe
            .resolve_member(&ty, name.lexeme, true)
            .ok_or_else(|| CompileError::member_not_found(name.span, &ty, name.lexeme))?;
        let member_ty = member.ty.clone();
        Ok(Expr::new(
            ExprKind::Member {
                target: None,
                member,
            },
            member_ty,
            self.span_from(ident.span),
        ))
    }

    /// Consume the dotted name at the cursor that failed to resolve and
    /// report it.
    fn unresolved_name(&mut self) -> CompileError {
        let start = self.stream.advance();
        let mut name = start.lexeme.to_string();
        while self.stream.check(TokenKind::Dot)
            && self.stream.peek_nth(1).kind == TokenKind::Identifier
        {
            self.stream.advance();
            name.push('.');
            name.push_str(self.stream.advance().lexeme);
        }
        CompileError::type_not_found(self.span_from(start.span), name)
    }
}

fn parameter_expr(param: &Parameter, span: Span) -> Expr {
    Expr::new(
        ExprKind::Parameter {
            ordinal: param.ordinal,
            name: param.name.clone(),
        },
        param.ty.clone(),
        span,
    )
}

#[cfg(test)]
mod tests {
    use textlambda_core::CompileErrorKind;

    use crate::ast::{ArrayInit, Expr, ExprKind, Initializer, ParamSpec, ParsedLambda};
    use textlambda_core::{CompileError, DataType, Value};

    const NAMESPACES: [&str; 2] = ["System", "System.Collections.Generic"];

    fn parse_in(
        source: &str,
        declared: &[ParamSpec],
        default_instance: Option<DataType>,
    ) -> Result<ParsedLambda, CompileError> {
        let registry = textlambda_modules::standard_registry().unwrap();
        let namespaces: Vec<String> = NAMESPACES.iter().map(|ns| ns.to_string()).collect();
        crate::parse(source, &registry, Some(declared), default_instance, &namespaces)
    }

    fn body(source: &str) -> Expr {
        parse_in(source, &[], None).unwrap().body
    }

    fn error_kind(source: &str) -> CompileErrorKind {
        parse_in(source, &[], None).unwrap_err().kind()
    }

    #[test]
    fn literal_types() {
        assert_eq!(body("1").ty, DataType::INT);
        assert_eq!(body("3000000000").ty, DataType::LONG);
        assert_eq!(body("1L").ty, DataType::LONG);
        assert_eq!(body("1u").ty, DataType::UINT);
        assert_eq!(body("1.5").ty, DataType::DOUBLE);
        assert_eq!(body("1.5f").ty, DataType::FLOAT);
        assert_eq!(body("1.5m").ty, DataType::DECIMAL);
        assert_eq!(body("'c'").ty, DataType::CHAR);
        assert_eq!(body("\"s\"").ty, DataType::String);
        assert_eq!(body("null").ty, DataType::Null);
        assert_eq!(body("true").as_literal(), Some(&Value::Bool(true)));
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(body("-1.5").ty, DataType::DOUBLE);
        assert_eq!(body("!false").ty, DataType::BOOL);
        assert_eq!(body("~1").ty, DataType::INT);
        assert!(matches!(body("+1").kind, ExprKind::Literal(_)));
        assert_eq!(error_kind("-1u"), CompileErrorKind::TypeMismatch);
        assert_eq!(error_kind("!1.0"), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn cast_or_group() {
        let cast = body("(double)1");
        assert_eq!(cast.ty, DataType::DOUBLE);
        assert!(matches!(cast.kind, ExprKind::Cast { .. }));

        let group = body("(1 + 2) * 3");
        assert!(matches!(group.kind, ExprKind::Binary { .. }));

        // the cast binds tighter than the addition
        let mixed = body("(long)1 + 2");
        assert_eq!(mixed.ty, DataType::LONG);

        assert_eq!(error_kind("(string)1"), CompileErrorKind::TypeMismatch);
        assert_eq!(body("(object)\"s\"").ty, DataType::Object);
    }

    #[test]
    fn arrays() {
        let sized = body("new int[3]");
        assert_eq!(sized.ty, DataType::array(DataType::INT));
        assert!(matches!(
            sized.kind,
            ExprKind::NewArray { init: ArrayInit::Length(_), .. }
        ));

        let listed = body("new double[] { 1, 2.5 }");
        match &listed.kind {
            ExprKind::NewArray { init: ArrayInit::Items(items), .. } => {
                assert_eq!(items.len(), 2);
                assert!(items.iter().all(|item| item.ty == DataType::DOUBLE));
            }
            other => panic!("expected an array literal, got {other:?}"),
        }

        assert_eq!(error_kind("new int[2, 3]"), CompileErrorKind::TypeMismatch);
        assert_eq!(error_kind("new int[] { \"x\" }"), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn objects_and_collection_initializers() {
        let random = body("new Random(42)");
        assert_eq!(random.ty, DataType::class("System.Random"));

        let list = body("new List<int> { 1, 2, 3 }");
        match &list.kind {
            ExprKind::New {
                initializer: Some(Initializer::Collection(items)),
                ..
            } => {
                assert_eq!(items.len(), 3);
                assert!(items.iter().all(|(add, _)| add.name == "Add"));
            }
            other => panic!("expected a collection initializer, got {other:?}"),
        }

        assert_eq!(error_kind("new Random(\"seed\")"), CompileErrorKind::MemberNotFound);
        assert_eq!(error_kind("new Nope()"), CompileErrorKind::TypeNotFound);
    }

    #[test]
    fn read_only_members_cannot_be_initialized() {
        assert_eq!(
            error_kind("new List<int> { Count = 3 }"),
            CompileErrorKind::TypeMismatch
        );
    }

    #[test]
    fn typeof_and_sizeof() {
        let ty = body("typeof(List<int>)");
        assert_eq!(ty.ty, DataType::class("System.Type"));
        assert!(matches!(ty.kind, ExprKind::TypeOf(_)));

        let size = body("sizeof(double)");
        assert_eq!(size.ty, DataType::INT);
        assert!(matches!(&size.kind, ExprKind::SizeOf(ty) if *ty == DataType::DOUBLE));
        assert_eq!(error_kind("sizeof(string)"), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn static_members() {
        let pi = body("Math.PI");
        assert_eq!(pi.ty, DataType::DOUBLE);
        assert!(matches!(pi.kind, ExprKind::Member { target: None, .. }));

        assert_eq!(body("System.Math.Sqrt(2.0)").ty, DataType::DOUBLE);
        assert_eq!(body("int.MaxValue").ty, DataType::INT);
        assert_eq!(error_kind("Math.Sqrt(2)"), CompileErrorKind::MemberNotFound);
        assert_eq!(error_kind("Math.Nope"), CompileErrorKind::MemberNotFound);
        assert_eq!(error_kind("Nope.Value"), CompileErrorKind::TypeNotFound);
        assert_eq!(error_kind("undeclared"), CompileErrorKind::TypeNotFound);
        assert_eq!(error_kind("Math"), CompileErrorKind::Syntax);
    }

    #[test]
    fn less_than_is_not_mistaken_for_type_arguments() {
        let declared = [ParamSpec::named("a", DataType::INT), ParamSpec::named("b", DataType::INT)];
        let expr = parse_in("a < b", &declared, None).unwrap().body;
        assert_eq!(expr.ty, DataType::BOOL);
    }

    #[test]
    fn default_instance_members() {
        let this = Some(DataType::String);
        let length = parse_in("Length", &[], this.clone()).unwrap();
        assert_eq!(length.params.len(), 1);
        assert_eq!(length.body.ty, DataType::INT);
        assert!(matches!(length.body.kind, ExprKind::Member { target: Some(_), .. }));

        let upper = parse_in("ToUpper()", &[], this.clone()).unwrap().body;
        assert!(matches!(upper.kind, ExprKind::Call { target: Some(_), .. }));

        let empty = parse_in("IsNullOrEmpty(this)", &[], this.clone()).unwrap().body;
        assert!(matches!(empty.kind, ExprKind::Call { target: None, .. }));

        let err = parse_in("Nope()", &[], this).unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::MemberNotFound);
    }

    #[test]
    fn parameters_shadow_default_instance_members() {
        let declared = [ParamSpec::named("Length", DataType::DOUBLE)];
        let expr = parse_in("Length", &declared, Some(DataType::String)).unwrap().body;
        assert_eq!(expr.ty, DataType::DOUBLE);
        assert!(matches!(expr.kind, ExprKind::Parameter { ordinal: 1, .. }));
    }
}
