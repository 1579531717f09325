//! Precedence climbing over infix and postfix operators.
//!
//! [`Parser::parse_expression`] parses one primary, then keeps folding
//! operators into it while their precedence (from [`precedence`]) is
//! strictly above the caller's minimum. Each folded node is typed on the
//! spot: arithmetic promotes, `+` with text becomes a `Concat` call,
//! member and index access resolve against the type universe.

use textlambda_core::{CompileError, DataType, Span};
use textlambda_registry::params_match;

use super::expr::{Expr, ExprKind};
use super::ops::{BinaryOp, Fixity, PREC_ASSIGNMENT, TypeTestOp, precedence};
use super::parser::{Bracket, Parser, signature_text, types_of};
use super::promotion::{implicitly_converts, promote, unify};
use crate::lexer::{Token, TokenKind, describe};

impl<'a, 'ast> Parser<'a, 'ast> {
    /// Parse an expression whose operators all bind tighter than
    /// `min_precedence`. `ctx` is the innermost open bracket, which decides
    /// whether a closing bracket ends the expression or is unmatched.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_expression(
        &mut self,
        min_precedence: u8,
        ctx: Bracket,
    ) -> Result<Expr, CompileError> {
        let mut left = self.parse_primary(ctx)?;
        loop {
            let token = self.stream.peek();
            if self.at_terminator(&token, ctx)? {
                break;
            }
            let Some(prec) = precedence(token.kind, Fixity::Infix) else {
                break;
            };
            if prec <= min_precedence {
                break;
            }
            left = self.parse_infix(left, token, prec, ctx)?;
        }
        Ok(left)
    }

    fn at_terminator(&self, token: &Token<'ast>, ctx: Bracket) -> Result<bool, CompileError> {
        match token.kind {
            TokenKind::Eof => match ctx.closer() {
                None => Ok(true),
                Some(closer) => Err(CompileError::unmatched(
                    token.span,
                    format!("expected '{closer}' before end of input"),
                )),
            },
            kind if kind.is_closing_bracket() => match ctx.closer() {
                Some(closer) if closer == kind => Ok(true),
                Some(closer) => Err(CompileError::unmatched(
                    token.span,
                    format!("found '{kind}' where '{closer}' was expected"),
                )),
                None => Err(CompileError::unmatched(
                    token.span,
                    format!("'{kind}' has no matching opening bracket"),
                )),
            },
            TokenKind::Comma if ctx == Bracket::None => {
                Err(CompileError::syntax(token.span, "unexpected ','"))
            }
            TokenKind::Comma | TokenKind::Colon | TokenKind::Semicolon => Ok(true),
            _ => Ok(false),
        }
    }

    fn parse_infix(
        &mut self,
        left: Expr,
        op: Token<'ast>,
        prec: u8,
        ctx: Bracket,
    ) -> Result<Expr, CompileError> {
        match op.kind {
            TokenKind::Dot => self.parse_member_access(left),
            TokenKind::LeftBracket => self.parse_index(left),
            TokenKind::LeftParen => Err(CompileError::unknown(op.span, "invocation of a value")),
            TokenKind::Question => self.parse_conditional(left, ctx),
            TokenKind::QuestionQuestion => self.parse_coalesce(left, prec, ctx),
            TokenKind::Is => self.parse_type_test(left, TypeTestOp::Is),
            TokenKind::As => self.parse_type_test(left, TypeTestOp::As),
            kind => {
                // assignment forms, postfix `++`/`--` and `->` are lexed but not part of
                // the expression language
                let binary = BinaryOp::from_token(kind)
                    .ok_or_else(|| CompileError::unknown(op.span, op.lexeme))?;
                self.stream.advance();
                let right = self.parse_expression(prec, ctx)?;
                self.build_binary(binary, left, right, op.span)
            }
        }
    }

    /// Type a binary operator application, inserting operand conversions.
    pub(crate) fn build_binary(
        &self,
        op: BinaryOp,
        left: Expr,
        right: Expr,
        op_span: Span,
    ) -> Result<Expr, CompileError> {
        if op == BinaryOp::Add && (left.ty.is_string() || right.ty.is_string()) {
            return self.build_concat(left, right, op_span);
        }
        let mismatch = || {
            CompileError::mismatch(
                op_span,
                format!(
                    "operator '{op}' cannot be applied to operands of type '{}' and '{}'",
                    left.ty, right.ty
                ),
            )
        };
        let span = left.span.to(right.span);

        if op.is_shift() {
            if !left.ty.is_integral() || right.ty != DataType::INT {
                return Err(mismatch());
            }
            let ty = left.ty.clone();
            return Ok(binary(op, left, right, ty, span));
        }

        let (operand, result) = if op.is_arithmetic() {
            let ty = promote(&left.ty, &right.ty).ok_or_else(mismatch)?;
            (ty.clone(), ty)
        } else if op.is_relational() {
            let comparable = left.ty == right.ty
                && (left.ty.is_numeric() || left.ty == DataType::CHAR);
            if !comparable {
                return Err(mismatch());
            }
            (left.ty.clone(), DataType::BOOL)
        } else if op.is_equality() {
            let ty = equality_operand(&left.ty, &right.ty).ok_or_else(mismatch)?;
            (ty, DataType::BOOL)
        } else if op.is_bitwise() {
            let ok = left.ty == right.ty && (left.ty.is_integral() || left.ty.is_bool());
            if !ok {
                return Err(mismatch());
            }
            (left.ty.clone(), left.ty.clone())
        } else {
            if !left.ty.is_bool() || !right.ty.is_bool() {
                return Err(mismatch());
            }
            (DataType::BOOL, DataType::BOOL)
        };

        let left = left.cast_to(&operand);
        let right = right.cast_to(&operand);
        Ok(binary(op, left, right, result, span))
    }

    /// `a + b` with text on either side: `String.Concat(object, object)`.
    fn build_concat(&self, left: Expr, right: Expr, op_span: Span) -> Result<Expr, CompileError> {
        if left.ty.is_void() || right.ty.is_void() {
            return Err(CompileError::mismatch(
                op_span,
                "a method without a result cannot be concatenated",
            ));
        }
        let params = [DataType::Object, DataType::Object];
        let method = self
            .universe
            .resolve_method(&DataType::String, "Concat", &params, true)
            .ok_or_else(|| {
                CompileError::member_not_found(
                    op_span,
                    DataType::String,
                    signature_text("Concat", &params),
                )
            })?;
        let span = left.span.to(right.span);
        let ty = method.return_type.clone();
        let args = vec![
            left.cast_to(&DataType::Object),
            right.cast_to(&DataType::Object),
        ];
        Ok(Expr::new(
            ExprKind::Call {
                target: None,
                method,
                args,
            },
            ty,
            span,
        ))
    }

    fn parse_conditional(&mut self, test: Expr, ctx: Bracket) -> Result<Expr, CompileError> {
        self.stream.advance();
        if !test.ty.is_bool() {
            return Err(CompileError::mismatch(
                test.span,
                format!("condition must be of type 'bool', found '{}'", test.ty),
            ));
        }
        let then_branch = self.parse_expression(0, ctx)?;
        self.stream.expect(TokenKind::Colon, true)?;
        // right-associative: `a ? b : c ? d : e` nests in the else branch
        let else_branch = self.parse_expression(PREC_ASSIGNMENT - 1, ctx)?;

        let ty = unify(self.universe, &then_branch.ty, &else_branch.ty).ok_or_else(|| {
            CompileError::mismatch(
                then_branch.span.to(else_branch.span),
                format!(
                    "no implicit conversion between '{}' and '{}'",
                    then_branch.ty, else_branch.ty
                ),
            )
        })?;
        let span = test.span.to(else_branch.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                then_branch: Box::new(then_branch.cast_to(&ty)),
                else_branch: Box::new(else_branch.cast_to(&ty)),
            },
            ty,
            span,
        ))
    }

    fn parse_coalesce(&mut self, left: Expr, prec: u8, ctx: Bracket) -> Result<Expr, CompileError> {
        let op = self.stream.advance();
        // `??` groups to the right
        let right = self.parse_expression(prec - 1, ctx)?;
        if !left.ty.accepts_null() {
            return Err(CompileError::mismatch(
                op.span,
                format!("operator '??' cannot be applied to a non-nullable '{}'", left.ty),
            ));
        }

        let inner = left.ty.nullable_inner().unwrap_or(&left.ty);
        let ty = if left.ty == DataType::Null || right.ty == *inner || right.ty == left.ty {
            right.ty.clone()
        } else if right.ty == DataType::Null {
            left.ty.clone()
        } else if let Some(promoted) = promote(inner, &right.ty) {
            promoted
        } else if implicitly_converts(self.universe, &right.ty, &left.ty) {
            left.ty.clone()
        } else {
            return Err(CompileError::mismatch(
                op.span,
                format!(
                    "operator '??' cannot be applied to operands of type '{}' and '{}'",
                    left.ty, right.ty
                ),
            ));
        };

        let span = left.span.to(right.span);
        Ok(Expr::new(
            ExprKind::NullCoalesce {
                left: Box::new(left),
                right: Box::new(right.cast_to(&ty)),
            },
            ty,
            span,
        ))
    }

    fn parse_type_test(&mut self, operand: Expr, op: TypeTestOp) -> Result<Expr, CompileError> {
        let keyword = self.stream.advance();
        let target = self.expect_type()?;
        if op == TypeTestOp::As && !target.accepts_null() {
            return Err(CompileError::mismatch(
                keyword.span,
                format!("'as' needs a reference or nullable type, '{target}' is a value type"),
            ));
        }
        let ty = match op {
            TypeTestOp::Is => DataType::BOOL,
            TypeTestOp::As => target.clone(),
        };
        let span = self.span_from(operand.span);
        Ok(Expr::new(
            ExprKind::TypeTest {
                op,
                operand: Box::new(operand),
                target,
            },
            ty,
            span,
        ))
    }

    /// `target.Name` or `target.Name(args)` on an instance.
    fn parse_member_access(&mut self, target: Expr) -> Result<Expr, CompileError> {
        self.stream.advance();
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
                .resolve_method(&target.ty, name.lexeme, &arg_types, false)
                .ok_or_else(|| {
                    CompileError::member_not_found(
                        name.span,
                        &target.ty,
                        signature_text(name.lexeme, &arg_types),
                    )
                })?;
            let span = self.span_from(target.span);
            let ty = method.return_type.clone();
            return Ok(Expr::new(
                ExprKind::Call {
                    target: Some(Box::new(target)),
                    method,
                    args,
                },
                ty,
                span,
            ));
        }

        let member = self
            .universe
            .resolve_member(&target.ty, name.lexeme, false)
            .ok_or_else(|| CompileError::member_not_found(name.span, &target.ty, name.lexeme))?;
        let span = self.span_from(target.span);
        let ty = member.ty.clone();
        Ok(Expr::new(
            ExprKind::Member {
                target: Some(Box::new(target)),
                member,
            },
            ty,
            span,
        ))
    }

    /// `target[i]`: element access on arrays, otherwise the type's indexer.
    fn parse_index(&mut self, target: Expr) -> Result<Expr, CompileError> {
        let open = self.stream.peek();
        let args = self.parse_arguments(Bracket::Square)?;
        let span = self.span_from(target.span);

        if let Some(element) = target.ty.element_type().cloned() {
            let [index] = <[Expr; 1]>::try_from(args).map_err(|_| {
                CompileError::mismatch(open.span, "arrays take exactly one index")
            })?;
            if !index.ty.is_integral() {
                return Err(CompileError::mismatch(
                    index.span,
                    format!("array index must be an integer, found '{}'", index.ty),
                ));
            }
            return Ok(Expr::new(
                ExprKind::Index {
                    target: Box::new(target),
                    index: Box::new(index),
                },
                element,
                span,
            ));
        }

        let arg_types = types_of(&args);
        let indexer = self
            .universe
            .resolve_indexer(&target.ty)
            .filter(|indexer| params_match(&indexer.getter.params, &arg_types))
            .ok_or_else(|| {
                let args: Vec<String> = arg_types.iter().map(ToString::to_string).collect();
                CompileError::member_not_found(
                    open.span,
                    &target.ty,
                    format!("this[{}]", args.join(", ")),
                )
            })?;
        let ty = indexer.getter.return_type.clone();
        Ok(Expr::new(
            ExprKind::Call {
                target: Some(Box::new(target)),
                method: indexer.getter,
                args,
            },
            ty,
            span,
        ))
    }

    /// A bracketed, comma-separated expression list, brackets included.
    pub(crate) fn parse_arguments(&mut self, ctx: Bracket) -> Result<Vec<Expr>, CompileError> {
        let (Some(opener), Some(closer)) = (ctx.opener(), ctx.closer()) else {
            return Ok(Vec::new());
        };
        self.stream.expect(opener, true)?;
        let mut args = Vec::new();
        if self.stream.eat(closer) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression(0, ctx)?);
            if self.stream.eat(TokenKind::Comma) {
                continue;
            }
            if self.stream.eat(closer) {
                return Ok(args);
            }
            let found = self.stream.peek();
            return Err(CompileError::syntax(
                found.span,
                format!("expected ',' or '{closer}', found '{}'", describe(&found)),
            ));
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, ty: DataType, span: Span) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
        span,
    )
}

/// The common type `==`/`!=` compare at, if the operands are comparable.
fn equality_operand(left: &DataType, right: &DataType) -> Option<DataType> {
    match (left, right) {
        _ if left == right => Some(left.clone()),
        (DataType::Null, other) | (other, DataType::Null) => {
            other.accepts_null().then(|| other.clone())
        }
        (DataType::Nullable(inner), other) | (other, DataType::Nullable(inner))
            if **inner == *other =>
        {
            Some(DataType::nullable(other.clone()))
        }
        _ if !left.is_value_type() && !right.is_value_type() => {
            let comparable = !left.is_void() && !right.is_void();
            comparable.then_some(DataType::Object)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use textlambda_core::CompileErrorKind;

    use super::*;
    use crate::ast::{ParamSpec, ParsedLambda};

    fn parse(source: &str, declared: &[ParamSpec]) -> Result<ParsedLambda, CompileError> {
        let registry = textlambda_modules::standard_registry().unwrap();
        crate::parse(source, &registry, Some(declared), None, &["System".to_string()])
    }

    fn body(source: &str) -> Expr {
        parse(source, &[]).unwrap().body
    }

    fn error_kind(source: &str, declared: &[ParamSpec]) -> CompileErrorKind {
        parse(source, declared).unwrap_err().kind()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = body("1 + 2 * 3");
        match &expr.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn same_level_operators_associate_left() {
        let expr = body("10 - 4 - 3");
        match &expr.kind {
            ExprKind::Binary { op, left, .. } => {
                assert_eq!(*op, BinaryOp::Sub);
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("expected subtraction, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_promotes_the_lower_operand() {
        let declared = [ParamSpec::typed(DataType::INT), ParamSpec::typed(DataType::DOUBLE)];
        let expr = parse("(x, y) => x + y", &declared).unwrap().body;
        assert_eq!(expr.ty, DataType::DOUBLE);
        match &expr.kind {
            ExprKind::Binary { left, right, .. } => {
                assert!(matches!(left.kind, ExprKind::Cast { .. }));
                assert_eq!(left.ty, DataType::DOUBLE);
                assert!(matches!(right.kind, ExprKind::Parameter { ordinal: 1, .. }));
            }
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn text_addition_is_concatenation() {
        let expr = body("\"n=\" + 1");
        assert_eq!(expr.ty, DataType::String);
        match &expr.kind {
            ExprKind::Call { target, method, args } => {
                assert!(target.is_none());
                assert_eq!(method.name, "Concat");
                assert!(args.iter().all(|a| a.ty == DataType::Object));
            }
            other => panic!("expected a Concat call, got {other:?}"),
        }
    }

    #[test]
    fn comparisons_do_not_promote() {
        assert_eq!(body("1 < 2").ty, DataType::BOOL);
        assert_eq!(error_kind("1 < 2.0", &[]), CompileErrorKind::TypeMismatch);
        assert_eq!(error_kind("true + 1", &[]), CompileErrorKind::TypeMismatch);
        assert_eq!(error_kind("1 && true", &[]), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn shifts_take_an_int_count() {
        assert_eq!(body("1L << 3").ty, DataType::LONG);
        assert_eq!(error_kind("1 << 2L", &[]), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn conditional_unifies_branches() {
        let expr = body("true ? 1 : 2.5");
        assert_eq!(expr.ty, DataType::DOUBLE);
        assert_eq!(body("false ? \"a\" : null").ty, DataType::String);
        assert_eq!(error_kind("true ? 1", &[]), CompileErrorKind::Syntax);
        assert_eq!(error_kind("1 ? 2 : 3", &[]), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn nested_conditionals_group_to_the_right() {
        let expr = body("true ? 1 : false ? 2 : 3");
        match &expr.kind {
            ExprKind::Conditional { else_branch, .. } => {
                assert!(matches!(else_branch.kind, ExprKind::Conditional { .. }));
            }
            other => panic!("expected a conditional, got {other:?}"),
        }
    }

    #[test]
    fn coalesce_unwraps_nullable() {
        let declared = [ParamSpec::named("n", DataType::nullable(DataType::INT))];
        let expr = parse("n ?? 5", &declared).unwrap().body;
        assert_eq!(expr.ty, DataType::INT);
        assert!(matches!(expr.kind, ExprKind::NullCoalesce { .. }));

        let declared = [ParamSpec::named("n", DataType::INT)];
        assert_eq!(error_kind("n ?? 5", &declared), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn type_tests() {
        let declared = [ParamSpec::named("o", DataType::Object)];
        let is = parse("o is string", &declared).unwrap().body;
        assert_eq!(is.ty, DataType::BOOL);
        let r#as = parse("o as string", &declared).unwrap().body;
        assert_eq!(r#as.ty, DataType::String);
        let nullable = parse("o as int?", &declared).unwrap().body;
        assert_eq!(nullable.ty, DataType::nullable(DataType::INT));
        assert_eq!(error_kind("o as int", &declared), CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn instance_members_and_methods() {
        let length = body("\"abc\".Length");
        assert_eq!(length.ty, DataType::INT);
        assert!(matches!(length.kind, ExprKind::Member { target: Some(_), .. }));

        let upper = body("\"abc\".Substring(1).ToUpper()");
        assert_eq!(upper.ty, DataType::String);
        assert_eq!(error_kind("\"abc\".Nope", &[]), CompileErrorKind::MemberNotFound);
        assert_eq!(error_kind("\"abc\".Substring(1.0)", &[]), CompileErrorKind::MemberNotFound);
    }

    #[test]
    fn indexing() {
        let chars = body("\"abc\"[1]");
        assert_eq!(chars.ty, DataType::CHAR);
        assert!(matches!(chars.kind, ExprKind::Call { .. }));

        let declared = [ParamSpec::named("xs", DataType::array(DataType::DOUBLE))];
        let element = parse("xs[0]", &declared).unwrap().body;
        assert_eq!(element.ty, DataType::DOUBLE);
        assert!(matches!(element.kind, ExprKind::Index { .. }));
        assert_eq!(error_kind("xs[0, 1]", &declared), CompileErrorKind::TypeMismatch);
        assert_eq!(error_kind("1[0]", &[]), CompileErrorKind::MemberNotFound);
    }

    #[test]
    fn brackets_must_match() {
        assert_eq!(error_kind("(1 + 2", &[]), CompileErrorKind::UnmatchedBracket);
        assert_eq!(error_kind("1 + 2)", &[]), CompileErrorKind::UnmatchedBracket);
        assert_eq!(error_kind("\"abc\".Substring(1]", &[]), CompileErrorKind::UnmatchedBracket);
        assert_eq!(error_kind("\"abc\"[1", &[]), CompileErrorKind::UnmatchedBracket);
    }

    #[test]
    fn assignment_and_increment_are_rejected() {
        let declared = [ParamSpec::named("x", DataType::INT)];
        assert_eq!(error_kind("x = 1", &declared), CompileErrorKind::UnknownConstruct);
        assert_eq!(error_kind("x += 1", &declared), CompileErrorKind::UnknownConstruct);
        assert_eq!(error_kind("x++", &declared), CompileErrorKind::UnknownConstruct);
        assert_eq!(error_kind("--x", &declared), CompileErrorKind::UnknownConstruct);
    }

    #[test]
    fn top_level_comma_is_a_syntax_error() {
        assert_eq!(error_kind("1, 2", &[]), CompileErrorKind::Syntax);
    }

    #[test]
    fn equality_operands() {
        let nullable_int = DataType::nullable(DataType::INT);
        assert_eq!(equality_operand(&DataType::INT, &DataType::INT), Some(DataType::INT));
        assert_eq!(
            equality_operand(&DataType::Null, &DataType::String),
            Some(DataType::String)
        );
        assert_eq!(equality_operand(&DataType::INT, &DataType::Null), None);
        assert_eq!(
            equality_operand(&nullable_int, &DataType::INT),
            Some(nullable_int.clone())
        );
        assert_eq!(
            equality_operand(&DataType::String, &DataType::class("System.Random")),
            Some(DataType::Object)
        );
        assert_eq!(equality_operand(&DataType::INT, &DataType::LONG), None);
    }
}
