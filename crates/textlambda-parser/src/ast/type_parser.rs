//! Reading type names: dotted paths, generic arguments and the `?`/`[]`
//! suffixes.
//!
//! Type reads are tentative. A `false` start (an identifier that names no
//! type, a `<` that is really less-than) returns `None`, and the caller
//! rewinds to a [`Mark`](crate::lexer::Mark) it saved beforehand.

use textlambda_core::{CompileError, DataType};
use tracing::trace;

use super::parser::Parser;
use crate::lexer::{TokenKind, describe};

impl<'a, 'ast> Parser<'a, 'ast> {
    /// A full type: path, optional `?`, then any number of `[]`.
    pub(crate) fn read_type(&mut self) -> Option<DataType> {
        let mut ty = self.read_type_path()?;
        if self.stream.check(TokenKind::Question) && self.nullable_suffix_follows() {
            self.stream.advance();
            if !ty.accepts_null() {
                ty = DataType::nullable(ty);
            }
        }
        while self.stream.check(TokenKind::LeftBracket)
            && self.stream.peek_nth(1).kind == TokenKind::RightBracket
        {
            self.stream.advance();
            self.stream.advance();
            ty = DataType::array(ty);
        }
        Some(ty)
    }

    /// The shortest dotted prefix that names a type, closing it over generic
    /// arguments when a valid `<...>` list follows a segment.
    pub(crate) fn read_type_path(&mut self) -> Option<DataType> {
        let first = self.stream.peek();
        if first.kind != TokenKind::Identifier {
            return None;
        }
        self.stream.advance();
        let mut name = first.lexeme.to_string();

        loop {
            if self.stream.check(TokenKind::Less) {
                let mark = self.stream.save();
                let generic = self
                    .read_type_args()
                    .and_then(|args| self.resolve_generic(&name, &args));
                if generic.is_some() {
                    return generic;
                }
                trace!(name = %name, "'<' does not open a type argument list, rolling back");
                self.stream.restore(mark);
            }
            if let Some(ty) = self.resolve_type_name(&name) {
                return Some(ty);
            }
            if self.stream.check(TokenKind::Dot)
                && self.stream.peek_nth(1).kind == TokenKind::Identifier
            {
                self.stream.advance();
                name.push('.');
                name.push_str(self.stream.advance().lexeme);
            } else {
                return None;
            }
        }
    }

    fn read_type_args(&mut self) -> Option<Vec<DataType>> {
        if !self.stream.eat(TokenKind::Less) {
            return None;
        }
        let mut args = vec![self.read_type()?];
        loop {
            if self.stream.eat(TokenKind::Comma) {
                args.push(self.read_type()?);
            } else if self.stream.eat(TokenKind::Greater) || self.stream.split_shift() {
                return Some(args);
            } else {
                return None;
            }
        }
    }

    /// Whether the `?` at the cursor is a nullable suffix rather than the
    /// conditional operator.
    fn nullable_suffix_follows(&self) -> bool {
        use TokenKind::*;
        match self.stream.peek_nth(1).kind {
            RightParen | RightBracket | RightBrace | Greater | GreaterGreater | Comma
            | LeftBracket | Eof | EqualEqual | BangEqual | AmpAmp | PipePipe
            | QuestionQuestion => true,
            // `(int? a, ...)` in a typed lambda header
            Identifier => matches!(self.stream.peek_nth(2).kind, Comma | RightParen),
            _ => false,
        }
    }

    /// [`read_type`](Self::read_type) where a type is mandatory.
    pub(crate) fn expect_type(&mut self) -> Result<DataType, CompileError> {
        let start = self.stream.peek();
        let mark = self.stream.save();
        if let Some(ty) = self.read_type() {
            return Ok(ty);
        }
        self.stream.restore(mark);

        if start.kind != TokenKind::Identifier {
            return Err(CompileError::syntax(
                start.span,
                format!("expected a type name, found '{}'", describe(&start)),
            ));
        }
        let mut name = self.stream.advance().lexeme.to_string();
        while self.stream.check(TokenKind::Dot)
            && self.stream.peek_nth(1).kind == TokenKind::Identifier
        {
            self.stream.advance();
            name.push('.');
            name.push_str(self.stream.advance().lexeme);
        }
        Err(CompileError::type_not_found(self.span_from(start.span), name))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use textlambda_core::CompileErrorKind;

    use super::*;
    use crate::lexer::Lexer;

    fn read(source: &str, namespaces: &[String]) -> (Option<DataType>, TokenKind) {
        let registry = textlambda_modules::standard_registry().unwrap();
        let arena = Bump::new();
        let tokens = Lexer::new(source, &arena).tokenize().unwrap();
        let mut parser = Parser::new(tokens, &registry, namespaces);
        let ty = parser.read_type();
        (ty, parser.stream.peek().kind)
    }

    fn system() -> Vec<String> {
        vec!["System".to_string()]
    }

    #[test]
    fn aliases_and_qualified_names() {
        assert_eq!(read("int", &[]).0, Some(DataType::INT));
        assert_eq!(read("System.Int32", &[]).0, Some(DataType::INT));
        assert_eq!(read("Math", &system()).0, Some(DataType::class("System.Math")));
        assert_eq!(read("Math", &[]).0, None);
    }

    #[test]
    fn suffixes() {
        assert_eq!(read("int?", &[]).0, Some(DataType::nullable(DataType::INT)));
        assert_eq!(read("string?", &[]).0, Some(DataType::String));
        assert_eq!(
            read("double[][]", &[]).0,
            Some(DataType::array(DataType::array(DataType::DOUBLE)))
        );
        // `int[5]` is an array creation bound, not a suffix
        assert_eq!(read("int[5]", &[]), (Some(DataType::INT), TokenKind::LeftBracket));
    }

    #[test]
    fn question_before_an_operand_is_not_a_suffix() {
        assert_eq!(read("int ? a : b", &[]), (Some(DataType::INT), TokenKind::Question));
    }

    #[test]
    fn generic_arguments() {
        let (ty, _) = read("List<int>", &["System.Collections.Generic".to_string()]);
        assert_eq!(
            ty,
            Some(DataType::generic(
                "System.Collections.Generic.List`1",
                vec![DataType::INT]
            ))
        );
    }

    #[test]
    fn nested_generic_arguments_split_the_shift() {
        let ns = ["System.Collections.Generic".to_string()];
        let (ty, next) = read("Dictionary<string, List<int>> x", &ns);
        let list = DataType::generic("System.Collections.Generic.List`1", vec![DataType::INT]);
        assert_eq!(
            ty,
            Some(DataType::generic(
                "System.Collections.Generic.Dictionary`2",
                vec![DataType::String, list]
            ))
        );
        assert_eq!(next, TokenKind::Identifier);
    }

    #[test]
    fn unknown_type_reports_the_dotted_name() {
        let registry = textlambda_modules::standard_registry().unwrap();
        let arena = Bump::new();
        let tokens = Lexer::new("Foo.Bar", &arena).tokenize().unwrap();
        let mut parser = Parser::new(tokens, &registry, &[]);
        let err = parser.expect_type().unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::TypeNotFound);
        assert!(err.to_string().contains("Foo.Bar"));
    }
}
