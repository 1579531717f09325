//! Typed expression trees and the parser that builds them.
//!
//! Parsing and resolution happen in one pass: every node is created with
//! its static type, using the [`TypeUniverse`](textlambda_registry::TypeUniverse)
//! handed to the [`Parser`].
//!
//! # Example
//!
//! ```
//! use textlambda_core::DataType;
//! use textlambda_parser::ast::ParamSpec;
//!
//! let registry = textlambda_modules::standard_registry().unwrap();
//! let declared = [ParamSpec::typed(DataType::INT), ParamSpec::typed(DataType::INT)];
//! let parsed = textlambda_parser::parse("(x, y) => x * 2 + y", &registry, Some(&declared), None, &[]).unwrap();
//! assert_eq!(parsed.body.ty, DataType::INT);
//! ```

pub mod expr;
pub mod ops;
pub mod promotion;
pub mod scope;

mod expr_parser;
mod lambda;
mod parser;
mod primary;
mod type_parser;

pub use expr::{ArrayInit, Expr, ExprKind, Initializer};
pub use lambda::ParsedLambda;
pub use ops::{BinaryOp, Fixity, TypeTestOp, UnaryOp, precedence};
pub use parser::{Bracket, Parser};
pub use scope::{DEFAULT_INSTANCE_NAME, ParamSpec, Parameter, ParameterList};
