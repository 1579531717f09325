//! Runtime semantics of the built-in operators.
//!
//! The parser has already checked and converted operand types, so each
//! operator here receives two values of the same primitive kind (shifts take
//! an `int` count). Lowering picks the function once per node:
//!
//! - [`binary`] - arithmetic, shifts, comparisons, equality and bitwise
//!   operators. `&&` and `||` short-circuit in the lowering instead.
//! - [`unary`] - negation, logical not and bitwise complement
//!
//! Integer arithmetic wraps; integer division by zero and `decimal` overflow
//! are reported as [`RuntimeError`]s.

use textlambda_core::{RuntimeError, Value};

pub mod binary;
pub mod unary;

pub use binary::{BinaryFn, binary_fn};
pub use unary::{UnaryFn, unary_fn};

/// Operands whose runtime shape does not fit the operator. Only reachable
/// when a host callable returns a value of a different type than it
/// declared.
fn operand_error(operation: &str, left: &Value, right: Option<&Value>) -> RuntimeError {
    let from = match right {
        Some(right) => format!("{} and {}", left.runtime_type(), right.runtime_type()),
        None => left.runtime_type().to_string(),
    };
    RuntimeError::InvalidCast {
        from,
        to: format!("an operand of {operation}"),
    }
}
