//! Binary operators over primitive values.

use std::cmp::Ordering;

use textlambda_core::{RuntimeError, Value};
use textlambda_parser::ast::BinaryOp;

use super::operand_error;

pub type BinaryFn = fn(Value, Value) -> Result<Value, RuntimeError>;

/// The evaluation function for `op`; `None` for the short-circuiting `&&`
/// and `||`, which need control over when the right operand runs.
pub fn binary_fn(op: BinaryOp) -> Option<BinaryFn> {
    Some(match op {
        BinaryOp::Add => add,
        BinaryOp::Sub => sub,
        BinaryOp::Mul => mul,
        BinaryOp::Div => div,
        BinaryOp::Rem => rem,
        BinaryOp::Shl => shl,
        BinaryOp::Shr => shr,
        BinaryOp::Less => less,
        BinaryOp::Greater => greater,
        BinaryOp::LessEqual => less_equal,
        BinaryOp::GreaterEqual => greater_equal,
        BinaryOp::Equal => equal,
        BinaryOp::NotEqual => not_equal,
        BinaryOp::BitAnd => bit_and,
        BinaryOp::BitOr => bit_or,
        BinaryOp::BitXor => bit_xor,
        BinaryOp::And | BinaryOp::Or => return None,
    })
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! arithmetic {
    ($name:ident, $wrapping:ident, $op:tt, $checked:ident, $what:literal) => {
        fn $name(left: Value, right: Value) -> Result<Value, RuntimeError> {
            Ok(match (left, right) {
                (Value::SByte(a), Value::SByte(b)) => Value::SByte(a.$wrapping(b)),
                (Value::Byte(a), Value::Byte(b)) => Value::Byte(a.$wrapping(b)),
                (Value::Short(a), Value::Short(b)) => Value::Short(a.$wrapping(b)),
                (Value::UShort(a), Value::UShort(b)) => Value::UShort(a.$wrapping(b)),
                (Value::Int(a), Value::Int(b)) => Value::Int(a.$wrapping(b)),
                (Value::UInt(a), Value::UInt(b)) => Value::UInt(a.$wrapping(b)),
                (Value::Long(a), Value::Long(b)) => Value::Long(a.$wrapping(b)),
                (Value::ULong(a), Value::ULong(b)) => Value::ULong(a.$wrapping(b)),
                (Value::Float(a), Value::Float(b)) => Value::Float(a $op b),
                (Value::Double(a), Value::Double(b)) => Value::Double(a $op b),
                (Value::Decimal(a), Value::Decimal(b)) => Value::Decimal(
                    a.$checked(b)
                        .ok_or(RuntimeError::Overflow { operation: $what })?,
                ),
                (left, right) => return Err(operand_error($what, &left, Some(&right))),
            })
        }
    };
}

/// Like [`arithmetic!`] but integer and `decimal` divisors are checked for
/// zero first. Floating-point division follows IEEE 754.
macro_rules! division {
    ($name:ident, $wrapping:ident, $op:tt, $checked:ident, $what:literal) => {
        fn $name(left: Value, right: Value) -> Result<Value, RuntimeError> {
            Ok(match (left, right) {
                (Value::SByte(a), Value::SByte(b)) => Value::SByte(a.$wrapping(nonzero(b)?)),
                (Value::Byte(a), Value::Byte(b)) => Value::Byte(a.$wrapping(nonzero(b)?)),
                (Value::Short(a), Value::Short(b)) => Value::Short(a.$wrapping(nonzero(b)?)),
                (Value::UShort(a), Value::UShort(b)) => Value::UShort(a.$wrapping(nonzero(b)?)),
                (Value::Int(a), Value::Int(b)) => Value::Int(a.$wrapping(nonzero(b)?)),
                (Value::UInt(a), Value::UInt(b)) => Value::UInt(a.$wrapping(nonzero(b)?)),
                (Value::Long(a), Value::Long(b)) => Value::Long(a.$wrapping(nonzero(b)?)),
                (Value::ULong(a), Value::ULong(b)) => Value::ULong(a.$wrapping(nonzero(b)?)),
                (Value::Float(a), Value::Float(b)) => Value::Float(a $op b),
                (Value::Double(a), Value::Double(b)) => Value::Double(a $op b),
                (Value::Decimal(a), Value::Decimal(b)) => {
                    if b.is_zero() {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    Value::Decimal(
                        a.$checked(b)
                            .ok_or(RuntimeError::Overflow { operation: $what })?,
                    )
                }
                (left, right) => return Err(operand_error($what, &left, Some(&right))),
            })
        }
    };
}

arithmetic!(add, wrapping_add, +, checked_add, "addition");
arithmetic!(sub, wrapping_sub, -, checked_sub, "subtraction");
arithmetic!(mul, wrapping_mul, *, checked_mul, "multiplication");
division!(div, wrapping_div, /, checked_div, "division");
division!(rem, wrapping_rem, %, checked_rem, "remainder");

#[inline]
fn nonzero<T: PartialEq + Default>(divisor: T) -> Result<T, RuntimeError> {
    if divisor == T::default() {
        Err(RuntimeError::DivisionByZero)
    } else {
        Ok(divisor)
    }
}

// ============================================================================
// Shifts
// ============================================================================

macro_rules! shift {
    ($name:ident, $method:ident, $what:literal) => {
        /// The count is masked to the operand's bit width.
        fn $name(left: Value, right: Value) -> Result<Value, RuntimeError> {
            let count = match right {
                Value::Int(n) => n as u32,
                other => return Err(operand_error($what, &left, Some(&other))),
            };
            Ok(match left {
                Value::SByte(a) => Value::SByte(a.$method(count)),
                Value::Byte(a) => Value::Byte(a.$method(count)),
                Value::Short(a) => Value::Short(a.$method(count)),
                Value::UShort(a) => Value::UShort(a.$method(count)),
                Value::Int(a) => Value::Int(a.$method(count)),
                Value::UInt(a) => Value::UInt(a.$method(count)),
                Value::Long(a) => Value::Long(a.$method(count)),
                Value::ULong(a) => Value::ULong(a.$method(count)),
                other => return Err(operand_error($what, &other, None)),
            })
        }
    };
}

shift!(shl, wrapping_shl, "left shift");
shift!(shr, wrapping_shr, "right shift");

// ============================================================================
// Comparison and equality
// ============================================================================

fn ordering(left: &Value, right: &Value) -> Result<Option<Ordering>, RuntimeError> {
    match (left.primitive_kind(), right.primitive_kind()) {
        (Some(a), Some(b)) if a == b => Ok(left.compare(right)),
        _ => Err(operand_error("comparison", left, Some(right))),
    }
}

macro_rules! relational {
    ($name:ident, $($ord:ident)|+) => {
        /// Unordered operands (`NaN`) compare false.
        fn $name(left: Value, right: Value) -> Result<Value, RuntimeError> {
            let ord = ordering(&left, &right)?;
            Ok(Value::Bool(matches!(ord, $(Some(Ordering::$ord))|+)))
        }
    };
}

relational!(less, Less);
relational!(greater, Greater);
relational!(less_equal, Less | Equal);
relational!(greater_equal, Greater | Equal);

fn equal(left: Value, right: Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(left.equals(&right)))
}

fn not_equal(left: Value, right: Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(!left.equals(&right)))
}

// ============================================================================
// Bitwise
// ============================================================================

macro_rules! bitwise {
    ($name:ident, $op:tt, $what:literal) => {
        /// Integral operands, or `bool` operands without short-circuiting.
        fn $name(left: Value, right: Value) -> Result<Value, RuntimeError> {
            Ok(match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Value::Bool(a $op b),
                (Value::SByte(a), Value::SByte(b)) => Value::SByte(a $op b),
                (Value::Byte(a), Value::Byte(b)) => Value::Byte(a $op b),
                (Value::Short(a), Value::Short(b)) => Value::Short(a $op b),
                (Value::UShort(a), Value::UShort(b)) => Value::UShort(a $op b),
                (Value::Int(a), Value::Int(b)) => Value::Int(a $op b),
                (Value::UInt(a), Value::UInt(b)) => Value::UInt(a $op b),
                (Value::Long(a), Value::Long(b)) => Value::Long(a $op b),
                (Value::ULong(a), Value::ULong(b)) => Value::ULong(a $op b),
                (left, right) => return Err(operand_error($what, &left, Some(&right))),
            })
        }
    };
}

bitwise!(bit_and, &, "bitwise and");
bitwise!(bit_or, |, "bitwise or");
bitwise!(bit_xor, ^, "bitwise xor");
