//! Unary operators over primitive values.

use textlambda_core::{RuntimeError, Value};
use textlambda_parser::ast::UnaryOp;

use super::operand_error;

pub type UnaryFn = fn(Value) -> Result<Value, RuntimeError>;

pub fn unary_fn(op: UnaryOp) -> UnaryFn {
    match op {
        UnaryOp::Neg => negate,
        UnaryOp::Not => not,
        UnaryOp::BitNot => complement,
    }
}

/// Signed integers wrap, so negating the minimum value yields itself.
fn negate(operand: Value) -> Result<Value, RuntimeError> {
    Ok(match operand {
        Value::SByte(v) => Value::SByte(v.wrapping_neg()),
        Value::Short(v) => Value::Short(v.wrapping_neg()),
        Value::Int(v) => Value::Int(v.wrapping_neg()),
        Value::Long(v) => Value::Long(v.wrapping_neg()),
        Value::Float(v) => Value::Float(-v),
        Value::Double(v) => Value::Double(-v),
        Value::Decimal(v) => Value::Decimal(-v),
        other => return Err(operand_error("negation", &other, None)),
    })
}

fn not(operand: Value) -> Result<Value, RuntimeError> {
    match operand {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(operand_error("logical not", &other, None)),
    }
}

fn complement(operand: Value) -> Result<Value, RuntimeError> {
    Ok(match operand {
        Value::SByte(v) => Value::SByte(!v),
        Value::Byte(v) => Value::Byte(!v),
        Value::Short(v) => Value::Short(!v),
        Value::UShort(v) => Value::UShort(!v),
        Value::Int(v) => Value::Int(!v),
        Value::UInt(v) => Value::UInt(!v),
        Value::Long(v) => Value::Long(!v),
        Value::ULong(v) => Value::ULong(!v),
        other => return Err(operand_error("bitwise complement", &other, None)),
    })
}

#[cfg(test)]
mod tests {
    use textlambda_core::Decimal;

    use super::*;

    #[test]
    fn negation() {
        assert_eq!(unary_fn(UnaryOp::Neg)(Value::Int(5)), Ok(Value::Int(-5)));
        assert_eq!(unary_fn(UnaryOp::Neg)(Value::Int(i32::MIN)), Ok(Value::Int(i32::MIN)));
        assert_eq!(unary_fn(UnaryOp::Neg)(Value::Double(1.5)), Ok(Value::Double(-1.5)));
        assert_eq!(
            unary_fn(UnaryOp::Neg)(Value::Decimal(Decimal::ONE)),
            Ok(Value::Decimal(-Decimal::ONE))
        );
        assert!(unary_fn(UnaryOp::Neg)(Value::UInt(1)).is_err());
    }

    #[test]
    fn logical_and_bitwise_not() {
        assert_eq!(unary_fn(UnaryOp::Not)(Value::Bool(false)), Ok(Value::Bool(true)));
        assert_eq!(unary_fn(UnaryOp::BitNot)(Value::Int(0)), Ok(Value::Int(-1)));
        assert_eq!(unary_fn(UnaryOp::BitNot)(Value::Byte(0x0f)), Ok(Value::Byte(0xf0)));
        assert!(unary_fn(UnaryOp::Not)(Value::Int(1)).is_err());
    }
}
