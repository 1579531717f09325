//! Runtime conversions: the `Cast` nodes the parser inserted or the source
//! spelled out, plus `is` and `as`.
//!
//! A cast knows its static source type. That decides between a numeric
//! conversion (source is a primitive or nullable primitive) and an unboxing
//! check (source is `object`), where the value must already be the target
//! kind.

use textlambda_core::{DataType, RuntimeError, Value};

/// Convert `value`, statically typed `from`, to `to`.
pub fn convert(value: Value, from: &DataType, to: &DataType) -> Result<Value, RuntimeError> {
    if value.is_null() {
        return if to.accepts_null() {
            Ok(Value::Null)
        } else if from.nullable_inner().is_some() {
            Err(RuntimeError::NullValue)
        } else {
            Err(RuntimeError::NullReference {
                context: format!("conversion to '{to}'"),
            })
        };
    }

    let source = from.nullable_inner().unwrap_or(from);
    let target = to.nullable_inner().unwrap_or(to);
    match target {
        DataType::Object => Ok(value),
        DataType::Primitive(kind) if source.primitive().is_some() => {
            value.convert_primitive(*kind)
        }
        _ if value.conforms_to(target) => Ok(value),
        _ => Err(invalid_cast(&value, to)),
    }
}

/// `value is target`: false for `null`.
pub fn is_instance(value: &Value, target: &DataType) -> bool {
    !value.is_null() && value.conforms_to(target)
}

/// `value as target`: the value itself when it is an instance, else `null`.
pub fn try_as(value: Value, target: &DataType) -> Value {
    if is_instance(&value, target) {
        value
    } else {
        Value::Null
    }
}

pub(crate) fn invalid_cast(value: &Value, to: &DataType) -> RuntimeError {
    RuntimeError::InvalidCast {
        from: value.runtime_type().to_string(),
        to: to.to_string(),
    }
}
