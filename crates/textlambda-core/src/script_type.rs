//! Conversions between Rust values and expression [`Value`]s.
//!
//! [`ScriptType`] gives a Rust type a static [`DataType`], which is what lets
//! a typed signature such as `(f64, f64, i32) -> f64` be described without
//! spelling out `DataType`s by hand.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{ArrayValue, DataType, HostClass, HostObject, Value, ValueMismatch};

pub trait ScriptType: Sized {
    fn data_type() -> DataType;
    fn into_value(self) -> Value;
    fn from_value(value: Value) -> Result<Self, ValueMismatch>;
}

macro_rules! primitive_script_type {
    ($($ty:ty => $variant:ident, $const:ident;)*) => {
        $(
            impl ScriptType for $ty {
                #[inline]
                fn data_type() -> DataType {
                    DataType::$const
                }

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ValueMismatch::new(DataType::$const, other.runtime_type())),
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Value {
                    Value::$variant(v)
                }
            }
        )*
    };
}

primitive_script_type! {
    bool => Bool, BOOL;
    char => Char, CHAR;
    i8 => SByte, SBYTE;
    u8 => Byte, BYTE;
    i16 => Short, SHORT;
    u16 => UShort, USHORT;
    i32 => Int, INT;
    u32 => UInt, UINT;
    i64 => Long, LONG;
    u64 => ULong, ULONG;
    f32 => Float, FLOAT;
    f64 => Double, DOUBLE;
    Decimal => Decimal, DECIMAL;
}

impl ScriptType for String {
    fn data_type() -> DataType {
        DataType::String
    }

    fn into_value(self) -> Value {
        Value::String(self.into())
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(ValueMismatch::new("string", other.runtime_type())),
        }
    }
}

impl ScriptType for Arc<str> {
    fn data_type() -> DataType {
        DataType::String
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ValueMismatch::new("string", other.runtime_type())),
        }
    }
}

/// `void`: methods with no result evaluate to `null`.
impl ScriptType for () {
    fn data_type() -> DataType {
        DataType::Void
    }

    fn into_value(self) -> Value {
        Value::Null
    }

    fn from_value(_value: Value) -> Result<Self, ValueMismatch> {
        Ok(())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s.into())
    }
}

/// `object`: any value passes through unchanged.
impl ScriptType for Value {
    fn data_type() -> DataType {
        DataType::Object
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        Ok(value)
    }
}

/// `T?` for value types; reference types already admit `null`.
impl<T: ScriptType> ScriptType for Option<T> {
    fn data_type() -> DataType {
        let inner = T::data_type();
        if inner.accepts_null() {
            inner
        } else {
            DataType::nullable(inner)
        }
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ScriptType> ScriptType for Vec<T> {
    fn data_type() -> DataType {
        DataType::array(T::data_type())
    }

    fn into_value(self) -> Value {
        let items = self.into_iter().map(T::into_value).collect();
        Value::Array(ArrayValue::new(T::data_type(), items))
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Array(array) => array
                .items()
                .iter()
                .cloned()
                .map(T::from_value)
                .collect(),
            other => Err(ValueMismatch::new(Self::data_type(), other.runtime_type())),
        }
    }
}

/// Registered host classes travel as shared handles.
impl<T: HostClass> ScriptType for Arc<T> {
    fn data_type() -> DataType {
        DataType::class(T::TYPE_NAME)
    }

    fn into_value(self) -> Value {
        Value::Object(HostObject::from_arc(self))
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match &value {
            Value::Object(object) => object
                .downcast_arc::<T>()
                .ok_or_else(|| ValueMismatch::new(T::TYPE_NAME, object.data_type())),
            other => Err(ValueMismatch::new(T::TYPE_NAME, other.runtime_type())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_types_map_to_their_kinds() {
        assert_eq!(<f64 as ScriptType>::data_type(), DataType::DOUBLE);
        assert_eq!(<u64 as ScriptType>::data_type(), DataType::ULONG);
        assert_eq!(i32::from_value(Value::Int(7)), Ok(7));
        assert!(i32::from_value(Value::Long(7)).is_err());
    }

    #[test]
    fn option_maps_to_nullable_for_value_types_only() {
        assert_eq!(
            <Option<i32> as ScriptType>::data_type(),
            DataType::nullable(DataType::INT)
        );
        assert_eq!(<Option<String> as ScriptType>::data_type(), DataType::String);
        assert_eq!(Option::<i32>::from_value(Value::Null), Ok(None));
        assert_eq!(Some(5i32).into_value(), Value::Int(5));
    }

    #[test]
    fn vec_maps_to_array() {
        let value = vec![1.5f64, 2.5].into_value();
        assert!(value.conforms_to(&DataType::array(DataType::DOUBLE)));
        assert_eq!(Vec::<f64>::from_value(value), Ok(vec![1.5, 2.5]));
    }

    struct Counter;
    impl HostClass for Counter {
        const TYPE_NAME: &'static str = "Demo.Counter";
    }

    #[test]
    fn host_class_handles() {
        assert_eq!(<Arc<Counter>>::data_type(), DataType::class("Demo.Counter"));
        let value = Arc::new(Counter).into_value();
        assert!(<Arc<Counter>>::from_value(value).is_ok());
        assert!(<Arc<Counter>>::from_value(Value::Int(1)).is_err());
    }
}
