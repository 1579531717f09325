//! Runtime values flowing through compiled functions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::{DataType, HostObject, PrimitiveKind, RuntimeError};

/// A dynamically-typed value.
///
/// The compiler has already checked static types, so operations on `Value`
/// only re-check the variant where a host collaborator could have returned
/// something unexpected.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(Arc<str>),
    Array(ArrayValue),
    /// A `System.Type` value produced by `typeof`.
    Type(Arc<DataType>),
    Object(HostObject),
}

/// An immutable single-dimension array with its element type.
#[derive(Clone, Debug)]
pub struct ArrayValue {
    element: DataType,
    items: Arc<[Value]>,
}

impl ArrayValue {
    pub fn new(element: DataType, items: Vec<Value>) -> Self {
        Self {
            element,
            items: items.into(),
        }
    }

    pub fn element(&self) -> &DataType {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: i64) -> Result<&Value, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .ok_or(RuntimeError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
    }
}

/// Intermediate numeric form used by conversions.
enum Num {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn type_of(ty: DataType) -> Self {
        Value::Type(Arc::new(ty))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Char(_) => PrimitiveKind::Char,
            Value::SByte(_) => PrimitiveKind::SByte,
            Value::Byte(_) => PrimitiveKind::Byte,
            Value::Short(_) => PrimitiveKind::Short,
            Value::UShort(_) => PrimitiveKind::UShort,
            Value::Int(_) => PrimitiveKind::Int,
            Value::UInt(_) => PrimitiveKind::UInt,
            Value::Long(_) => PrimitiveKind::Long,
            Value::ULong(_) => PrimitiveKind::ULong,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Double(_) => PrimitiveKind::Double,
            Value::Decimal(_) => PrimitiveKind::Decimal,
            _ => return None,
        })
    }

    /// The dynamic type of this value; `Null` for the null reference.
    pub fn runtime_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::String(_) => DataType::String,
            Value::Array(array) => DataType::array(array.element.clone()),
            Value::Type(_) => DataType::class("System.Type"),
            Value::Object(object) => object.data_type().clone(),
            other => other
                .primitive_kind()
                .map(DataType::Primitive)
                .unwrap_or(DataType::Object),
        }
    }

    /// Whether this value may be stored in a slot of static type `ty`.
    pub fn conforms_to(&self, ty: &DataType) -> bool {
        match (self, ty) {
            (_, DataType::Object) => true,
            (Value::Null, ty) => ty.accepts_null(),
            (value, DataType::Nullable(inner)) => value.conforms_to(inner),
            (value, DataType::Primitive(kind)) => value.primitive_kind() == Some(*kind),
            (Value::String(_), DataType::String) => true,
            (Value::Array(array), DataType::Array(element)) => array.element == **element,
            (Value::Type(_), DataType::Class(class)) => &*class.name == "System.Type",
            (Value::Object(object), DataType::Class(class)) => object.is_instance_of(class),
            _ => false,
        }
    }

    /// Zero value for `ty`, used to fill `new T[n]`.
    pub fn default_for(ty: &DataType) -> Value {
        match ty {
            DataType::Primitive(kind) => match kind {
                PrimitiveKind::Bool => Value::Bool(false),
                PrimitiveKind::Char => Value::Char('\0'),
                PrimitiveKind::SByte => Value::SByte(0),
                PrimitiveKind::Byte => Value::Byte(0),
                PrimitiveKind::Short => Value::Short(0),
                PrimitiveKind::UShort => Value::UShort(0),
                PrimitiveKind::Int => Value::Int(0),
                PrimitiveKind::UInt => Value::UInt(0),
                PrimitiveKind::Long => Value::Long(0),
                PrimitiveKind::ULong => Value::ULong(0),
                PrimitiveKind::Float => Value::Float(0.0),
                PrimitiveKind::Double => Value::Double(0.0),
                PrimitiveKind::Decimal => Value::Decimal(Decimal::ZERO),
            },
            _ => Value::Null,
        }
    }

    /// Integral value widened to `i64`, for index arithmetic.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::SByte(v) => Some(i64::from(*v)),
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::UShort(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::UInt(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::ULong(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    fn as_num(&self) -> Option<Num> {
        Some(match self {
            Value::Char(c) => Num::Int(i128::from(u32::from(*c))),
            Value::SByte(v) => Num::Int(i128::from(*v)),
            Value::Byte(v) => Num::Int(i128::from(*v)),
            Value::Short(v) => Num::Int(i128::from(*v)),
            Value::UShort(v) => Num::Int(i128::from(*v)),
            Value::Int(v) => Num::Int(i128::from(*v)),
            Value::UInt(v) => Num::Int(i128::from(*v)),
            Value::Long(v) => Num::Int(i128::from(*v)),
            Value::ULong(v) => Num::Int(i128::from(*v)),
            Value::Float(v) => Num::Float(f64::from(*v)),
            Value::Double(v) => Num::Float(*v),
            Value::Decimal(v) => Num::Decimal(*v),
            _ => return None,
        })
    }

    /// Explicit conversion between numeric and `char` kinds.
    ///
    /// Integer narrowing wraps and float-to-integer truncates (saturating at
    /// the target range); conversions out of `decimal` are range-checked.
    pub fn convert_primitive(&self, target: PrimitiveKind) -> Result<Value, RuntimeError> {
        if self.primitive_kind() == Some(target) {
            return Ok(self.clone());
        }
        let invalid = || RuntimeError::InvalidCast {
            from: self.runtime_type().to_string(),
            to: target.alias().to_string(),
        };
        if target == PrimitiveKind::Bool {
            return Err(invalid());
        }
        match self.as_num().ok_or_else(invalid)? {
            Num::Int(i) => from_int(i, target),
            Num::Float(f) => from_float(f, target),
            Num::Decimal(d) => from_decimal(d, target),
        }
    }

    /// Value equality as `==` sees it: numeric and string contents compare,
    /// objects compare by reference.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::SByte(a), Value::SByte(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::UShort(a), Value::UShort(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::ULong(a), Value::ULong(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.items, &b.items),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Ordering between two values of the same primitive kind.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Char(a), Value::Char(b)) => a.partial_cmp(b),
            (Value::SByte(a), Value::SByte(b)) => a.partial_cmp(b),
            (Value::Byte(a), Value::Byte(b)) => a.partial_cmp(b),
            (Value::Short(a), Value::Short(b)) => a.partial_cmp(b),
            (Value::UShort(a), Value::UShort(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::UInt(a), Value::UInt(b)) => a.partial_cmp(b),
            (Value::Long(a), Value::Long(b)) => a.partial_cmp(b),
            (Value::ULong(a), Value::ULong(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

fn overflow() -> RuntimeError {
    RuntimeError::Overflow {
        operation: "conversion",
    }
}

fn char_from(code: u32) -> Result<Value, RuntimeError> {
    char::from_u32(code)
        .map(Value::Char)
        .ok_or_else(|| RuntimeError::InvalidCast {
            from: format!("{code:#x}"),
            to: "char".to_string(),
        })
}

fn from_int(i: i128, target: PrimitiveKind) -> Result<Value, RuntimeError> {
    Ok(match target {
        PrimitiveKind::Char => return char_from(u32::from(i as u16)),
        PrimitiveKind::SByte => Value::SByte(i as i8),
        PrimitiveKind::Byte => Value::Byte(i as u8),
        PrimitiveKind::Short => Value::Short(i as i16),
        PrimitiveKind::UShort => Value::UShort(i as u16),
        PrimitiveKind::Int => Value::Int(i as i32),
        PrimitiveKind::UInt => Value::UInt(i as u32),
        PrimitiveKind::Long => Value::Long(i as i64),
        PrimitiveKind::ULong => Value::ULong(i as u64),
        PrimitiveKind::Float => Value::Float(i as f32),
        PrimitiveKind::Double => Value::Double(i as f64),
        PrimitiveKind::Decimal => Value::Decimal(Decimal::from_i128(i).ok_or_else(overflow)?),
        PrimitiveKind::Bool => return Err(overflow()),
    })
}

fn from_float(f: f64, target: PrimitiveKind) -> Result<Value, RuntimeError> {
    Ok(match target {
        PrimitiveKind::Char => return char_from(u32::from(f as u16)),
        PrimitiveKind::SByte => Value::SByte(f as i8),
        PrimitiveKind::Byte => Value::Byte(f as u8),
        PrimitiveKind::Short => Value::Short(f as i16),
        PrimitiveKind::UShort => Value::UShort(f as u16),
        PrimitiveKind::Int => Value::Int(f as i32),
        PrimitiveKind::UInt => Value::UInt(f as u32),
        PrimitiveKind::Long => Value::Long(f as i64),
        PrimitiveKind::ULong => Value::ULong(f as u64),
        PrimitiveKind::Float => Value::Float(f as f32),
        PrimitiveKind::Double => Value::Double(f),
        PrimitiveKind::Decimal => Value::Decimal(Decimal::from_f64(f).ok_or_else(overflow)?),
        PrimitiveKind::Bool => return Err(overflow()),
    })
}

fn from_decimal(d: Decimal, target: PrimitiveKind) -> Result<Value, RuntimeError> {
    if target.is_floating() {
        let f = d.to_f64().ok_or_else(overflow)?;
        return from_float(f, target);
    }
    let whole = d.trunc().to_i128().ok_or_else(overflow)?;
    macro_rules! checked {
        ($variant:ident, $ty:ty) => {
            Value::$variant(<$ty>::try_from(whole).map_err(|_| overflow())?)
        };
    }
    Ok(match target {
        PrimitiveKind::Char => return char_from(u32::try_from(whole).map_err(|_| overflow())?),
        PrimitiveKind::SByte => checked!(SByte, i8),
        PrimitiveKind::Byte => checked!(Byte, u8),
        PrimitiveKind::Short => checked!(Short, i16),
        PrimitiveKind::UShort => checked!(UShort, u16),
        PrimitiveKind::Int => checked!(Int, i32),
        PrimitiveKind::UInt => checked!(UInt, u32),
        PrimitiveKind::Long => checked!(Long, i64),
        PrimitiveKind::ULong => checked!(ULong, u64),
        PrimitiveKind::Decimal => Value::Decimal(d),
        _ => return Err(overflow()),
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_infinite() {
        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{v}")
    }
}

/// Text form used by string concatenation and `ToString()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Char(c) => write!(f, "{c}"),
            Value::SByte(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::UShort(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::ULong(v) => write!(f, "{v}"),
            Value::Float(v) => write_float(f, f64::from(*v)),
            Value::Double(v) => write_float(f, *v),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
            Value::Array(array) => write!(f, "{}[]", array.element.full_name()),
            Value::Type(ty) => f.write_str(&ty.full_name()),
            Value::Object(object) => f.write_str(&object.data_type().full_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(array) => f.debug_list().entries(array.items.iter()).finish(),
            Value::Type(ty) => write!(f, "Type({ty})"),
            Value::Object(object) => write!(f, "{object:?}"),
            other => write!(
                f,
                "{}({other})",
                other.primitive_kind().map(PrimitiveKind::alias).unwrap_or("?")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_int_truncates() {
        assert_eq!(
            Value::Double(3.9).convert_primitive(PrimitiveKind::Int),
            Ok(Value::Int(3))
        );
        assert_eq!(
            Value::Double(-3.9).convert_primitive(PrimitiveKind::Long),
            Ok(Value::Long(-3))
        );
    }

    #[test]
    fn integer_narrowing_wraps() {
        assert_eq!(
            Value::Int(300).convert_primitive(PrimitiveKind::Byte),
            Ok(Value::Byte(44))
        );
    }

    #[test]
    fn char_round_trips_through_int() {
        assert_eq!(
            Value::Char('a').convert_primitive(PrimitiveKind::Int),
            Ok(Value::Int(97))
        );
        assert_eq!(
            Value::Int(66).convert_primitive(PrimitiveKind::Char),
            Ok(Value::Char('B'))
        );
    }

    #[test]
    fn decimal_out_of_range_overflows() {
        let big = Value::Decimal(Decimal::from(5_000_000_000i64));
        assert!(matches!(
            big.convert_primitive(PrimitiveKind::Int),
            Err(RuntimeError::Overflow { .. })
        ));
        assert_eq!(
            big.convert_primitive(PrimitiveKind::Long),
            Ok(Value::Long(5_000_000_000))
        );
    }

    #[test]
    fn bool_does_not_convert() {
        assert!(matches!(
            Value::Int(1).convert_primitive(PrimitiveKind::Bool),
            Err(RuntimeError::InvalidCast { .. })
        ));
    }

    #[test]
    fn display_matches_host_conventions() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Double(1.0).to_string(), "1");
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Double(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn conformance() {
        assert!(Value::Int(1).conforms_to(&DataType::INT));
        assert!(!Value::Int(1).conforms_to(&DataType::LONG));
        assert!(Value::Null.conforms_to(&DataType::nullable(DataType::INT)));
        assert!(Value::Int(1).conforms_to(&DataType::nullable(DataType::INT)));
        assert!(!Value::Null.conforms_to(&DataType::INT));
        assert!(Value::string("s").conforms_to(&DataType::Object));
    }

    #[test]
    fn array_index_bounds() {
        let array = ArrayValue::new(DataType::INT, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(array.get(1), Ok(&Value::Int(2)));
        assert!(matches!(
            array.get(2),
            Err(RuntimeError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(array.get(-1).is_err());
    }
}
