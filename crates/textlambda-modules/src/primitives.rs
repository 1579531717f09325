//! Members of the built-in value types.

use std::str::FromStr;

use textlambda_core::{DataType, Decimal, NativeError, RegistrationError, ScriptType, Value};
use textlambda_registry::{CallContext, ClassBuilder, TypeRegistry};

fn parse<T: FromStr + ScriptType>(ctx: &CallContext<'_>) -> Result<Value, NativeError> {
    let text: String = ctx.arg(0)?;
    text.trim()
        .parse::<T>()
        .map(T::into_value)
        .map_err(|_| NativeError::other(format!("input string '{text}' was not in a correct format")))
}

macro_rules! numeric {
    ($registry:expr, $($ty:ty => $const:ident),* $(,)?) => {
        $(
            ClassBuilder::builtin($registry, DataType::$const)
                .constant("MaxValue", <$ty>::MAX)
                .constant("MinValue", <$ty>::MIN)
                .static_method_raw("Parse", vec![DataType::String], DataType::$const, parse::<$ty>)
                .build()?;
        )*
    };
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    numeric!(registry,
        u8 => BYTE,
        i8 => SBYTE,
        i16 => SHORT,
        u16 => USHORT,
        i32 => INT,
        u32 => UINT,
        i64 => LONG,
        u64 => ULONG,
        Decimal => DECIMAL,
    );

    ClassBuilder::builtin(registry, DataType::DOUBLE)
        .constant("MaxValue", f64::MAX)
        .constant("MinValue", f64::MIN)
        .constant("Epsilon", f64::from_bits(1))
        .constant("NaN", f64::NAN)
        .constant("PositiveInfinity", f64::INFINITY)
        .constant("NegativeInfinity", f64::NEG_INFINITY)
        .static_method("IsNaN", |x: f64| x.is_nan())
        .static_method("IsInfinity", |x: f64| x.is_infinite())
        .static_method_raw("Parse", vec![DataType::String], DataType::DOUBLE, parse::<f64>)
        .build()?;

    ClassBuilder::builtin(registry, DataType::FLOAT)
        .constant("MaxValue", f32::MAX)
        .constant("MinValue", f32::MIN)
        .constant("NaN", f32::NAN)
        .static_method("IsNaN", |x: f32| x.is_nan())
        .static_method_raw("Parse", vec![DataType::String], DataType::FLOAT, parse::<f32>)
        .build()?;

    ClassBuilder::builtin(registry, DataType::BOOL)
        .static_method_raw("Parse", vec![DataType::String], DataType::BOOL, |ctx| {
            let text: String = ctx.arg(0)?;
            match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(NativeError::other(format!(
                    "string '{text}' was not recognized as a valid Boolean"
                ))),
            }
        })
        .build()?;

    ClassBuilder::builtin(registry, DataType::CHAR)
        .constant("MaxValue", '\u{ffff}')
        .constant("MinValue", '\0')
        .static_method("IsDigit", |c: char| c.is_ascii_digit())
        .static_method("IsLetter", |c: char| c.is_alphabetic())
        .static_method("IsWhiteSpace", |c: char| c.is_whitespace())
        .static_method("IsUpper", |c: char| c.is_uppercase())
        .static_method("IsLower", |c: char| c.is_lowercase())
        .static_method("ToUpper", |c: char| c.to_uppercase().next().unwrap_or(c))
        .static_method("ToLower", |c: char| c.to_lowercase().next().unwrap_or(c))
        .build()?;

    Ok(())
}
