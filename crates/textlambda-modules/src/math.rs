//! `System.Math` and `System.Convert`.
//!
//! Rounding follows the host convention of rounding halves to even.

use textlambda_core::{DataType, Decimal, NativeError, RegistrationError, Value};
use textlambda_registry::{ClassBuilder, TypeRegistry};

fn round_digits(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round_ties_even() / scale
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, NativeError> {
    text.trim()
        .parse()
        .map_err(|_| NativeError::other(format!("input string '{text}' was not in a correct format")))
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    ClassBuilder::new(registry, "System.Math")
        .static_class()
        // =====================================================================
        // CONSTANTS
        // =====================================================================
        .constant("PI", std::f64::consts::PI)
        .constant("E", std::f64::consts::E)
        // =====================================================================
        // TRIGONOMETRY
        // =====================================================================
        .static_method("Sin", |x: f64| x.sin())
        .static_method("Cos", |x: f64| x.cos())
        .static_method("Tan", |x: f64| x.tan())
        .static_method("Asin", |x: f64| x.asin())
        .static_method("Acos", |x: f64| x.acos())
        .static_method("Atan", |x: f64| x.atan())
        .static_method("Atan2", |y: f64, x: f64| y.atan2(x))
        .static_method("Sinh", |x: f64| x.sinh())
        .static_method("Cosh", |x: f64| x.cosh())
        .static_method("Tanh", |x: f64| x.tanh())
        // =====================================================================
        // POWERS AND LOGARITHMS
        // =====================================================================
        .static_method("Sqrt", |x: f64| x.sqrt())
        .static_method("Pow", |x: f64, y: f64| x.powf(y))
        .static_method("Exp", |x: f64| x.exp())
        .static_method("Log", |x: f64| x.ln())
        .static_method("Log", |x: f64, base: f64| x.log(base))
        .static_method("Log10", |x: f64| x.log10())
        // =====================================================================
        // ROUNDING
        // =====================================================================
        .static_method("Floor", |x: f64| x.floor())
        .static_method("Ceiling", |x: f64| x.ceil())
        .static_method("Truncate", |x: f64| x.trunc())
        .static_method("Round", |x: f64| x.round_ties_even())
        .static_method("Round", round_digits)
        .static_method("Round", |d: Decimal| d.round())
        // =====================================================================
        // SIGN, MAGNITUDE, COMPARISON
        // =====================================================================
        .static_method("Abs", |x: f64| x.abs())
        .static_method("Abs", |x: f32| x.abs())
        .static_method("Abs", |x: i32| x.wrapping_abs())
        .static_method("Abs", |x: i64| x.wrapping_abs())
        .static_method("Abs", |x: Decimal| x.abs())
        .static_method("Sign", |x: f64| if x > 0.0 { 1 } else if x < 0.0 { -1 } else { 0 })
        .static_method("Sign", |x: i32| x.signum())
        .static_method("Min", |a: f64, b: f64| a.min(b))
        .static_method("Min", |a: i32, b: i32| a.min(b))
        .static_method("Min", |a: i64, b: i64| a.min(b))
        .static_method("Max", |a: f64, b: f64| a.max(b))
        .static_method("Max", |a: i32, b: i32| a.max(b))
        .static_method("Max", |a: i64, b: i64| a.max(b))
        .build()?;

    ClassBuilder::new(registry, "System.Convert")
        .static_class()
        .static_method("ToInt32", |x: f64| x.round_ties_even() as i32)
        .static_method("ToInt32", |x: i64| x as i32)
        .static_method("ToInt32", |b: bool| i32::from(b))
        .static_method_raw("ToInt32", vec![DataType::String], DataType::INT, |ctx| {
            let text: String = ctx.arg(0)?;
            parse_number::<i32>(&text).map(Value::Int)
        })
        .static_method("ToInt64", |x: f64| x.round_ties_even() as i64)
        .static_method("ToInt64", |x: i32| i64::from(x))
        .static_method("ToDouble", |x: i32| f64::from(x))
        .static_method("ToDouble", |x: i64| x as f64)
        .static_method("ToDouble", |x: f32| f64::from(x))
        .static_method_raw("ToDouble", vec![DataType::String], DataType::DOUBLE, |ctx| {
            let text: String = ctx.arg(0)?;
            parse_number::<f64>(&text).map(Value::Double)
        })
        .static_method("ToBoolean", |x: i32| x != 0)
        .static_method_raw("ToString", vec![DataType::Object], DataType::String, |ctx| {
            Ok(Value::string(ctx.arg_value(0)?.to_string()))
        })
        .build()
}
