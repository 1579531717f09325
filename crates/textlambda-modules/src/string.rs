//! `System.String`.
//!
//! Indices are counted in `char`s.

use textlambda_core::{DataType, NativeError, RegistrationError, Value};
use textlambda_registry::{CallContext, ClassBuilder, MemberFlags, TypeRegistry};

fn out_of_range(what: &str) -> NativeError {
    NativeError::other(format!("{what} was out of range"))
}

fn index_arg(ctx: &CallContext<'_>, index: usize) -> Result<usize, NativeError> {
    let i: i32 = ctx.arg(index)?;
    usize::try_from(i).map_err(|_| out_of_range("index"))
}

fn substring(ctx: &CallContext<'_>) -> Result<Value, NativeError> {
    let s = ctx.this_str()?;
    let start = index_arg(ctx, 0)?;
    let total = s.chars().count();
    let len = if ctx.arg_count() > 1 {
        index_arg(ctx, 1)?
    } else {
        total.checked_sub(start).ok_or_else(|| out_of_range("startIndex"))?
    };
    if start + len > total {
        return Err(out_of_range("length"));
    }
    Ok(Value::string(s.chars().skip(start).take(len).collect::<String>()))
}

fn str_method(
    f: fn(&str) -> String,
) -> impl Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static {
    move |ctx| Ok(Value::string(f(ctx.this_str()?)))
}

fn str_predicate(
    f: fn(&str, &str) -> bool,
) -> impl Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static {
    move |ctx| {
        let other: String = ctx.arg(0)?;
        Ok(Value::Bool(f(ctx.this_str()?, &other)))
    }
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let string = || DataType::String;

    ClassBuilder::builtin(registry, DataType::String)
        .property_raw(
            "Length",
            DataType::INT,
            MemberFlags::empty(),
            |ctx| Ok(Value::Int(ctx.this_str()?.chars().count() as i32)),
            None,
        )
        .indexer_raw("Chars", vec![DataType::INT], DataType::CHAR, |ctx| {
            let i = index_arg(ctx, 0)?;
            ctx.this_str()?
                .chars()
                .nth(i)
                .map(Value::Char)
                .ok_or_else(|| out_of_range("index"))
        })
        .method_raw("Substring", vec![DataType::INT], string(), substring)
        .method_raw("Substring", vec![DataType::INT, DataType::INT], string(), substring)
        .method_raw("ToUpper", vec![], string(), str_method(str::to_uppercase))
        .method_raw("ToLower", vec![], string(), str_method(str::to_lowercase))
        .method_raw("Trim", vec![], string(), str_method(|s| s.trim().to_string()))
        .method_raw("Contains", vec![string()], DataType::BOOL, str_predicate(|s, o| s.contains(o)))
        .method_raw("StartsWith", vec![string()], DataType::BOOL, str_predicate(|s, o| s.starts_with(o)))
        .method_raw("EndsWith", vec![string()], DataType::BOOL, str_predicate(|s, o| s.ends_with(o)))
        .method_raw("IndexOf", vec![string()], DataType::INT, |ctx| {
            let s = ctx.this_str()?;
            let needle: String = ctx.arg(0)?;
            let index = s
                .find(&needle)
                .map(|byte| s[..byte].chars().count() as i32)
                .unwrap_or(-1);
            Ok(Value::Int(index))
        })
        .method_raw("Replace", vec![string(), string()], string(), |ctx| {
            let from: String = ctx.arg(0)?;
            let to: String = ctx.arg(1)?;
            if from.is_empty() {
                return Err(NativeError::other("string cannot be of zero length"));
            }
            Ok(Value::string(ctx.this_str()?.replace(&from, &to)))
        })
        .static_method_raw(
            "Concat",
            vec![DataType::Object, DataType::Object],
            string(),
            |ctx| {
                Ok(Value::string(format!(
                    "{}{}",
                    ctx.arg_value(0)?,
                    ctx.arg_value(1)?
                )))
            },
        )
        .static_method_raw("IsNullOrEmpty", vec![string()], DataType::BOOL, |ctx| {
            Ok(Value::Bool(match ctx.arg_value(0)? {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            }))
        })
        .constant("Empty", String::new())
        .build()
}
