//! `System.Object`, `System.Type`, `System.Array` and `System.Nullable<T>`.

use textlambda_core::{DataType, NativeError, RegistrationError, Value, ValueMismatch};
use textlambda_registry::{CallContext, ClassBuilder, MemberFlags, TypeRegistry};

fn this_type<'a>(ctx: &CallContext<'a>) -> Result<&'a DataType, NativeError> {
    match ctx.this_value()? {
        Value::Type(ty) => Ok(ty),
        other => Err(NativeError::Receiver(ValueMismatch::new(
            "System.Type",
            other.runtime_type(),
        ))),
    }
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    ClassBuilder::builtin(registry, DataType::Object)
        .method_raw("ToString", vec![], DataType::String, |ctx| {
            Ok(Value::string(ctx.this_value()?.to_string()))
        })
        .method_raw("GetType", vec![], DataType::class("System.Type"), |ctx| {
            Ok(Value::type_of(ctx.this_value()?.runtime_type()))
        })
        .method_raw("Equals", vec![DataType::Object], DataType::BOOL, |ctx| {
            Ok(Value::Bool(ctx.this_value()?.equals(ctx.arg_value(0)?)))
        })
        .static_method_raw(
            "ReferenceEquals",
            vec![DataType::Object, DataType::Object],
            DataType::BOOL,
            |ctx| Ok(Value::Bool(ctx.arg_value(0)?.equals(ctx.arg_value(1)?))),
        )
        .build()?;

    ClassBuilder::new(registry, "System.Type")
        .property_raw(
            "Name",
            DataType::String,
            MemberFlags::empty(),
            |ctx| {
                let ty = this_type(ctx)?;
                let full = ty.full_name();
                let name = match ty {
                    DataType::Class(class) if class.args.is_empty() => class.simple_name().to_string(),
                    _ => full.rsplit('.').next().unwrap_or(&full).to_string(),
                };
                Ok(Value::string(name))
            },
            None,
        )
        .property_raw(
            "FullName",
            DataType::String,
            MemberFlags::empty(),
            |ctx| Ok(Value::string(this_type(ctx)?.full_name())),
            None,
        )
        .property_raw(
            "IsValueType",
            DataType::BOOL,
            MemberFlags::empty(),
            |ctx| Ok(Value::Bool(this_type(ctx)?.is_value_type())),
            None,
        )
        .build()?;

    ClassBuilder::new(registry, "System.Array")
        .property_raw(
            "Length",
            DataType::INT,
            MemberFlags::empty(),
            |ctx| match ctx.this_value()? {
                Value::Array(array) => Ok(Value::Int(array.len() as i32)),
                other => Err(NativeError::Receiver(ValueMismatch::new(
                    "array",
                    other.runtime_type(),
                ))),
            },
            None,
        )
        .build()?;

    // The receiver of a nullable member is either the wrapped value or null.
    ClassBuilder::new(registry, "System.Nullable`1")
        .property_raw(
            "HasValue",
            DataType::BOOL,
            MemberFlags::empty(),
            |ctx| Ok(Value::Bool(!ctx.this_value()?.is_null())),
            None,
        )
        .property_raw(
            "Value",
            DataType::Param(0),
            MemberFlags::empty(),
            |ctx| match ctx.this_value()? {
                Value::Null => Err(NativeError::other("nullable object must have a value")),
                value => Ok(value.clone()),
            },
            None,
        )
        .method_raw("GetValueOrDefault", vec![], DataType::Param(0), |ctx| {
            match ctx.this_value()? {
                Value::Null => Ok(ctx
                    .declaring_type()
                    .type_args()
                    .first()
                    .map(Value::default_for)
                    .unwrap_or_default()),
                value => Ok(value.clone()),
            }
        })
        .build()?;

    Ok(())
}
