//! Lowering of nodes that reach into host types: calls, member reads,
//! indexing and object or array creation.

use textlambda_core::{ArrayValue, DataType, NativeError, RuntimeError, Value};
use textlambda_parser::ast::{ArrayInit, Expr, Initializer};
use textlambda_registry::{CallContext, ConstructorRef, MemberRef, MethodRef, NativeFn};

use super::{Thunk, evaluate_all, lower};

/// An instance receiver, null-checked before use.
///
/// A receiver whose static type is `T?` is passed through even when null,
/// so that `HasValue` and friends can observe the empty state.
struct Receiver {
    thunk: Thunk,
    allows_null: bool,
    context: String,
}

impl Receiver {
    fn new(target: &Expr, context: String) -> Self {
        Self {
            thunk: lower(target),
            allows_null: target.ty.nullable_inner().is_some(),
            context,
        }
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let value = (self.thunk)(args)?;
        if value.is_null() && !self.allows_null {
            return Err(RuntimeError::NullReference {
                context: self.context.clone(),
            });
        }
        Ok(value)
    }
}

pub(super) fn lower_call(target: Option<&Expr>, method: &MethodRef, args: &[Expr]) -> Thunk {
    let arg_thunks: Vec<Thunk> = args.iter().map(lower).collect();
    let native = method.native.clone();
    let owner = method.owner.clone();

    match target {
        None => Box::new(move |args: &[Value]| {
            let values = evaluate_all(&arg_thunks, args)?;
            Ok(native.call(&CallContext::new(None, &values, &owner))?)
        }),
        Some(target) => {
            let receiver = Receiver::new(target, format!("calling '{}'", method.name));
            Box::new(move |args: &[Value]| {
                let this = receiver.evaluate(args)?;
                let values = evaluate_all(&arg_thunks, args)?;
                Ok(native.call(&CallContext::new(Some(&this), &values, &owner))?)
            })
        }
    }
}

pub(super) fn lower_member(target: Option<&Expr>, member: &MemberRef) -> Thunk {
    let getter = member.getter.clone();
    let owner = member.owner.clone();

    match target {
        None => {
            Box::new(move |_: &[Value]| Ok(getter.call(&CallContext::new(None, &[], &owner))?))
        }
        Some(target) => {
            let receiver = Receiver::new(target, format!("reading '{}'", member.name));
            Box::new(move |args: &[Value]| {
                let this = receiver.evaluate(args)?;
                Ok(getter.call(&CallContext::new(Some(&this), &[], &owner))?)
            })
        }
    }
}

pub(super) fn lower_array_index(target: &Expr, index: &Expr) -> Thunk {
    let receiver = Receiver::new(target, "indexing an array".to_string());
    let index = lower(index);
    Box::new(move |args: &[Value]| {
        let array = match receiver.evaluate(args)? {
            Value::Array(array) => array,
            other => {
                return Err(RuntimeError::InvalidCast {
                    from: other.runtime_type().to_string(),
                    to: "an array".to_string(),
                });
            }
        };
        let position = index(args)?;
        // a `ulong` beyond `i64::MAX` is out of range of any array
        let position = position.as_index().unwrap_or(i64::MAX);
        array.get(position).cloned()
    })
}

/// One step of an object initializer: a setter or `Add` call on the new
/// object with a single argument.
struct InitStep {
    native: Option<NativeFn>,
    owner: DataType,
    name: String,
    value: Thunk,
}

impl InitStep {
    fn apply(&self, object: &Value, args: &[Value]) -> Result<(), RuntimeError> {
        let value = (self.value)(args)?;
        let native = self.native.as_ref().ok_or_else(|| {
            NativeError::other(format!("'{}' cannot be assigned", self.name))
        })?;
        native.call(&CallContext::new(
            Some(object),
            std::slice::from_ref(&value),
            &self.owner,
        ))?;
        Ok(())
    }
}

fn lower_initializer(initializer: &Initializer) -> Vec<InitStep> {
    match initializer {
        Initializer::Members(members) => members
            .iter()
            .map(|(member, value)| InitStep {
                native: member.setter.clone(),
                owner: member.owner.clone(),
                name: member.name.clone(),
                value: lower(value),
            })
            .collect(),
        Initializer::Collection(items) => items
            .iter()
            .map(|(add, value)| InitStep {
                native: Some(add.native.clone()),
                owner: add.owner.clone(),
                name: add.name.clone(),
                value: lower(value),
            })
            .collect(),
    }
}

pub(super) fn lower_new(
    constructor: &ConstructorRef,
    args: &[Expr],
    initializer: Option<&Initializer>,
) -> Thunk {
    let arg_thunks: Vec<Thunk> = args.iter().map(lower).collect();
    let native = constructor.native.clone();
    let ty = constructor.ty.clone();
    let steps = initializer.map(lower_initializer).unwrap_or_default();

    Box::new(move |args: &[Value]| {
        let values = evaluate_all(&arg_thunks, args)?;
        let object = native.call(&CallContext::new(None, &values, &ty))?;
        for step in &steps {
            step.apply(&object, args)?;
        }
        Ok(object)
    })
}

pub(super) fn lower_new_array(element: &DataType, init: &ArrayInit) -> Thunk {
    let element = element.clone();
    match init {
        ArrayInit::Length(length) => {
            let length = lower(length);
            Box::new(move |args: &[Value]| {
                let len = length(args)?
                    .as_index()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or(RuntimeError::Overflow {
                        operation: "array creation",
                    })?;
                let fill = Value::default_for(&element);
                Ok(Value::Array(ArrayValue::new(element.clone(), vec![fill; len])))
            })
        }
        ArrayInit::Items(items) => {
            let items: Vec<Thunk> = items.iter().map(lower).collect();
            Box::new(move |args: &[Value]| {
                let values = evaluate_all(&items, args)?;
                Ok(Value::Array(ArrayValue::new(element.clone(), values)))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use textlambda_core::{Span, TypeHash};

    use super::*;
    use textlambda_parser::ast::ExprKind;
    use textlambda_registry::MemberFlags;

    fn span() -> Span {
        Span::default()
    }

    fn lit(value: Value) -> Expr {
        let ty = value.runtime_type();
        Expr::literal(value, ty, span())
    }

    fn native(f: fn(&CallContext<'_>) -> Result<Value, NativeError>) -> NativeFn {
        NativeFn::new(TypeHash::of_type("test"), f)
    }

    fn length_of(ctx: &CallContext<'_>) -> Result<Value, NativeError> {
        Ok(Value::Int(ctx.this_str()?.chars().count() as i32))
    }

    fn length_member() -> MemberRef {
        MemberRef {
            owner: DataType::String,
            name: "Length".to_string(),
            ty: DataType::INT,
            flags: MemberFlags::empty(),
            getter: native(length_of),
            setter: None,
        }
    }

    #[test]
    fn member_reads_go_through_the_getter() {
        let expr = Expr::new(
            ExprKind::Member {
                target: Some(Box::new(lit(Value::string("abc")))),
                member: length_member(),
            },
            DataType::INT,
            span(),
        );
        let f = crate::lower::lower(&expr);
        assert_eq!(f(&[]), Ok(Value::Int(3)));
    }

    #[test]
    fn null_receiver_is_a_null_reference() {
        let null = Expr::literal(Value::Null, DataType::String, span());
        let expr = Expr::new(
            ExprKind::Member {
                target: Some(Box::new(null)),
                member: length_member(),
            },
            DataType::INT,
            span(),
        );
        let err = crate::lower::lower(&expr)(&[]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::NullReference { context } if context.contains("Length")
        ));
    }

    #[test]
    fn static_calls_pass_arguments_in_order() {
        fn minus(ctx: &CallContext<'_>) -> Result<Value, NativeError> {
            Ok(Value::Int(ctx.arg::<i32>(0)? - ctx.arg::<i32>(1)?))
        }
        let method = MethodRef {
            owner: DataType::class("Test.Ops"),
            name: "Minus".to_string(),
            params: vec![DataType::INT, DataType::INT],
            return_type: DataType::INT,
            is_static: true,
            native: native(minus),
        };
        let expr = Expr::new(
            ExprKind::Call {
                target: None,
                method,
                args: vec![lit(Value::Int(10)), lit(Value::Int(3))],
            },
            DataType::INT,
            span(),
        );
        assert_eq!(crate::lower::lower(&expr)(&[]), Ok(Value::Int(7)));
    }

    #[test]
    fn native_failures_surface_as_runtime_errors() {
        fn fail(_: &CallContext<'_>) -> Result<Value, NativeError> {
            Err(NativeError::other("boom"))
        }
        let method = MethodRef {
            owner: DataType::class("Test.Ops"),
            name: "Fail".to_string(),
            params: vec![],
            return_type: DataType::INT,
            is_static: true,
            native: native(fail),
        };
        let expr = Expr::new(
            ExprKind::Call {
                target: None,
                method,
                args: vec![],
            },
            DataType::INT,
            span(),
        );
        assert_eq!(
            crate::lower::lower(&expr)(&[]),
            Err(RuntimeError::Native(NativeError::other("boom")))
        );
    }

    #[test]
    fn arrays_by_length_and_by_items() {
        let sized = Expr::new(
            ExprKind::NewArray {
                element: DataType::INT,
                init: ArrayInit::Length(Box::new(lit(Value::Int(3)))),
            },
            DataType::array(DataType::INT),
            span(),
        );
        let Ok(Value::Array(array)) = crate::lower::lower(&sized)(&[]) else {
            panic!("expected an array");
        };
        assert_eq!(array.items(), [Value::Int(0), Value::Int(0), Value::Int(0)]);

        let negative = Expr::new(
            ExprKind::NewArray {
                element: DataType::INT,
                init: ArrayInit::Length(Box::new(lit(Value::Int(-1)))),
            },
            DataType::array(DataType::INT),
            span(),
        );
        assert!(matches!(
            crate::lower::lower(&negative)(&[]),
            Err(RuntimeError::Overflow { .. })
        ));

        let listed = Expr::new(
            ExprKind::NewArray {
                element: DataType::String,
                init: ArrayInit::Items(vec![lit(Value::string("a")), lit(Value::string("b"))]),
            },
            DataType::array(DataType::String),
            span(),
        );
        let indexed = Expr::new(
            ExprKind::Index {
                target: Box::new(listed),
                index: Box::new(lit(Value::Int(1))),
            },
            DataType::String,
            span(),
        );
        assert_eq!(crate::lower::lower(&indexed)(&[]), Ok(Value::string("b")));
    }

    #[test]
    fn array_index_out_of_range() {
        let listed = Expr::new(
            ExprKind::NewArray {
                element: DataType::INT,
                init: ArrayInit::Items(vec![lit(Value::Int(1))]),
            },
            DataType::array(DataType::INT),
            span(),
        );
        let indexed = Expr::new(
            ExprKind::Index {
                target: Box::new(listed),
                index: Box::new(lit(Value::Int(5))),
            },
            DataType::INT,
            span(),
        );
        assert_eq!(
            crate::lower::lower(&indexed)(&[]),
            Err(RuntimeError::IndexOutOfRange { index: 5, len: 1 })
        );
    }
}
