//! Lowering of the typed expression tree into a tree of closures.
//!
//! Each node becomes a [`Thunk`] that evaluates its children against the
//! argument slice and combines the results. Everything resolvable ahead of
//! time is resolved here, once: operator functions, conversion endpoints,
//! the natives behind calls and members. Invocation only walks closures.

use textlambda_core::{DataType, RuntimeError, Value};
use textlambda_parser::ast::{BinaryOp, Expr, ExprKind, TypeTestOp};

use crate::conversion::{convert, invalid_cast, is_instance, try_as};
use crate::operators::{binary_fn, unary_fn};

mod calls;

/// A lowered node: arguments in, value out.
pub type Thunk = Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower(expr: &Expr) -> Thunk {
    match &expr.kind {
        ExprKind::Literal(value) => constant(value.clone()),
        ExprKind::Parameter { ordinal, .. } => parameter(*ordinal),
        ExprKind::Unary { op, operand } => {
            let f = unary_fn(*op);
            let operand = lower(operand);
            Box::new(move |args: &[Value]| f(operand(args)?))
        }
        ExprKind::Binary { op, left, right } => lower_binary(*op, left, right),
        ExprKind::Conditional {
            test,
            then_branch,
            else_branch,
        } => {
            let test = lower(test);
            let then_branch = lower(then_branch);
            let else_branch = lower(else_branch);
            Box::new(move |args: &[Value]| {
                if truth(test(args)?)? {
                    then_branch(args)
                } else {
                    else_branch(args)
                }
            })
        }
        ExprKind::NullCoalesce { left, right } => {
            let from = left.ty.clone();
            let to = expr.ty.clone();
            let left = lower(left);
            let right = lower(right);
            Box::new(move |args: &[Value]| {
                let value = left(args)?;
                if value.is_null() {
                    right(args)
                } else {
                    convert(value, &from, &to)
                }
            })
        }
        ExprKind::Cast { operand } => {
            let from = operand.ty.clone();
            let to = expr.ty.clone();
            let operand = lower(operand);
            Box::new(move |args: &[Value]| convert(operand(args)?, &from, &to))
        }
        ExprKind::TypeOf(ty) => constant(Value::type_of(ty.clone())),
        ExprKind::SizeOf(ty) => match ty.primitive() {
            Some(kind) => constant(Value::Int(kind.size_of())),
            None => failing(RuntimeError::InvalidCast {
                from: ty.to_string(),
                to: "a primitive type".to_string(),
            }),
        },
        ExprKind::TypeTest {
            op,
            operand,
            target,
        } => {
            let target = target.clone();
            let operand = lower(operand);
            match op {
                TypeTestOp::Is => Box::new(move |args: &[Value]| {
                    Ok(Value::Bool(is_instance(&operand(args)?, &target)))
                }),
                TypeTestOp::As => {
                    Box::new(move |args: &[Value]| Ok(try_as(operand(args)?, &target)))
                }
            }
        }
        ExprKind::Call {
            target,
            method,
            args,
        } => calls::lower_call(target.as_deref(), method, args),
        ExprKind::Member { target, member } => calls::lower_member(target.as_deref(), member),
        ExprKind::Index { target, index } => calls::lower_array_index(target, index),
        ExprKind::New {
            constructor,
            args,
            initializer,
        } => calls::lower_new(constructor, args, initializer.as_ref()),
        ExprKind::NewArray { element, init } => calls::lower_new_array(element, init),
    }
}

fn constant(value: Value) -> Thunk {
    Box::new(move |_: &[Value]| Ok(value.clone()))
}

fn failing(error: RuntimeError) -> Thunk {
    Box::new(move |_: &[Value]| Err(error.clone()))
}

fn parameter(ordinal: usize) -> Thunk {
    Box::new(move |args: &[Value]| {
        args.get(ordinal)
            .cloned()
            .ok_or(RuntimeError::ArgumentCount {
                expected: ordinal + 1,
                actual: args.len(),
            })
    })
}

fn lower_binary(op: BinaryOp, left: &Expr, right: &Expr) -> Thunk {
    let left = lower(left);
    let right = lower(right);
    match binary_fn(op) {
        Some(f) => Box::new(move |args: &[Value]| f(left(args)?, right(args)?)),
        // `&&` and `||`: the right operand runs only when it decides the result
        None if op == BinaryOp::And => Box::new(move |args: &[Value]| {
            Ok(Value::Bool(truth(left(args)?)? && truth(right(args)?)?))
        }),
        None => Box::new(move |args: &[Value]| {
            Ok(Value::Bool(truth(left(args)?)? || truth(right(args)?)?))
        }),
    }
}

fn truth(value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(invalid_cast(&other, &DataType::BOOL)),
    }
}

/// Evaluate each thunk in order.
fn evaluate_all(thunks: &[Thunk], args: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    thunks.iter().map(|thunk| thunk(args)).collect()
}
