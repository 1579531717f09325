//! Host callables backing every registered member.

use std::fmt;
use std::sync::Arc;

use textlambda_core::{
    DataType, HostClass, NativeError, ScriptType, TypeHash, Value, ValueMismatch,
};

/// Arguments and receiver handed to a host callable.
pub struct CallContext<'a> {
    this: Option<&'a Value>,
    args: &'a [Value],
    declaring: &'a DataType,
}

impl<'a> CallContext<'a> {
    pub fn new(this: Option<&'a Value>, args: &'a [Value], declaring: &'a DataType) -> Self {
        Self {
            this,
            args,
            declaring,
        }
    }

    #[inline]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn arg_value(&self, index: usize) -> Result<&'a Value, NativeError> {
        self.args.get(index).ok_or(NativeError::ArgumentIndex {
            index,
            count: self.args.len(),
        })
    }

    /// Typed argument access: `let x: f64 = ctx.arg(0)?;`
    pub fn arg<T: ScriptType>(&self, index: usize) -> Result<T, NativeError> {
        T::from_value(self.arg_value(index)?.clone())
            .map_err(|source| NativeError::ArgumentType { index, source })
    }

    pub fn this_value(&self) -> Result<&'a Value, NativeError> {
        self.this.ok_or(NativeError::MissingReceiver)
    }

    /// Borrow the receiver as a registered host class.
    pub fn this<T: HostClass>(&self) -> Result<&'a T, NativeError> {
        match self.this_value()? {
            Value::Object(object) => object
                .downcast_ref::<T>()
                .ok_or_else(|| NativeError::Receiver(ValueMismatch::new(T::TYPE_NAME, object.data_type()))),
            other => Err(NativeError::Receiver(ValueMismatch::new(
                T::TYPE_NAME,
                other.runtime_type(),
            ))),
        }
    }

    /// Receiver of a `string` member.
    pub fn this_str(&self) -> Result<&'a str, NativeError> {
        match self.this_value()? {
            Value::String(s) => Ok(s),
            other => Err(NativeError::Receiver(ValueMismatch::new(
                "string",
                other.runtime_type(),
            ))),
        }
    }

    /// The type the member was resolved on, with generic arguments applied.
    /// Constructors use it to stamp the instance type.
    #[inline]
    pub fn declaring_type(&self) -> &'a DataType {
        self.declaring
    }
}

/// Anything callable with a [`CallContext`].
pub trait NativeCallable {
    fn call(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&CallContext<'_>) -> Result<Value, NativeError>,
{
    fn call(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError> {
        (self)(ctx)
    }
}

/// Type-erased, shareable host callable.
///
/// The compiled function keeps clones of these, so they must be callable
/// from any thread that invokes it.
#[derive(Clone)]
pub struct NativeFn {
    pub id: TypeHash,
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    pub fn new<F>(id: TypeHash, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self {
            id,
            inner: Arc::new(f),
        }
    }

    #[inline]
    pub fn call(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.id)
    }
}

// =============================================================================
// TYPED ADAPTERS
// =============================================================================

/// A Rust closure usable as a static function or static property getter.
///
/// `Marker` is the closure's `fn` pointer shape; it only exists to keep the
/// per-arity impls apart.
pub trait StaticSignature<Marker>: Send + Sync + Sized + 'static {
    fn params() -> Vec<DataType>;
    fn return_type() -> DataType;
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError>;
}

/// A Rust closure taking `&T` first, usable as an instance member of `T`.
pub trait MethodSignature<T, Marker>: Send + Sync + Sized + 'static {
    fn params() -> Vec<DataType>;
    fn return_type() -> DataType;
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError>;
}

/// A Rust closure producing a fresh `T`, usable as a constructor.
pub trait ConstructorSignature<T, Marker>: Send + Sync + Sized + 'static {
    fn params() -> Vec<DataType>;
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError>;
}

macro_rules! impl_signatures {
    ($($arg:ident $idx:tt),*) => {
        impl<F, R, $($arg,)*> StaticSignature<fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: ScriptType,
            $($arg: ScriptType,)*
        {
            fn params() -> Vec<DataType> {
                vec![$($arg::data_type()),*]
            }

            fn return_type() -> DataType {
                R::data_type()
            }

            #[allow(unused_variables)]
            fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError> {
                Ok((self)($(ctx.arg::<$arg>($idx)?),*).into_value())
            }
        }

        impl<F, T, R, $($arg,)*> MethodSignature<T, fn(&T, $($arg,)*) -> R> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            T: HostClass,
            R: ScriptType,
            $($arg: ScriptType,)*
        {
            fn params() -> Vec<DataType> {
                vec![$($arg::data_type()),*]
            }

            fn return_type() -> DataType {
                R::data_type()
            }

            fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError> {
                let this = ctx.this::<T>()?;
                Ok((self)(this, $(ctx.arg::<$arg>($idx)?),*).into_value())
            }
        }

        impl<F, T, $($arg,)*> ConstructorSignature<T, fn($($arg,)*) -> T> for F
        where
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
            T: HostClass,
            $($arg: ScriptType,)*
        {
            fn params() -> Vec<DataType> {
                vec![$($arg::data_type()),*]
            }

            fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, NativeError> {
                let instance = (self)($(ctx.arg::<$arg>($idx)?),*);
                Ok(Value::Object(textlambda_core::HostObject::with_type(
                    ctx.declaring_type().clone(),
                    instance,
                )))
            }
        }
    };
}

impl_signatures!();
impl_signatures!(A0 0);
impl_signatures!(A0 0, A1 1);
impl_signatures!(A0 0, A1 1, A2 2);
impl_signatures!(A0 0, A1 1, A2 2, A3 3);

#[cfg(test)]
mod tests {
    use super::*;

    fn run<M, F: StaticSignature<M>>(f: F, args: &[Value]) -> Result<Value, NativeError> {
        let declaring = DataType::class("System.Math");
        f.invoke(&CallContext::new(None, args, &declaring))
    }

    #[test]
    fn static_signature_reads_typed_arguments() {
        let pow = |x: f64, y: f64| x.powf(y);
        assert_eq!(
            run(pow, &[Value::Double(2.0), Value::Double(3.0)]),
            Ok(Value::Double(8.0))
        );
    }

    #[test]
    fn wrong_argument_type_is_reported_with_index() {
        let abs = |x: i32| x.abs();
        let err = run(abs, &[Value::Double(1.0)]).unwrap_err();
        assert!(matches!(err, NativeError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn missing_argument_is_reported() {
        let abs = |x: i32| x.abs();
        assert_eq!(
            run(abs, &[]),
            Err(NativeError::ArgumentIndex { index: 0, count: 0 })
        );
    }

    struct Counter(i32);
    impl HostClass for Counter {
        const TYPE_NAME: &'static str = "Demo.Counter";
    }

    #[test]
    fn method_signature_borrows_receiver() {
        fn get<F: MethodSignature<Counter, M>, M>(f: F, this: &Value) -> Result<Value, NativeError> {
            let declaring = DataType::class("Demo.Counter");
            f.invoke(&CallContext::new(Some(this), &[], &declaring))
        }
        let this = Value::Object(textlambda_core::HostObject::new(Counter(41)));
        assert_eq!(get(|c: &Counter| c.0 + 1, &this), Ok(Value::Int(42)));
        assert!(matches!(
            get(|c: &Counter| c.0, &Value::Int(1)),
            Err(NativeError::Receiver(_))
        ));
    }
}
