//! Statically typed wrappers over [`CompiledFunction`].
//!
//! A `TypedFunction<(f64, i32), f64>` is compiled against the signature
//! `(double, int) -> double` derived from its Rust types, and is called
//! with a Rust tuple.

use std::fmt;
use std::marker::PhantomData;

use textlambda_core::{RuntimeError, ScriptType, Value};

use crate::{CompiledFunction, Signature};

/// A tuple of [`ScriptType`]s usable as an argument list.
pub trait ArgList: Sized {
    /// The signature with one typed parameter per element.
    fn signature() -> Signature;

    fn into_values(self) -> Vec<Value>;
}

macro_rules! impl_arg_list {
    ($($name:ident),*) => {
        impl<$($name: ScriptType),*> ArgList for ($($name,)*) {
            fn signature() -> Signature {
                Signature::new()$(.param($name::data_type()))*
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)*) = self;
                vec![$($name.into_value()),*]
            }
        }
    };
}

impl_arg_list!();
impl_arg_list!(A0);
impl_arg_list!(A0, A1);
impl_arg_list!(A0, A1, A2);
impl_arg_list!(A0, A1, A2, A3);
impl_arg_list!(A0, A1, A2, A3, A4);
impl_arg_list!(A0, A1, A2, A3, A4, A5);

/// A compiled expression with a Rust-typed call surface.
pub struct TypedFunction<Args, R> {
    function: CompiledFunction,
    _signature: PhantomData<fn(Args) -> R>,
}

impl<Args: ArgList, R: ScriptType> TypedFunction<Args, R> {
    /// The signature `Args -> R`, for compiling.
    pub fn signature() -> Signature {
        Args::signature().returns(R::data_type())
    }

    pub(crate) fn new(function: CompiledFunction) -> Self {
        Self {
            function,
            _signature: PhantomData,
        }
    }

    pub fn call(&self, args: Args) -> Result<R, RuntimeError> {
        let value = self.function.invoke(&args.into_values())?;
        R::from_value(value).map_err(RuntimeError::ResultType)
    }

    /// A plain closure over a shared handle to the compiled body.
    pub fn into_fn(self) -> impl Fn(Args) -> Result<R, RuntimeError> + Clone + Send + Sync {
        let function = self.function;
        move |args: Args| {
            let value = function.invoke(&args.into_values())?;
            R::from_value(value).map_err(RuntimeError::ResultType)
        }
    }

    pub fn function(&self) -> &CompiledFunction {
        &self.function
    }
}

impl<Args, R> Clone for TypedFunction<Args, R> {
    fn clone(&self) -> Self {
        Self {
            function: self.function.clone(),
            _signature: PhantomData,
        }
    }
}

impl<Args, R> fmt::Debug for TypedFunction<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedFunction").field(&self.function).finish()
    }
}

#[cfg(test)]
mod tests {
    use textlambda_core::DataType;

    use super::*;
    use crate::{CompileOptions, bind};

    fn compile<Args: ArgList, R: ScriptType>(source: &str) -> TypedFunction<Args, R> {
        let registry = textlambda_modules::standard_registry().unwrap();
        let options = CompileOptions::new().namespace("System");
        let signature = TypedFunction::<Args, R>::signature();
        let bound = bind(&registry, &signature, source, &options).unwrap();
        TypedFunction::new(CompiledFunction::new(source, bound))
    }

    #[test]
    fn signature_follows_the_rust_types() {
        let sig = TypedFunction::<(f64, i32), bool>::signature();
        assert_eq!(sig.arity(), Some(2));
        assert_eq!(sig.declared().unwrap()[1].ty, Some(DataType::INT));
        assert_eq!(sig.return_type, Some(DataType::BOOL));
    }

    #[test]
    fn call_with_a_tuple() {
        let f = compile::<(f64, f64), f64>("(x, y) => x * 2 + y");
        assert_eq!(f.call((1.5, 1.0)).unwrap(), 4.0);
    }

    #[test]
    fn zero_arguments() {
        let f = compile::<(), i32>("() => 6 * 7");
        assert_eq!(f.call(()).unwrap(), 42);
    }

    #[test]
    fn integer_result_widens_into_double() {
        let f = compile::<(i32,), f64>("n => n / 2");
        assert_eq!(f.call((7,)).unwrap(), 3.0);
    }

    #[test]
    fn six_arguments() {
        let f = compile::<(i32, i32, i32, i32, i32, i32), i32>(
            "(a, b, c, d, e, g) => a + b + c + d + e + g",
        );
        assert_eq!(f.call((1, 2, 3, 4, 5, 6)).unwrap(), 21);
    }

    #[test]
    fn into_fn_is_a_plain_closure() {
        let f = compile::<(f64,), f64>("x => Math.Sqrt(x)").into_fn();
        let g = f.clone();
        assert_eq!(f((16.0,)).unwrap(), 4.0);
        assert_eq!(g((9.0,)).unwrap(), 3.0);
    }

    #[test]
    fn runtime_errors_propagate() {
        let f = compile::<(i32,), i32>("n => 10 / n");
        assert_eq!(f.call((0,)), Err(RuntimeError::DivisionByZero));
    }
}
