//! The compiled artifact.

use std::fmt;
use std::sync::Arc;

use textlambda_core::{DataType, RuntimeError, Value, ValueMismatch};
use textlambda_parser::ParameterList;
use tracing::trace;

use crate::binder::BoundLambda;
use crate::lower::{Thunk, lower};

/// A callable produced from an expression.
///
/// Holds no reference to the compiler or the registry it was resolved
/// against; clones share the same lowered body and may be invoked from any
/// number of threads at once.
#[derive(Clone)]
pub struct CompiledFunction {
    inner: Arc<Inner>,
}

struct Inner {
    source: String,
    params: ParameterList,
    return_type: DataType,
    body: Thunk,
}

impl CompiledFunction {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn new(source: &str, bound: BoundLambda) -> Self {
        let body = lower(&bound.body);
        Self {
            inner: Arc::new(Inner {
                source: source.to_string(),
                params: bound.params,
                return_type: bound.return_type,
                body,
            }),
        }
    }

    /// Evaluate with `args`, which must match [`parameters`](Self::parameters)
    /// in number and, one by one, in runtime type.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let params = &self.inner.params;
        if args.len() != params.len() {
            return Err(RuntimeError::ArgumentCount {
                expected: params.len(),
                actual: args.len(),
            });
        }
        for (index, (arg, param)) in args.iter().zip(params).enumerate() {
            if !arg.conforms_to(&param.ty) {
                return Err(RuntimeError::ArgumentType {
                    index,
                    source: ValueMismatch::new(&param.ty, arg.runtime_type()),
                });
            }
        }
        trace!(source = %self.inner.source, "invoking compiled expression");

        let result = (self.inner.body)(args)?;
        if self.inner.return_type.is_void() {
            Ok(Value::Null)
        } else {
            Ok(result)
        }
    }

    /// The resolved parameters, default instance first when there is one.
    pub fn parameters(&self) -> &ParameterList {
        &self.inner.params
    }

    pub fn return_type(&self) -> &DataType {
        &self.inner.return_type
    }

    pub fn source(&self) -> &str {
        &self.inner.source
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("source", &self.inner.source)
            .field("params", &self.inner.params)
            .field("return_type", &self.inner.return_type)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.inner.params, self.inner.return_type, self.inner.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompileOptions, Signature, bind};

    fn compile(source: &str, signature: &Signature) -> CompiledFunction {
        let registry = textlambda_modules::standard_registry().unwrap();
        let bound = bind(&registry, signature, source, &CompileOptions::new()).unwrap();
        CompiledFunction::new(source, bound)
    }

    #[test]
    fn invoke_checks_argument_count() {
        let sig = Signature::new().param(DataType::INT).param(DataType::INT);
        let f = compile("(a, b) => a + b", &sig);
        assert_eq!(f.invoke(&[Value::Int(2), Value::Int(3)]), Ok(Value::Int(5)));
        assert_eq!(
            f.invoke(&[Value::Int(2)]),
            Err(RuntimeError::ArgumentCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn invoke_checks_argument_types() {
        let f = compile("x => x * 2", &Signature::new().param(DataType::INT));
        let err = f.invoke(&[Value::Double(1.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn nullable_parameters_accept_null() {
        let f = compile(
            "n => n ?? 5",
            &Signature::new().param(DataType::nullable(DataType::INT)),
        );
        assert_eq!(f.invoke(&[Value::Null]), Ok(Value::Int(5)));
        assert_eq!(f.invoke(&[Value::Int(8)]), Ok(Value::Int(8)));
    }

    #[test]
    fn untyped_parameters_take_any_value() {
        let f = compile("(a, b) => a == b", &Signature::untyped(2));
        assert_eq!(f.invoke(&[Value::Int(1), Value::string("x")]), Ok(Value::Bool(false)));
        assert_eq!(f.return_type(), &DataType::BOOL);
    }

    #[test]
    fn clones_share_the_body_across_threads() {
        let f = compile("x => x * x", &Signature::new().param(DataType::LONG));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let f = f.clone();
                std::thread::spawn(move || f.invoke(&[Value::Long(i)]))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
        assert_eq!(results, [Value::Long(0), Value::Long(1), Value::Long(4), Value::Long(9)]);
    }

    #[test]
    fn display_shows_the_binding() {
        let f = compile("x => x + 1", &Signature::new().param(DataType::INT));
        assert_eq!(f.to_string(), "(int x) -> int: x => x + 1");
    }
}
