//! textlambda
//!
//! Compiles C#-style lambda expressions such as `(x, y) => x * 2 + y` into
//! callable functions, resolving names against a registry of host types.
//!
//! ## Crates
//!
//! - `textlambda-core`: spans, [`DataType`], runtime [`Value`]s and the
//!   error types of every phase
//! - `textlambda-registry`: the [`TypeUniverse`] trait and the concrete
//!   [`TypeRegistry`] populated through [`ClassBuilder`]
//! - `textlambda-modules`: the standard `System` library
//! - `textlambda-parser`: lexer and precedence-climbing parser producing a
//!   typed tree
//! - `textlambda-compiler`: binding and lowering into [`CompiledFunction`]
//!
//! ## Quick start
//!
//! ```
//! use textlambda::Compiler;
//!
//! let compiler = Compiler::with_standard_library()?;
//! let f = compiler.compile_typed::<(f64, f64), f64>("(x, y) => x * 2 + y")?;
//! assert_eq!(f.call((1.5, 1.0))?, 4.0);
//! # Ok::<(), textlambda::Error>(())
//! ```

mod compiler;
mod error;

pub use compiler::Compiler;
pub use error::{Error, Result};

pub use textlambda_compiler::{
    ArgList, CompileOptions, CompiledFunction, Signature, TypedFunction,
};
pub use textlambda_core::{
    ArrayValue, CompileError, CompileErrorKind, DataType, Decimal, HostClass, HostObject,
    LexError, NativeError, PrimitiveKind, RegistrationError, RuntimeError, ScriptType, Span,
    Value, ValueMismatch,
};
pub use textlambda_modules::{Random, ScriptDictionary, ScriptList, install_all, standard_registry};
pub use textlambda_parser::ParamSpec;
pub use textlambda_registry::{CallContext, ClassBuilder, NativeFn, TypeRegistry, TypeUniverse};

/// Compile `source` against `signature` using `registry` and `options`.
///
/// The free-function form of [`Compiler::compile`], for callers that keep
/// their own registry.
pub fn compile(
    registry: &dyn TypeUniverse,
    signature: &Signature,
    source: &str,
    options: &CompileOptions,
) -> std::result::Result<CompiledFunction, CompileError> {
    textlambda_compiler::compile(registry, signature, source, options)
}
