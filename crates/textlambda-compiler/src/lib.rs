//! Binding and lowering for textlambda expressions.
//!
//! Takes source text and a [`Signature`], parses it against a
//! [`TypeUniverse`], and lowers the typed tree into a [`CompiledFunction`]
//! that no longer needs the universe.
//!
//! ## Modules
//!
//! - [`signature`]: the function shape an expression is compiled against
//! - [`options`]: namespaces and default-instance configuration
//! - [`binder`]: default-instance placement and result conversion
//! - [`operators`]: runtime semantics of the built-in operators
//! - [`conversion`]: runtime casts, `is` and `as`
//! - [`lower`]: closure-tree lowering of the typed tree
//! - [`function`]: [`CompiledFunction`]
//! - [`typed`]: [`TypedFunction`], called with Rust tuples

pub mod binder;
pub mod conversion;
pub mod function;
pub mod lower;
pub mod operators;
pub mod options;
pub mod signature;
pub mod typed;

pub use binder::{BoundLambda, bind};
pub use function::CompiledFunction;
pub use options::CompileOptions;
pub use signature::Signature;
pub use typed::{ArgList, TypedFunction};

use textlambda_core::{CompileError, ScriptType};
use textlambda_registry::TypeUniverse;
use tracing::debug;

/// Compile `source` against `signature`.
///
/// Fails on the first lexing, parsing or resolution error; nothing is
/// partially compiled.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(
    universe: &dyn TypeUniverse,
    signature: &Signature,
    source: &str,
    options: &CompileOptions,
) -> Result<CompiledFunction, CompileError> {
    debug!(source, %signature, "compiling expression");
    let bound = bind(universe, signature, source, options)?;
    Ok(CompiledFunction::new(source, bound))
}

/// Compile `source` against the signature `Args -> R`.
pub fn compile_typed<Args: ArgList, R: ScriptType>(
    universe: &dyn TypeUniverse,
    source: &str,
    options: &CompileOptions,
) -> Result<TypedFunction<Args, R>, CompileError> {
    let signature = TypedFunction::<Args, R>::signature();
    compile(universe, &signature, source, options).map(TypedFunction::new)
}
