//! The [`Compiler`] front door.
//!
//! A `Compiler` owns a sealed type registry and the options every compile
//! through it shares.
//!
//! # Example
//!
//! ```
//! use textlambda::{Compiler, DataType, Signature, Value};
//!
//! let compiler = Compiler::with_standard_library()?.namespace("System");
//! let f = compiler.compile(
//!     "(x, y) => Math.Max(x, y) * 2",
//!     &Signature::new().param(DataType::DOUBLE).param(DataType::DOUBLE),
//! )?;
//! assert_eq!(f.invoke(&[Value::Double(1.0), Value::Double(3.5)])?, Value::Double(7.0));
//! # Ok::<(), textlambda::Error>(())
//! ```

use std::sync::Arc;

use textlambda_compiler::{ArgList, CompileOptions, CompiledFunction, Signature, TypedFunction};
use textlambda_core::{CompileError, DataType, RegistrationError, ScriptType};
use textlambda_registry::TypeRegistry;
use tracing::debug;

/// Compiles expressions against one registry with shared options.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<TypeRegistry>,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            options: CompileOptions::default(),
        }
    }

    /// A compiler over the standard `System` library.
    ///
    /// No namespace is imported; add `System` with
    /// [`namespace`](Self::namespace) to write `Math.Sin` rather than
    /// `System.Math.Sin`.
    pub fn with_standard_library() -> Result<Self, RegistrationError> {
        let registry = textlambda_modules::standard_registry()?;
        debug!(types = registry.len(), "standard library installed");
        Ok(Self::new(registry))
    }

    /// Append a namespace to the unqualified-name search order.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespaces.push(namespace.into());
        self
    }

    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Insert an implicit receiver of type `ty` ahead of the declared
    /// parameters.
    pub fn default_instance(mut self, ty: DataType) -> Self {
        self.options.default_instance = Some(ty);
        self
    }

    /// Use the signature's first parameter as the implicit receiver.
    pub fn first_parameter_is_default_instance(mut self, enabled: bool) -> Self {
        self.options.first_parameter_is_default_instance = enabled;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn compile(
        &self,
        source: &str,
        signature: &Signature,
    ) -> Result<CompiledFunction, CompileError> {
        textlambda_compiler::compile(self.registry.as_ref(), signature, source, &self.options)
    }

    /// Compile against the signature spelled by `Args` and `R`.
    pub fn compile_typed<Args: ArgList, R: ScriptType>(
        &self,
        source: &str,
    ) -> Result<TypedFunction<Args, R>, CompileError> {
        textlambda_compiler::compile_typed(self.registry.as_ref(), source, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use textlambda_core::Value;

    use super::*;

    #[test]
    fn builder_accumulates_options() {
        let compiler = Compiler::new(TypeRegistry::new())
            .namespace("System")
            .namespaces(["A", "B"])
            .default_instance(DataType::String)
            .first_parameter_is_default_instance(true);
        let options = compiler.options();
        assert_eq!(options.namespaces, ["System", "A", "B"]);
        assert_eq!(options.default_instance, Some(DataType::String));
        assert!(options.first_parameter_is_default_instance);
    }

    #[test]
    fn clones_share_the_registry() {
        let compiler = Compiler::with_standard_library().unwrap();
        let clone = compiler.clone();
        assert!(std::ptr::eq(compiler.registry(), clone.registry()));
        let f = clone.compile("1 + 1", &Signature::new()).unwrap();
        assert_eq!(f.invoke(&[]), Ok(Value::Int(2)));
    }
}
