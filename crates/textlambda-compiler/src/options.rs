//! Per-compile configuration.

use textlambda_core::DataType;

/// How names in the source are resolved and whether a receiver is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileOptions {
    /// Namespaces tried, in order, for type names not found as written.
    pub namespaces: Vec<String>,
    /// Type of an implicit receiver inserted ahead of the declared
    /// parameters, whose members bare identifiers can reach.
    pub default_instance: Option<DataType>,
    /// Treat the signature's first parameter as the implicit receiver
    /// instead of inserting a new one. Takes precedence over
    /// `default_instance`.
    pub first_parameter_is_default_instance: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn default_instance(mut self, ty: DataType) -> Self {
        self.default_instance = Some(ty);
        self
    }

    pub fn first_parameter_is_default_instance(mut self, enabled: bool) -> Self {
        self.first_parameter_is_default_instance = enabled;
        self
    }
}
