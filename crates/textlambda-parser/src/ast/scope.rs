//! Lambda parameters visible to an expression body.

use std::fmt;

use textlambda_core::DataType;

/// Name given to the implicit default-instance parameter.
pub const DEFAULT_INSTANCE_NAME: &str = "this";

/// A parameter declared by the target signature, before any lambda header
/// renames or types it. `ty: None` leaves the type to the header (or
/// `object` when the header is untyped too).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamSpec {
    pub name: Option<String>,
    pub ty: Option<DataType>,
}

impl ParamSpec {
    pub fn typed(ty: DataType) -> Self {
        Self {
            name: None,
            ty: Some(ty),
        }
    }

    pub fn named(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: Some(name.into()),
            ty: Some(ty),
        }
    }

    pub fn untyped() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: DataType,
    pub ordinal: usize,
}

/// The resolved parameters of a compiled expression. When present, the
/// default instance is ordinal 0 and the declared parameters follow it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterList {
    params: Vec<Parameter>,
    has_default_instance: bool,
}

impl ParameterList {
    pub fn new(default_instance: Option<DataType>) -> Self {
        let mut list = Self::default();
        if let Some(ty) = default_instance {
            list.params.push(Parameter {
                name: DEFAULT_INSTANCE_NAME.to_string(),
                ty,
                ordinal: 0,
            });
            list.has_default_instance = true;
        }
        list
    }

    pub fn push(&mut self, name: impl Into<String>, ty: DataType) -> &Parameter {
        let ordinal = self.params.len();
        self.params.push(Parameter {
            name: name.into(),
            ty,
            ordinal,
        });
        &self.params[ordinal]
    }

    /// Most recently declared parameter named `name`.
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().rev().find(|p| p.name == name)
    }

    pub fn default_instance(&self) -> Option<&Parameter> {
        self.has_default_instance.then(|| &self.params[0])
    }

    pub fn has_default_instance(&self) -> bool {
        self.has_default_instance
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn types(&self) -> Vec<DataType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl fmt::Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", p.ty, p.name)?;
        }
        f.write_str(")")
    }
}
