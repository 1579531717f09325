//! The function shape an expression is compiled against.

use std::fmt;

use textlambda_core::DataType;
use textlambda_parser::ParamSpec;

/// Ordered parameters with optional names and types, plus an optional
/// return type.
///
/// A parameter without a type takes its type from a typed lambda header, or
/// `object` when the header leaves it untyped too. Without a return type the
/// body's own type is the result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// `None` lets the lambda header decide how many parameters there are.
    pub params: Option<Vec<ParamSpec>>,
    pub return_type: Option<DataType>,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            params: Some(Vec::new()),
            return_type: None,
        }
    }
}

impl Signature {
    /// No parameters, result type taken from the body.
    pub fn new() -> Self {
        Self::default()
    }

    /// A generic evaluator of `count` untyped parameters.
    pub fn untyped(count: usize) -> Self {
        Self {
            params: Some(vec![ParamSpec::untyped(); count]),
            return_type: None,
        }
    }

    /// A generic evaluator whose parameters are whatever the lambda header
    /// declares: its names, its explicit types, `object` for the rest.
    ///
    /// A headerless body compiled against this takes no arguments.
    pub fn inferred() -> Self {
        Self {
            params: None,
            return_type: None,
        }
    }

    /// Append an unnamed parameter of type `ty`.
    pub fn param(self, ty: DataType) -> Self {
        self.push(ParamSpec::typed(ty))
    }

    /// Append a parameter that a headerless body can refer to by `name`.
    pub fn named(self, name: impl Into<String>, ty: DataType) -> Self {
        self.push(ParamSpec::named(name, ty))
    }

    fn push(mut self, spec: ParamSpec) -> Self {
        self.params.get_or_insert_with(Vec::new).push(spec);
        self
    }

    pub fn returns(mut self, ty: DataType) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// The declared parameters, or `None` when the header supplies them.
    pub fn declared(&self) -> Option<&[ParamSpec]> {
        self.params.as_deref()
    }

    pub fn arity(&self) -> Option<usize> {
        self.params.as_ref().map(Vec::len)
    }

    /// Whether every parameter and the result have a declared type.
    pub fn is_fully_typed(&self) -> bool {
        self.return_type.is_some()
            && self
                .params
                .as_ref()
                .is_some_and(|params| params.iter().all(|p| p.ty.is_some()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(params) = &self.params else {
            f.write_str("(..)")?;
            if let Some(ret) = &self.return_type {
                write!(f, " -> {ret}")?;
            }
            return Ok(());
        };
        f.write_str("(")?;
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &param.ty {
                Some(ty) => write!(f, "{ty}")?,
                None => f.write_str("?")?,
            }
            if let Some(name) = &param.name {
                write!(f, " {name}")?;
            }
        }
        f.write_str(")")?;
        if let Some(ret) = &self.return_type {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}
