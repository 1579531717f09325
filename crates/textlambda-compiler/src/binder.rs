//! Binding a source text to a [`Signature`].
//!
//! Decides where the default instance comes from, runs the parser over the
//! whole input and converts the body to the declared result type.

use textlambda_core::{CompileError, DataType, Span};
use textlambda_parser::ast::promotion::implicitly_converts;
use textlambda_parser::{Expr, ParamSpec, ParameterList};
use textlambda_registry::TypeUniverse;
use tracing::debug;

use crate::{CompileOptions, Signature};

/// A parsed body ready for lowering.
#[derive(Debug, Clone)]
pub struct BoundLambda {
    pub params: ParameterList,
    /// Already converted to `return_type`.
    pub body: Expr,
    pub return_type: DataType,
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind(
    universe: &dyn TypeUniverse,
    signature: &Signature,
    source: &str,
    options: &CompileOptions,
) -> Result<BoundLambda, CompileError> {
    let (default_instance, declared) = split_default_instance(signature, options)?;
    let parsed = textlambda_parser::parse(
        source,
        universe,
        declared,
        default_instance,
        &options.namespaces,
    )?;

    let body = convert_result(universe, parsed.body, signature.return_type.as_ref())?;
    let return_type = signature
        .return_type
        .clone()
        .unwrap_or_else(|| body.ty.clone());
    debug!(
        params = parsed.params.len(),
        return_type = %return_type,
        "bound expression"
    );
    Ok(BoundLambda {
        params: parsed.params,
        body,
        return_type,
    })
}

/// The implicit receiver type and the parameters the lambda header binds.
///
/// `None` parameters leave the header to declare them.
fn split_default_instance<'s>(
    signature: &'s Signature,
    options: &CompileOptions,
) -> Result<(Option<DataType>, Option<&'s [ParamSpec]>), CompileError> {
    if !options.first_parameter_is_default_instance {
        return Ok((options.default_instance.clone(), signature.declared()));
    }
    let Some((first, rest)) = signature.declared().and_then(|params| params.split_first()) else {
        return Err(CompileError::signature(
            Span::default(),
            "the first parameter is the default instance but the signature has none",
        ));
    };
    let Some(ty) = first.ty.clone() else {
        return Err(CompileError::signature(
            Span::default(),
            "the default instance parameter must have a declared type",
        ));
    };
    Ok((Some(ty), Some(rest)))
}

fn convert_result(
    universe: &dyn TypeUniverse,
    body: Expr,
    declared: Option<&DataType>,
) -> Result<Expr, CompileError> {
    let Some(target) = declared else {
        return Ok(body);
    };
    if target.is_void() {
        return Ok(body);
    }
    if body.ty.is_void() {
        return Err(CompileError::mismatch(
            body.span,
            format!("the expression has no value but the signature returns '{target}'"),
        ));
    }
    if implicitly_converts(universe, &body.ty, target) {
        Ok(body.cast_to(target))
    } else {
        Err(CompileError::mismatch(
            body.span,
            format!(
                "cannot implicitly convert type '{}' to the result type '{target}'",
                body.ty
            ),
        ))
    }
}
