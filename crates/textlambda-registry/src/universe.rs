//! The interface the parser uses to resolve names against known types.

use textlambda_core::DataType;

use crate::{MemberFlags, NativeFn};

/// A method overload chosen for a call site, with generic parameters of the
/// receiver already substituted.
#[derive(Debug, Clone)]
pub struct MethodRef {
    pub owner: DataType,
    pub name: String,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    pub is_static: bool,
    pub native: NativeFn,
}

/// A property or field chosen for a member access.
#[derive(Debug, Clone)]
pub struct MemberRef {
    pub owner: DataType,
    pub name: String,
    pub ty: DataType,
    pub flags: MemberFlags,
    pub getter: NativeFn,
    pub setter: Option<NativeFn>,
}

impl MemberRef {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorRef {
    pub ty: DataType,
    pub params: Vec<DataType>,
    pub native: NativeFn,
}

/// The designated default member of a type and its getter.
#[derive(Debug, Clone)]
pub struct IndexerRef {
    pub property: String,
    pub getter: MethodRef,
}

/// Queryable set of known types, members and overloads.
///
/// All lookups are synchronous and side-effect free. Overloads are matched
/// by exact parameter types; the only relaxation is that a `null` argument
/// matches any parameter type that admits `null`.
pub trait TypeUniverse {
    /// Look up a type by its fully-qualified name. Generic definitions are
    /// named with their arity suffix (`System.Collections.Generic.List`1`).
    fn resolve_by_name(&self, qualified_name: &str) -> Option<DataType>;

    /// Close a generic definition over `args`.
    fn instantiate(&self, definition: &DataType, args: &[DataType]) -> Option<DataType>;

    /// A property, then a field, named `name` on `ty` or its bases.
    /// `static_only` selects static members; otherwise instance members.
    fn resolve_member(&self, ty: &DataType, name: &str, static_only: bool) -> Option<MemberRef>;

    /// The overload of `name` whose parameter types equal `arg_types`.
    /// `static_only` selects static methods; otherwise instance methods.
    fn resolve_method(
        &self,
        ty: &DataType,
        name: &str,
        arg_types: &[DataType],
        static_only: bool,
    ) -> Option<MethodRef>;

    fn resolve_constructor(&self, ty: &DataType, arg_types: &[DataType])
    -> Option<ConstructorRef>;

    /// Indexer through the type's default-member designation.
    fn resolve_indexer(&self, ty: &DataType) -> Option<IndexerRef>;

    /// Whether a value of static type `from` may be used where `to` is
    /// expected without an explicit conversion.
    fn is_assignable(&self, from: &DataType, to: &DataType) -> bool;
}

/// Exact overload match with the `null` relaxation.
pub fn params_match(params: &[DataType], args: &[DataType]) -> bool {
    params.len() == args.len()
        && params
            .iter()
            .zip(args)
            .all(|(param, arg)| param == arg || (*arg == DataType::Null && param.accepts_null()))
}
