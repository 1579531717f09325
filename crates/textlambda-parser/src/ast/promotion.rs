//! Numeric promotion and type unification.
//!
//! Promotion follows a fixed linear rank (byte < short < ushort < int < uint
//! < long < ulong < float < double < decimal): of two ranked operands the
//! lower one converts to the higher one's kind. `long`/`ulong` mixing is not
//! special-cased. `sbyte`, `char` and `bool` are unranked and only combine
//! with their own kind.

use textlambda_core::DataType;
use textlambda_registry::TypeUniverse;

/// Operand type of a binary arithmetic operator over `left` and `right`.
pub fn promote(left: &DataType, right: &DataType) -> Option<DataType> {
    if left == right && left.is_numeric() {
        return Some(left.clone());
    }
    let (l, r) = (left.rank()?, right.rank()?);
    Some(DataType::Primitive(if l >= r { l.kind() } else { r.kind() }))
}

/// Whether `from` widens to `to` without an explicit cast.
pub fn widens_to(from: &DataType, to: &DataType) -> bool {
    match (from.rank(), to.rank()) {
        (Some(f), Some(t)) => f <= t,
        _ => false,
    }
}

/// Whether an expression of type `from` may be used where `to` is expected
/// without an explicit cast: identity, numeric widening, `null` into a
/// nullable-capable type, lifting into `T?`, boxing into `object`, and
/// reference conversions the universe allows.
pub fn implicitly_converts(universe: &dyn TypeUniverse, from: &DataType, to: &DataType) -> bool {
    if from == to || widens_to(from, to) {
        return true;
    }
    if let Some(inner) = to.nullable_inner() {
        if *from == DataType::Null {
            return true;
        }
        let from = from.nullable_inner().unwrap_or(from);
        return implicitly_converts(universe, from, inner);
    }
    !from.is_void() && universe.is_assignable(from, to)
}

/// Common type of the two branches of a conditional.
pub fn unify(universe: &dyn TypeUniverse, a: &DataType, b: &DataType) -> Option<DataType> {
    if a == b {
        return Some(a.clone());
    }
    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => Some(if other.accepts_null() {
            other.clone()
        } else {
            DataType::nullable(other.clone())
        }),
        _ if a.rank().is_some() && b.rank().is_some() => promote(a, b),
        _ if implicitly_converts(universe, b, a) => Some(a.clone()),
        _ if implicitly_converts(universe, a, b) => Some(b.clone()),
        _ => None,
    }
}

/// Whether an explicit `(to)operand` cast is allowed from `from`.
pub fn cast_allowed(universe: &dyn TypeUniverse, from: &DataType, to: &DataType) -> bool {
    if from == to || *from == DataType::Object || *to == DataType::Object {
        return true;
    }
    if *from == DataType::Null {
        return to.accepts_null();
    }
    let numeric_like = |t: &DataType| t.is_numeric() || *t == DataType::CHAR;
    if numeric_like(from) && numeric_like(to) {
        return true;
    }
    if from.nullable_inner().is_some() || to.nullable_inner().is_some() {
        let f = from.nullable_inner().unwrap_or(from);
        let t = to.nullable_inner().unwrap_or(to);
        return cast_allowed(universe, f, t);
    }
    if from.is_value_type() || to.is_value_type() {
        return false;
    }
    universe.is_assignable(from, to) || universe.is_assignable(to, from)
}

#[cfg(test)]
mod tests {
    use textlambda_registry::TypeRegistry;

    use super::*;

    #[test]
    fn lower_rank_converts_up() {
        assert_eq!(promote(&DataType::INT, &DataType::DOUBLE), Some(DataType::DOUBLE));
        assert_eq!(promote(&DataType::DOUBLE, &DataType::INT), Some(DataType::DOUBLE));
        assert_eq!(promote(&DataType::BYTE, &DataType::SHORT), Some(DataType::SHORT));
        assert_eq!(promote(&DataType::DOUBLE, &DataType::DECIMAL), Some(DataType::DECIMAL));
    }

    #[test]
    fn long_and_ulong_follow_the_linear_order() {
        assert_eq!(promote(&DataType::LONG, &DataType::ULONG), Some(DataType::ULONG));
        assert_eq!(promote(&DataType::UINT, &DataType::INT), Some(DataType::UINT));
    }

    #[test]
    fn unranked_kinds_only_combine_with_themselves() {
        assert_eq!(promote(&DataType::SBYTE, &DataType::SBYTE), Some(DataType::SBYTE));
        assert_eq!(promote(&DataType::SBYTE, &DataType::INT), None);
        assert_eq!(promote(&DataType::CHAR, &DataType::INT), None);
        assert_eq!(promote(&DataType::BOOL, &DataType::BOOL), None);
        assert_eq!(promote(&DataType::String, &DataType::INT), None);
    }

    #[test]
    fn conditional_branches_unify() {
        let registry = TypeRegistry::new();
        assert_eq!(
            unify(&registry, &DataType::INT, &DataType::DOUBLE),
            Some(DataType::DOUBLE)
        );
        assert_eq!(
            unify(&registry, &DataType::Null, &DataType::INT),
            Some(DataType::nullable(DataType::INT))
        );
        assert_eq!(
            unify(&registry, &DataType::String, &DataType::Null),
            Some(DataType::String)
        );
        assert_eq!(
            unify(&registry, &DataType::nullable(DataType::INT), &DataType::INT),
            Some(DataType::nullable(DataType::INT))
        );
        assert_eq!(unify(&registry, &DataType::String, &DataType::INT), None);
    }

    #[test]
    fn explicit_casts() {
        let registry = TypeRegistry::new();
        assert!(cast_allowed(&registry, &DataType::DOUBLE, &DataType::INT));
        assert!(cast_allowed(&registry, &DataType::INT, &DataType::CHAR));
        assert!(cast_allowed(&registry, &DataType::Object, &DataType::INT));
        assert!(cast_allowed(&registry, &DataType::nullable(DataType::INT), &DataType::INT));
        assert!(!cast_allowed(&registry, &DataType::String, &DataType::INT));
        assert!(!cast_allowed(&registry, &DataType::BOOL, &DataType::INT));
    }
}
