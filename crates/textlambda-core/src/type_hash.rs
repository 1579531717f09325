//! Deterministic identity for registered types and members.
//!
//! A [`TypeHash`] is computed from a fully-qualified name, so the parser can
//! build a `DataType` for `System.Random` before asking the registry whether
//! such a type exists, and two registries agree on every identity.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Seeds keeping type and member hashes in separate domains.
mod seed {
    pub const TYPE: u64 = 0x2fac_10b6_3a6c_c57c;
    pub const MEMBER: u64 = 0x7d3e_51c4_a0f2_9b11;
}

/// 64-bit identity of a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Hash of the unnamed type, never produced by [`TypeHash::of_type`].
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Identity of a type from its fully-qualified name (`System.Math`,
    /// `System.Collections.Generic.List`1`).
    #[inline]
    pub fn of_type(qualified_name: &str) -> Self {
        TypeHash(xxh64(qualified_name.as_bytes(), seed::TYPE))
    }

    /// Identity of a member overload: owner, member name and parameter types.
    pub fn of_member(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let mut h = xxh64(name.as_bytes(), seed::MEMBER ^ owner.0);
        for param in params {
            h = h.rotate_left(5) ^ param.0;
        }
        TypeHash(h)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
