//! Built-in value kinds and the numeric widening order.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The primitive value kinds an expression can produce.
///
/// `string` and `object` are not primitives here; they are separate
/// [`DataType`](crate::DataType) variants because they are reference types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::SByte,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::UShort,
        PrimitiveKind::Int,
        PrimitiveKind::UInt,
        PrimitiveKind::Long,
        PrimitiveKind::ULong,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Decimal,
    ];

    /// The keyword alias used in expression text (`int`, `double`, ...).
    pub const fn alias(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::SByte => "sbyte",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::UShort => "ushort",
            PrimitiveKind::Int => "int",
            PrimitiveKind::UInt => "uint",
            PrimitiveKind::Long => "long",
            PrimitiveKind::ULong => "ulong",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Decimal => "decimal",
        }
    }

    /// The fully-qualified name the type is registered under.
    pub const fn qualified_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::SByte => "System.SByte",
            PrimitiveKind::Byte => "System.Byte",
            PrimitiveKind::Short => "System.Int16",
            PrimitiveKind::UShort => "System.UInt16",
            PrimitiveKind::Int => "System.Int32",
            PrimitiveKind::UInt => "System.UInt32",
            PrimitiveKind::Long => "System.Int64",
            PrimitiveKind::ULong => "System.UInt64",
            PrimitiveKind::Float => "System.Single",
            PrimitiveKind::Double => "System.Double",
            PrimitiveKind::Decimal => "System.Decimal",
        }
    }

    /// Storage size in bytes, as reported by `sizeof`.
    pub const fn size_of(self) -> i32 {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::SByte | PrimitiveKind::Byte => 1,
            PrimitiveKind::Char | PrimitiveKind::Short | PrimitiveKind::UShort => 2,
            PrimitiveKind::Int | PrimitiveKind::UInt | PrimitiveKind::Float => 4,
            PrimitiveKind::Long | PrimitiveKind::ULong | PrimitiveKind::Double => 8,
            PrimitiveKind::Decimal => 16,
        }
    }

    #[inline]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::SByte
                | PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::UShort
                | PrimitiveKind::Int
                | PrimitiveKind::UInt
                | PrimitiveKind::Long
                | PrimitiveKind::ULong
        )
    }

    #[inline]
    pub const fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// Integral, floating or decimal. `char` and `bool` are not numeric.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || matches!(self, PrimitiveKind::Decimal)
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::SByte
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
                | PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::Decimal
        )
    }

    /// Position in the widening order, if the kind takes part in promotion.
    pub fn rank(self) -> Option<NumericRank> {
        NumericRank::of(self)
    }

    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.alias() == alias)
    }

    pub fn from_qualified_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.qualified_name() == name)
    }
}

/// Total order used for implicit widening of arithmetic operands.
///
/// `sbyte` and `char` have no rank: mixing them with another kind in
/// arithmetic is a type error. `long`/`ulong` are ordered linearly even
/// though no implicit conversion exists between them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum NumericRank {
    Byte = 1,
    Short = 2,
    UShort = 3,
    Int = 4,
    UInt = 5,
    Long = 6,
    ULong = 7,
    Float = 8,
    Double = 9,
    Decimal = 10,
}

impl NumericRank {
    pub fn of(kind: PrimitiveKind) -> Option<Self> {
        Some(match kind {
            PrimitiveKind::Byte => NumericRank::Byte,
            PrimitiveKind::Short => NumericRank::Short,
            PrimitiveKind::UShort => NumericRank::UShort,
            PrimitiveKind::Int => NumericRank::Int,
            PrimitiveKind::UInt => NumericRank::UInt,
            PrimitiveKind::Long => NumericRank::Long,
            PrimitiveKind::ULong => NumericRank::ULong,
            PrimitiveKind::Float => NumericRank::Float,
            PrimitiveKind::Double => NumericRank::Double,
            PrimitiveKind::Decimal => NumericRank::Decimal,
            PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::SByte => return None,
        })
    }

    pub const fn kind(self) -> PrimitiveKind {
        match self {
            NumericRank::Byte => PrimitiveKind::Byte,
            NumericRank::Short => PrimitiveKind::Short,
            NumericRank::UShort => PrimitiveKind::UShort,
            NumericRank::Int => PrimitiveKind::Int,
            NumericRank::UInt => PrimitiveKind::UInt,
            NumericRank::Long => PrimitiveKind::Long,
            NumericRank::ULong => PrimitiveKind::ULong,
            NumericRank::Float => PrimitiveKind::Float,
            NumericRank::Double => PrimitiveKind::Double,
            NumericRank::Decimal => PrimitiveKind::Decimal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_matches_widening_chain() {
        let chain = [
            PrimitiveKind::Byte,
            PrimitiveKind::Short,
            PrimitiveKind::UShort,
            PrimitiveKind::Int,
            PrimitiveKind::UInt,
            PrimitiveKind::Long,
            PrimitiveKind::ULong,
            PrimitiveKind::Float,
            PrimitiveKind::Double,
            PrimitiveKind::Decimal,
        ];
        for pair in chain.windows(2) {
            assert!(pair[0].rank() < pair[1].rank(), "{:?}", pair);
        }
    }

    #[test]
    fn rank_discriminants_round_trip_through_u8() {
        let raw: u8 = NumericRank::Double.into();
        assert_eq!(raw, 9);
        assert_eq!(NumericRank::try_from(4u8).ok(), Some(NumericRank::Int));
        assert!(NumericRank::try_from(11u8).is_err());
    }

    #[test]
    fn unranked_kinds() {
        assert_eq!(PrimitiveKind::SByte.rank(), None);
        assert_eq!(PrimitiveKind::Char.rank(), None);
        assert_eq!(PrimitiveKind::Bool.rank(), None);
    }

    #[test]
    fn aliases_and_names() {
        assert_eq!(PrimitiveKind::from_alias("ulong"), Some(PrimitiveKind::ULong));
        assert_eq!(
            PrimitiveKind::from_qualified_name("System.Single"),
            Some(PrimitiveKind::Float)
        );
        assert_eq!(PrimitiveKind::from_alias("string"), None);
        assert_eq!(PrimitiveKind::Decimal.size_of(), 16);
    }
}
