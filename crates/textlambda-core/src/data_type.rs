//! Static types of expressions.
//!
//! Every AST node carries a [`DataType`]. The parser uses it to pick operator
//! semantics (numeric promotion, string concatenation, array vs. indexer), and
//! the registry uses it as the key for member lookup.

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::{NumericRank, PrimitiveKind, TypeHash};

/// A registered host type, possibly a generic instantiation.
///
/// Generic definitions are named with an arity suffix (`List`1`) and have no
/// `args`; instantiations share the definition's name and hash and list their
/// argument types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: Arc<str>,
    pub hash: TypeHash,
    pub args: Vec<DataType>,
}

impl ClassType {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            hash: TypeHash::of_type(name),
            args: Vec::new(),
        }
    }

    /// Declared number of generic parameters, from the `` `N`` suffix.
    pub fn arity(&self) -> usize {
        self.name
            .rsplit_once('`')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }

    /// An open generic such as `List`1` with no arguments supplied.
    pub fn is_generic_definition(&self) -> bool {
        self.args.is_empty() && self.arity() > 0
    }

    /// Name without namespace or arity suffix: `List` for `System.Collections.Generic.List`1`.
    pub fn simple_name(&self) -> &str {
        let base = self.name.split('`').next().unwrap_or(&self.name);
        base.rsplit('.').next().unwrap_or(base)
    }
}

/// The static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Result of a method with no return value.
    Void,
    /// Type of the `null` literal before context gives it a type.
    Null,
    /// `object`, the root of every type.
    Object,
    /// `string`.
    String,
    Primitive(PrimitiveKind),
    /// `T?` over a value type.
    Nullable(Box<DataType>),
    /// Single-dimension `T[]`.
    Array(Box<DataType>),
    Class(ClassType),
    /// Generic parameter `N` of the declaring type, in member signatures.
    Param(u8),
}

lazy_static! {
    static ref ALIASES: FxHashMap<&'static str, DataType> = {
        let mut map = FxHashMap::default();
        for kind in PrimitiveKind::ALL {
            map.insert(kind.alias(), DataType::Primitive(kind));
        }
        map.insert("string", DataType::String);
        map.insert("object", DataType::Object);
        map
    };
}

impl DataType {
    pub const BOOL: DataType = DataType::Primitive(PrimitiveKind::Bool);
    pub const CHAR: DataType = DataType::Primitive(PrimitiveKind::Char);
    pub const SBYTE: DataType = DataType::Primitive(PrimitiveKind::SByte);
    pub const BYTE: DataType = DataType::Primitive(PrimitiveKind::Byte);
    pub const SHORT: DataType = DataType::Primitive(PrimitiveKind::Short);
    pub const USHORT: DataType = DataType::Primitive(PrimitiveKind::UShort);
    pub const INT: DataType = DataType::Primitive(PrimitiveKind::Int);
    pub const UINT: DataType = DataType::Primitive(PrimitiveKind::UInt);
    pub const LONG: DataType = DataType::Primitive(PrimitiveKind::Long);
    pub const ULONG: DataType = DataType::Primitive(PrimitiveKind::ULong);
    pub const FLOAT: DataType = DataType::Primitive(PrimitiveKind::Float);
    pub const DOUBLE: DataType = DataType::Primitive(PrimitiveKind::Double);
    pub const DECIMAL: DataType = DataType::Primitive(PrimitiveKind::Decimal);

    /// Keyword aliases: the primitive kinds plus `string` and `object`.
    pub fn from_alias(alias: &str) -> Option<DataType> {
        ALIASES.get(alias).cloned()
    }

    /// Built-in types addressed by their qualified names (`System.Int32`).
    pub fn builtin(qualified_name: &str) -> Option<DataType> {
        match qualified_name {
            "System.String" => Some(DataType::String),
            "System.Object" => Some(DataType::Object),
            "System.Void" => Some(DataType::Void),
            other => PrimitiveKind::from_qualified_name(other).map(DataType::Primitive),
        }
    }

    pub fn class(name: &str) -> DataType {
        DataType::Class(ClassType::new(name))
    }

    pub fn generic(name: &str, args: Vec<DataType>) -> DataType {
        let mut class = ClassType::new(name);
        class.args = args;
        DataType::Class(class)
    }

    pub fn nullable(inner: DataType) -> DataType {
        match inner {
            nullable @ DataType::Nullable(_) => nullable,
            inner => DataType::Nullable(Box::new(inner)),
        }
    }

    pub fn array(element: DataType) -> DataType {
        DataType::Array(Box::new(element))
    }

    #[inline]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            DataType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    #[inline]
    pub fn rank(&self) -> Option<NumericRank> {
        self.primitive().and_then(PrimitiveKind::rank)
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive().is_some_and(PrimitiveKind::is_numeric)
    }

    pub fn is_integral(&self) -> bool {
        self.primitive().is_some_and(PrimitiveKind::is_integral)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, DataType::Primitive(PrimitiveKind::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::String)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    /// Whether a `null` value may inhabit this type.
    pub fn accepts_null(&self) -> bool {
        !matches!(self, DataType::Primitive(_) | DataType::Void | DataType::Param(_))
    }

    /// Primitives and nullable primitives; everything else is a reference.
    pub fn is_value_type(&self) -> bool {
        matches!(self, DataType::Primitive(_) | DataType::Nullable(_))
    }

    pub fn nullable_inner(&self) -> Option<&DataType> {
        match self {
            DataType::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            DataType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Generic arguments of an instantiation, or the wrapped type of `T?`.
    pub fn type_args(&self) -> &[DataType] {
        match self {
            DataType::Class(class) => &class.args,
            DataType::Nullable(inner) => std::slice::from_ref(inner.as_ref()),
            _ => &[],
        }
    }

    /// Name of the registry entry that declares this type's members.
    pub fn entry_name(&self) -> &str {
        match self {
            DataType::Void => "System.Void",
            DataType::Null | DataType::Param(_) => "",
            DataType::Object => "System.Object",
            DataType::String => "System.String",
            DataType::Primitive(kind) => kind.qualified_name(),
            DataType::Nullable(_) => "System.Nullable`1",
            DataType::Array(_) => "System.Array",
            DataType::Class(class) => &class.name,
        }
    }

    pub fn type_hash(&self) -> TypeHash {
        match self {
            DataType::Class(class) => class.hash,
            DataType::Null | DataType::Param(_) => TypeHash::EMPTY,
            other => TypeHash::of_type(other.entry_name()),
        }
    }

    /// Replace generic parameter placeholders with concrete arguments.
    pub fn substitute(&self, args: &[DataType]) -> DataType {
        match self {
            DataType::Param(index) => args
                .get(*index as usize)
                .cloned()
                .unwrap_or(DataType::Param(*index)),
            DataType::Nullable(inner) => DataType::nullable(inner.substitute(args)),
            DataType::Array(element) => DataType::array(element.substitute(args)),
            DataType::Class(class) if !class.args.is_empty() => {
                let mut class = class.clone();
                class.args = class.args.iter().map(|a| a.substitute(args)).collect();
                DataType::Class(class)
            }
            other => other.clone(),
        }
    }

    /// Runtime-style full name: `System.Collections.Generic.List`1[System.Int32]`.
    pub fn full_name(&self) -> String {
        match self {
            DataType::Null => "null".to_string(),
            DataType::Param(index) => format!("T{index}"),
            DataType::Array(element) => format!("{}[]", element.full_name()),
            DataType::Nullable(inner) => format!("System.Nullable`1[{}]", inner.full_name()),
            DataType::Class(class) if !class.args.is_empty() => {
                let args: Vec<String> = class.args.iter().map(DataType::full_name).collect();
                format!("{}[{}]", class.name, args.join(","))
            }
            other => other.entry_name().to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => f.write_str("void"),
            DataType::Null => f.write_str("null"),
            DataType::Object => f.write_str("object"),
            DataType::String => f.write_str("string"),
            DataType::Primitive(kind) => f.write_str(kind.alias()),
            DataType::Nullable(inner) => write!(f, "{inner}?"),
            DataType::Array(element) => write!(f, "{element}[]"),
            DataType::Param(index) => write!(f, "T{index}"),
            DataType::Class(class) if class.args.is_empty() => f.write_str(&class.name),
            DataType::Class(class) => {
                let base = class.name.split('`').next().unwrap_or(&class.name);
                write!(f, "{base}<")?;
                for (i, arg) in class.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_cover_primitives_string_and_object() {
        assert_eq!(DataType::from_alias("int"), Some(DataType::INT));
        assert_eq!(DataType::from_alias("string"), Some(DataType::String));
        assert_eq!(DataType::from_alias("object"), Some(DataType::Object));
        assert_eq!(DataType::from_alias("Int32"), None);
    }

    #[test]
    fn builtin_qualified_names() {
        assert_eq!(DataType::builtin("System.Double"), Some(DataType::DOUBLE));
        assert_eq!(DataType::builtin("System.String"), Some(DataType::String));
        assert_eq!(DataType::builtin("System.Math"), None);
    }

    #[test]
    fn generic_names_and_substitution() {
        let list = DataType::class("System.Collections.Generic.List`1");
        let DataType::Class(class) = &list else {
            panic!("expected class");
        };
        assert_eq!(class.arity(), 1);
        assert!(class.is_generic_definition());
        assert_eq!(class.simple_name(), "List");

        let add_param = DataType::Param(0);
        assert_eq!(add_param.substitute(&[DataType::INT]), DataType::INT);

        let of_int = DataType::generic("System.Collections.Generic.List`1", vec![DataType::INT]);
        assert_eq!(of_int.to_string(), "System.Collections.Generic.List<int>");
        assert_eq!(
            of_int.full_name(),
            "System.Collections.Generic.List`1[System.Int32]"
        );
        assert_eq!(of_int.type_hash(), list.type_hash());
    }

    #[test]
    fn nullability() {
        assert!(!DataType::INT.accepts_null());
        assert!(DataType::nullable(DataType::INT).accepts_null());
        assert!(DataType::String.accepts_null());
        assert_eq!(
            DataType::nullable(DataType::nullable(DataType::INT)),
            DataType::nullable(DataType::INT)
        );
        assert_eq!(DataType::nullable(DataType::INT).to_string(), "int?");
    }
}
