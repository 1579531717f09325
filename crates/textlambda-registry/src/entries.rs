//! Registry storage records.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use textlambda_core::{DataType, TypeHash};

use crate::NativeFn;

bitflags! {
    /// Properties of a registered member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        /// Reached through the type name rather than an instance.
        const STATIC = 1 << 0;
        /// A field rather than a property.
        const FIELD = 1 << 1;
        /// Has a setter, so it may appear in a member initializer.
        const WRITABLE = 1 << 2;
    }
}

impl MemberFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(MemberFlags::STATIC)
    }
}

/// How a registered type may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Instantiable reference type.
    Class,
    /// Only static members (`Math`, `Convert`).
    Static,
    /// Built-in value or reference type (`int`, `string`, `object`).
    Builtin,
}

/// A method, constructor or indexer getter overload.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub id: TypeHash,
    pub name: String,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    pub flags: MemberFlags,
    pub native: NativeFn,
}

/// A property or field.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    pub name: String,
    pub ty: DataType,
    pub flags: MemberFlags,
    pub getter: NativeFn,
    pub setter: Option<NativeFn>,
}

/// Everything known about one registered type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub name: String,
    pub hash: TypeHash,
    pub data_type: DataType,
    pub kind: TypeKind,
    pub base: Option<String>,
    /// Property designated as the indexer (`Item`, `Chars`).
    pub default_member: Option<String>,
    pub constructors: Vec<FunctionEntry>,
    pub methods: FxHashMap<String, Vec<FunctionEntry>>,
    pub properties: FxHashMap<String, PropertyEntry>,
}

impl TypeEntry {
    pub fn new(name: &str, data_type: DataType, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            hash: TypeHash::of_type(name),
            data_type,
            kind,
            base: None,
            default_member: None,
            constructors: Vec::new(),
            methods: FxHashMap::default(),
            properties: FxHashMap::default(),
        }
    }

    /// Number of generic parameters declared by the name's `` `N`` suffix.
    pub fn arity(&self) -> usize {
        match &self.data_type {
            DataType::Class(class) => class.arity(),
            _ => 0,
        }
    }

    pub fn overloads(&self, name: &str) -> &[FunctionEntry] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Name of the getter method behind an indexer property.
pub fn indexer_getter_name(property: &str) -> String {
    format!("get_{property}")
}
