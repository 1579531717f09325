//! TypeRegistry - the concrete type universe.
//!
//! Types are stored by qualified name, with a hash index for lookups that
//! start from a [`DataType`]. The registry is populated once (usually by
//! `textlambda_modules::install_all` plus host registrations) and is then
//! only read; compiled functions keep clones of the native callables they
//! use and never reference the registry again.

use rustc_hash::FxHashMap;
use textlambda_core::{DataType, RegistrationError, TypeHash};

use crate::entries::indexer_getter_name;
use crate::universe::params_match;
use crate::{
    ConstructorRef, FunctionEntry, Hierarchy, IndexerRef, MemberRef, MethodRef, TypeEntry,
    TypeKind, TypeUniverse,
};

const OBJECT: &str = "System.Object";
const NULLABLE: &str = "System.Nullable`1";

#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeEntry>,
    names_by_hash: FxHashMap<TypeHash, String>,
    hierarchy: Hierarchy,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type. Its base, when named, must already be registered.
    pub fn register(&mut self, entry: TypeEntry) -> Result<(), RegistrationError> {
        if self.types.contains_key(&entry.name) {
            return Err(RegistrationError::DuplicateType { name: entry.name });
        }
        self.hierarchy.add_type(entry.hash);
        if let Some(base) = &entry.base {
            let Some(base_entry) = self.types.get(base) else {
                return Err(RegistrationError::UnknownBase {
                    name: entry.name,
                    base: base.clone(),
                });
            };
            self.hierarchy.set_base(entry.hash, base_entry.hash);
        }
        self.names_by_hash.insert(entry.hash, entry.name.clone());
        self.types.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeEntry> {
        self.types.get(qualified_name)
    }

    pub fn get_by_hash(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.names_by_hash.get(&hash).and_then(|n| self.types.get(n))
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The entry declaring the members of `ty`.
    pub fn entry_for(&self, ty: &DataType) -> Option<&TypeEntry> {
        self.types.get(ty.entry_name())
    }

    /// The entry for `ty` followed by its ancestors, nearest first.
    pub fn lineage(&self, ty: &DataType) -> Vec<&TypeEntry> {
        let Some(entry) = self.entry_for(ty) else {
            return Vec::new();
        };
        let mut chain = vec![entry];
        chain.extend(
            self.hierarchy
                .ancestors(entry.hash)
                .into_iter()
                .filter_map(|hash| self.get_by_hash(hash)),
        );
        if entry.name != OBJECT && !chain.iter().any(|e| e.name == OBJECT) {
            chain.extend(self.types.get(OBJECT));
        }
        chain
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    fn method_ref(owner: &DataType, entry: &FunctionEntry) -> MethodRef {
        let args = owner.type_args();
        MethodRef {
            owner: owner.clone(),
            name: entry.name.clone(),
            params: entry.params.iter().map(|p| p.substitute(args)).collect(),
            return_type: entry.return_type.substitute(args),
            is_static: entry.flags.is_static(),
            native: entry.native.clone(),
        }
    }
}

impl TypeUniverse for TypeRegistry {
    fn resolve_by_name(&self, qualified_name: &str) -> Option<DataType> {
        DataType::builtin(qualified_name)
            .or_else(|| self.types.get(qualified_name).map(|e| e.data_type.clone()))
    }

    fn instantiate(&self, definition: &DataType, args: &[DataType]) -> Option<DataType> {
        let DataType::Class(class) = definition else {
            return None;
        };
        let entry = self.types.get(&*class.name)?;
        if !class.args.is_empty() || entry.arity() != args.len() {
            return None;
        }
        if entry.name == NULLABLE {
            return match &args[0] {
                DataType::Primitive(_) => Some(DataType::nullable(args[0].clone())),
                _ => None,
            };
        }
        Some(DataType::generic(&class.name, args.to_vec()))
    }

    fn resolve_member(&self, ty: &DataType, name: &str, static_only: bool) -> Option<MemberRef> {
        let args = ty.type_args();
        self.lineage(ty).into_iter().find_map(|entry| {
            let prop = entry.properties.get(name)?;
            (prop.flags.is_static() == static_only).then(|| MemberRef {
                owner: ty.clone(),
                name: prop.name.clone(),
                ty: prop.ty.substitute(args),
                flags: prop.flags,
                getter: prop.getter.clone(),
                setter: prop.setter.clone(),
            })
        })
    }

    fn resolve_method(
        &self,
        ty: &DataType,
        name: &str,
        arg_types: &[DataType],
        static_only: bool,
    ) -> Option<MethodRef> {
        self.lineage(ty).into_iter().find_map(|entry| {
            entry
                .overloads(name)
                .iter()
                .filter(|f| f.flags.is_static() == static_only)
                .map(|f| Self::method_ref(ty, f))
                .find(|m| params_match(&m.params, arg_types))
        })
    }

    fn resolve_constructor(
        &self,
        ty: &DataType,
        arg_types: &[DataType],
    ) -> Option<ConstructorRef> {
        let entry = self.entry_for(ty)?;
        if entry.kind != TypeKind::Class || entry.arity() != ty.type_args().len() {
            return None;
        }
        let args = ty.type_args();
        entry.constructors.iter().find_map(|ctor| {
            let params: Vec<DataType> = ctor.params.iter().map(|p| p.substitute(args)).collect();
            params_match(&params, arg_types).then(|| ConstructorRef {
                ty: ty.clone(),
                params,
                native: ctor.native.clone(),
            })
        })
    }

    fn resolve_indexer(&self, ty: &DataType) -> Option<IndexerRef> {
        self.lineage(ty).into_iter().find_map(|entry| {
            let property = entry.default_member.as_ref()?;
            let getter = entry.overloads(&indexer_getter_name(property)).first()?;
            Some(IndexerRef {
                property: property.clone(),
                getter: Self::method_ref(ty, getter),
            })
        })
    }

    fn is_assignable(&self, from: &DataType, to: &DataType) -> bool {
        if from == to || *to == DataType::Object {
            return true;
        }
        match (from, to) {
            (DataType::Null, to) => to.accepts_null(),
            (from, DataType::Nullable(inner)) => **inner == *from,
            (DataType::Class(f), DataType::Class(t)) => {
                (t.args.is_empty() || f.args == t.args)
                    && self.hierarchy.derives_from(f.hash, t.hash)
            }
            _ => false,
        }
    }
}
