//! Generic `List<T>` and `Dictionary<K,V>`.
//!
//! Both are registered as generic definitions; members refer to their type
//! parameters through `DataType::Param`, which the registry substitutes when
//! a member is resolved on a closed type such as `List<int>`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use textlambda_core::{
    ArrayValue, DataType, Decimal, HostClass, NativeError, RegistrationError, Value,
};
use textlambda_registry::{ClassBuilder, MemberFlags, TypeRegistry};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// KEYS
// =============================================================================

/// Hashable projection of a [`Value`] used for dictionary keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptKey {
    /// Any signed or narrow integer, widened to i64
    Int(i64),
    ULong(u64),
    /// Floating point key (uses OrderedFloat for hashing)
    Float(OrderedFloat<f64>),
    Decimal(Decimal),
    Bool(bool),
    Char(char),
    String(String),
    Type(String),
    /// Host object key (compared by identity)
    Object(usize),
    Null,
}

impl ScriptKey {
    /// Returns None for values without a stable identity (arrays).
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => ScriptKey::Null,
            Value::Bool(v) => ScriptKey::Bool(*v),
            Value::Char(v) => ScriptKey::Char(*v),
            Value::SByte(v) => ScriptKey::Int(i64::from(*v)),
            Value::Byte(v) => ScriptKey::Int(i64::from(*v)),
            Value::Short(v) => ScriptKey::Int(i64::from(*v)),
            Value::UShort(v) => ScriptKey::Int(i64::from(*v)),
            Value::Int(v) => ScriptKey::Int(i64::from(*v)),
            Value::UInt(v) => ScriptKey::Int(i64::from(*v)),
            Value::Long(v) => ScriptKey::Int(*v),
            Value::ULong(v) => ScriptKey::ULong(*v),
            Value::Float(v) => ScriptKey::Float(OrderedFloat(f64::from(*v))),
            Value::Double(v) => ScriptKey::Float(OrderedFloat(*v)),
            Value::Decimal(v) => ScriptKey::Decimal(*v),
            Value::String(v) => ScriptKey::String(v.to_string()),
            Value::Type(ty) => ScriptKey::Type(ty.full_name()),
            Value::Object(object) => ScriptKey::Object(object.addr()),
            Value::Array(_) => return None,
        })
    }
}

fn key_of(value: &Value) -> Result<ScriptKey, NativeError> {
    ScriptKey::from_value(value)
        .ok_or_else(|| NativeError::other(format!("{} cannot be used as a key", value.runtime_type())))
}

// =============================================================================
// LIST
// =============================================================================

/// `System.Collections.Generic.List<T>`.
#[derive(Default)]
pub struct ScriptList {
    items: Mutex<Vec<Value>>,
}

impl HostClass for ScriptList {
    const TYPE_NAME: &'static str = "System.Collections.Generic.List`1";
}

impl ScriptList {
    pub fn from_values(items: Vec<Value>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn push(&self, value: Value) {
        lock(&self.items).push(value);
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<Value> {
        lock(&self.items).clone()
    }

    pub fn get(&self, index: i64) -> Option<Value> {
        let items = lock(&self.items);
        usize::try_from(index).ok().and_then(|i| items.get(i)).cloned()
    }

    fn position(&self, value: &Value) -> Option<usize> {
        lock(&self.items).iter().position(|item| item.equals(value))
    }
}

fn install_list(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let t = DataType::Param(0);
    ClassBuilder::host::<ScriptList>(registry)
        .constructor(ScriptList::default)
        .method_raw("Add", vec![t.clone()], DataType::Void, |ctx| {
            ctx.this::<ScriptList>()?.push(ctx.arg_value(0)?.clone());
            Ok(Value::Null)
        })
        .method_raw("Contains", vec![t.clone()], DataType::BOOL, |ctx| {
            let list = ctx.this::<ScriptList>()?;
            Ok(Value::Bool(list.position(ctx.arg_value(0)?).is_some()))
        })
        .method_raw("IndexOf", vec![t.clone()], DataType::INT, |ctx| {
            let list = ctx.this::<ScriptList>()?;
            let index = list.position(ctx.arg_value(0)?).map_or(-1, |i| i as i32);
            Ok(Value::Int(index))
        })
        .property_raw(
            "Count",
            DataType::INT,
            MemberFlags::empty(),
            |ctx| Ok(Value::Int(ctx.this::<ScriptList>()?.len() as i32)),
            None,
        )
        .indexer_raw("Item", vec![DataType::INT], t.clone(), |ctx| {
            let index: i32 = ctx.arg(0)?;
            let list = ctx.this::<ScriptList>()?;
            list.get(i64::from(index)).ok_or_else(|| {
                NativeError::other(format!(
                    "index {index} is out of range for a list of {} items",
                    list.len()
                ))
            })
        })
        .method_raw("ToArray", vec![], DataType::array(t), |ctx| {
            let element = ctx
                .declaring_type()
                .type_args()
                .first()
                .cloned()
                .unwrap_or(DataType::Object);
            let items = ctx.this::<ScriptList>()?.to_vec();
            Ok(Value::Array(ArrayValue::new(element, items)))
        })
        .build()
}

// =============================================================================
// DICTIONARY
// =============================================================================

/// `System.Collections.Generic.Dictionary<K,V>`.
#[derive(Default)]
pub struct ScriptDictionary {
    entries: Mutex<FxHashMap<ScriptKey, Value>>,
}

impl HostClass for ScriptDictionary {
    const TYPE_NAME: &'static str = "System.Collections.Generic.Dictionary`2";
}

impl ScriptDictionary {
    /// Insert a new entry; fails if the key is already present.
    pub fn insert(&self, key: &Value, value: Value) -> Result<(), NativeError> {
        let key = key_of(key)?;
        let mut entries = lock(&self.entries);
        if entries.contains_key(&key) {
            return Err(NativeError::other(format!(
                "an item with the key {key:?} has already been added"
            )));
        }
        entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let key = ScriptKey::from_value(key)?;
        lock(&self.entries).get(&key).cloned()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        ScriptKey::from_value(key).is_some_and(|key| lock(&self.entries).contains_key(&key))
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn install_dictionary(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let (k, v) = (DataType::Param(0), DataType::Param(1));
    ClassBuilder::host::<ScriptDictionary>(registry)
        .constructor(ScriptDictionary::default)
        .method_raw("Add", vec![k.clone(), v.clone()], DataType::Void, |ctx| {
            let dict = ctx.this::<ScriptDictionary>()?;
            dict.insert(ctx.arg_value(0)?, ctx.arg_value(1)?.clone())?;
            Ok(Value::Null)
        })
        .method_raw("ContainsKey", vec![k.clone()], DataType::BOOL, |ctx| {
            let dict = ctx.this::<ScriptDictionary>()?;
            Ok(Value::Bool(dict.contains_key(ctx.arg_value(0)?)))
        })
        .property_raw(
            "Count",
            DataType::INT,
            MemberFlags::empty(),
            |ctx| Ok(Value::Int(ctx.this::<ScriptDictionary>()?.len() as i32)),
            None,
        )
        .indexer_raw("Item", vec![k], v, |ctx| {
            let key = ctx.arg_value(0)?;
            ctx.this::<ScriptDictionary>()?
                .get(key)
                .ok_or_else(|| NativeError::other(format!("the key '{key}' was not present")))
        })
        .build()
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    install_list(registry)?;
    install_dictionary(registry)
}

#[cfg(test)]
mod tests {
    use textlambda_core::HostObject;
    use textlambda_registry::{CallContext, TypeUniverse};

    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        install(&mut registry).unwrap();
        registry
    }

    #[test]
    fn float_keys_hash_by_value() {
        assert_eq!(
            ScriptKey::from_value(&Value::Double(1.5)),
            ScriptKey::from_value(&Value::Double(1.5))
        );
        assert_eq!(
            ScriptKey::from_value(&Value::Int(3)),
            Some(ScriptKey::Int(3))
        );
        let array = Value::Array(ArrayValue::new(DataType::INT, vec![]));
        assert_eq!(ScriptKey::from_value(&array), None);
    }

    #[test]
    fn dictionary_rejects_duplicate_keys() {
        let dict = ScriptDictionary::default();
        dict.insert(&Value::string("a"), Value::Int(1)).unwrap();
        assert!(dict.insert(&Value::string("a"), Value::Int(2)).is_err());
        assert_eq!(dict.get(&Value::string("a")), Some(Value::Int(1)));
        assert!(dict.contains_key(&Value::string("a")));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn list_members_resolve_on_closed_type() {
        let registry = registry();
        let definition = registry
            .resolve_by_name("System.Collections.Generic.List`1")
            .unwrap();
        let list_of_int = registry.instantiate(&definition, &[DataType::INT]).unwrap();

        let add = registry
            .resolve_method(&list_of_int, "Add", &[DataType::INT], false)
            .unwrap();
        assert_eq!(add.params, vec![DataType::INT]);
        assert!(registry
            .resolve_method(&list_of_int, "Add", &[DataType::String], false)
            .is_none());

        let indexer = registry.resolve_indexer(&list_of_int).unwrap();
        assert_eq!(indexer.getter.return_type, DataType::INT);

        let this = Value::Object(HostObject::with_type(
            list_of_int.clone(),
            ScriptList::from_values(vec![Value::Int(4)]),
        ));
        let to_array = registry
            .resolve_method(&list_of_int, "ToArray", &[], false)
            .unwrap();
        let result = to_array
            .native
            .call(&CallContext::new(Some(&this), &[], &list_of_int))
            .unwrap();
        assert_eq!(result.runtime_type(), DataType::array(DataType::INT));
    }
}
