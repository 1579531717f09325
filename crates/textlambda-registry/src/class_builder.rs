//! Fluent registration of host types.
//!
//! ```ignore
//! ClassBuilder::host::<Point>(&mut registry)
//!     .constructor(|| Point::default())
//!     .constructor(|x: i32, y: i32| Point::new(x, y))
//!     .property_rw("X", |p: &Point| p.x(), |p: &Point, v: i32| p.set_x(v))
//!     .method("Offset", |p: &Point, d: i32| p.offset(d))
//!     .build()?;
//!
//! ClassBuilder::new(&mut registry, "System.Math")
//!     .static_class()
//!     .constant("PI", std::f64::consts::PI)
//!     .static_method("Sqrt", |x: f64| x.sqrt())
//!     .build()?;
//! ```
//!
//! Typed helpers derive parameter and return types from [`ScriptType`];
//! the `*_raw` forms take explicit `DataType`s, which generic types need to
//! refer to their parameters (`DataType::Param(0)`).

use textlambda_core::{
    DataType, HostClass, NativeError, RegistrationError, ScriptType, TypeHash, Value,
};

use crate::entries::indexer_getter_name;
use crate::native::{ConstructorSignature, MethodSignature, StaticSignature};
use crate::{
    CallContext, FunctionEntry, MemberFlags, NativeFn, PropertyEntry, TypeEntry, TypeKind,
    TypeRegistry,
};

const OBJECT: &str = "System.Object";

pub struct ClassBuilder<'r> {
    registry: &'r mut TypeRegistry,
    entry: TypeEntry,
}

impl<'r> ClassBuilder<'r> {
    /// An instantiable class deriving from `System.Object`.
    pub fn new(registry: &'r mut TypeRegistry, qualified_name: &str) -> Self {
        let mut entry = TypeEntry::new(
            qualified_name,
            DataType::class(qualified_name),
            TypeKind::Class,
        );
        if qualified_name != OBJECT && registry.contains(OBJECT) {
            entry.base = Some(OBJECT.to_string());
        }
        Self { registry, entry }
    }

    /// A class backed by the Rust type `T`; the direct base comes from `T::BASES`.
    pub fn host<T: HostClass>(registry: &'r mut TypeRegistry) -> Self {
        let builder = Self::new(registry, T::TYPE_NAME);
        match T::BASES.first() {
            Some(base) => builder.base(base),
            None => builder,
        }
    }

    /// Members for a built-in type such as `int`, `string` or `object`.
    pub fn builtin(registry: &'r mut TypeRegistry, ty: DataType) -> Self {
        let name = ty.entry_name().to_string();
        let mut builder = Self::new(registry, &name);
        builder.entry.data_type = ty;
        builder.entry.kind = TypeKind::Builtin;
        builder
    }

    pub fn static_class(mut self) -> Self {
        self.entry.kind = TypeKind::Static;
        self
    }

    pub fn base(mut self, qualified_name: &str) -> Self {
        self.entry.base = Some(qualified_name.to_string());
        self
    }

    fn member_id(&self, name: &str, params: &[DataType]) -> TypeHash {
        let hashes: Vec<TypeHash> = params.iter().map(DataType::type_hash).collect();
        TypeHash::of_member(self.entry.hash, name, &hashes)
    }

    fn push_method(
        mut self,
        name: &str,
        params: Vec<DataType>,
        return_type: DataType,
        flags: MemberFlags,
        native: impl Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    ) -> Self {
        let id = self.member_id(name, &params);
        let entry = FunctionEntry {
            id,
            name: name.to_string(),
            params,
            return_type,
            flags,
            native: NativeFn::new(id, native),
        };
        self.entry
            .methods
            .entry(name.to_string())
            .or_default()
            .push(entry);
        self
    }

    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    pub fn constructor<T, M, F>(self, f: F) -> Self
    where
        F: ConstructorSignature<T, M>,
    {
        let params = F::params();
        self.constructor_raw(params, move |ctx| f.invoke(ctx))
    }

    pub fn constructor_raw<F>(mut self, params: Vec<DataType>, f: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        let id = self.member_id(".ctor", &params);
        self.entry.constructors.push(FunctionEntry {
            id,
            name: ".ctor".to_string(),
            params,
            return_type: self.entry.data_type.clone(),
            flags: MemberFlags::empty(),
            native: NativeFn::new(id, f),
        });
        self
    }

    // =========================================================================
    // METHODS
    // =========================================================================

    pub fn method<T, M, F>(self, name: &str, f: F) -> Self
    where
        F: MethodSignature<T, M>,
    {
        let (params, ret) = (F::params(), F::return_type());
        self.push_method(name, params, ret, MemberFlags::empty(), move |ctx| {
            f.invoke(ctx)
        })
    }

    pub fn method_raw<F>(self, name: &str, params: Vec<DataType>, ret: DataType, f: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        self.push_method(name, params, ret, MemberFlags::empty(), f)
    }

    pub fn static_method<M, F>(self, name: &str, f: F) -> Self
    where
        F: StaticSignature<M>,
    {
        let (params, ret) = (F::params(), F::return_type());
        self.push_method(name, params, ret, MemberFlags::STATIC, move |ctx| {
            f.invoke(ctx)
        })
    }

    pub fn static_method_raw<F>(
        self,
        name: &str,
        params: Vec<DataType>,
        ret: DataType,
        f: F,
    ) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        self.push_method(name, params, ret, MemberFlags::STATIC, f)
    }

    // =========================================================================
    // PROPERTIES AND FIELDS
    // =========================================================================

    pub fn property<T, M, G>(self, name: &str, getter: G) -> Self
    where
        G: MethodSignature<T, M>,
    {
        let ty = G::return_type();
        self.property_raw(name, ty, MemberFlags::empty(), move |ctx| getter.invoke(ctx), None)
    }

    /// A property with a setter, assignable in member initializers.
    pub fn property_rw<T, MG, MS, G, S>(self, name: &str, getter: G, setter: S) -> Self
    where
        G: MethodSignature<T, MG>,
        S: MethodSignature<T, MS>,
    {
        let ty = G::return_type();
        let setter = NativeFn::new(self.member_id(&format!("set_{name}"), &[]), move |ctx: &CallContext<'_>| {
            setter.invoke(ctx)
        });
        self.property_raw(
            name,
            ty,
            MemberFlags::WRITABLE,
            move |ctx| getter.invoke(ctx),
            Some(setter),
        )
    }

    pub fn property_raw<F>(
        mut self,
        name: &str,
        ty: DataType,
        flags: MemberFlags,
        getter: F,
        setter: Option<NativeFn>,
    ) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        let id = self.member_id(&format!("get_{name}"), &[]);
        let flags = if setter.is_some() {
            flags | MemberFlags::WRITABLE
        } else {
            flags
        };
        self.entry.properties.insert(
            name.to_string(),
            PropertyEntry {
                name: name.to_string(),
                ty,
                flags,
                getter: NativeFn::new(id, getter),
                setter,
            },
        );
        self
    }

    pub fn static_property<M, G>(self, name: &str, getter: G) -> Self
    where
        G: StaticSignature<M>,
    {
        let ty = G::return_type();
        self.property_raw(name, ty, MemberFlags::STATIC, move |ctx| getter.invoke(ctx), None)
    }

    /// A static read-only field holding a fixed value.
    pub fn constant<V>(self, name: &str, value: V) -> Self
    where
        V: ScriptType + Clone + Send + Sync + 'static,
    {
        let ty = V::data_type();
        self.property_raw(
            name,
            ty,
            MemberFlags::STATIC | MemberFlags::FIELD,
            move |_| Ok(value.clone().into_value()),
            None,
        )
    }

    // =========================================================================
    // INDEXERS
    // =========================================================================

    /// Designate `property` as the default member, read through `getter`.
    pub fn indexer<T, M, F>(self, property: &str, getter: F) -> Self
    where
        F: MethodSignature<T, M>,
    {
        let (params, ret) = (F::params(), F::return_type());
        self.indexer_raw(property, params, ret, move |ctx| getter.invoke(ctx))
    }

    pub fn indexer_raw<F>(mut self, property: &str, params: Vec<DataType>, ret: DataType, f: F) -> Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        self.entry.default_member = Some(property.to_string());
        self.push_method(&indexer_getter_name(property), params, ret, MemberFlags::empty(), f)
    }

    pub fn build(self) -> Result<(), RegistrationError> {
        self.registry.register(self.entry)
    }
}
