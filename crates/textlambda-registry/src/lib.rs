//! The type universe consulted while compiling expressions.
//!
//! - [`TypeUniverse`] - the lookup interface the parser depends on
//! - [`TypeRegistry`] - a static registry implementing it
//! - [`ClassBuilder`] - fluent registration of host types and members
//! - [`NativeFn`] / [`CallContext`] - the host callables behind members

mod class_builder;
mod entries;
mod hierarchy;
mod native;
mod registry;
mod universe;

pub use class_builder::ClassBuilder;
pub use entries::{FunctionEntry, MemberFlags, PropertyEntry, TypeEntry, TypeKind};
pub use hierarchy::Hierarchy;
pub use native::{
    CallContext, ConstructorSignature, MethodSignature, NativeCallable, NativeFn, StaticSignature,
};
pub use registry::TypeRegistry;
pub use universe::{
    ConstructorRef, IndexerRef, MemberRef, MethodRef, TypeUniverse, params_match,
};
