//! Shared foundation for the textlambda expression compiler.
//!
//! Holds what every stage agrees on: source spans, type identities, the
//! static [`DataType`] lattice, runtime [`Value`]s, host object handles and
//! the error types of each phase.

mod data_type;
mod error;
mod host;
mod primitive_kind;
mod script_type;
mod span;
mod type_hash;
mod value;

pub use data_type::{ClassType, DataType};
pub use error::{
    CompileError, CompileErrorKind, LexError, NativeError, RegistrationError, RuntimeError,
    ValueMismatch,
};
pub use host::{HostClass, HostObject};
pub use primitive_kind::{NumericRank, PrimitiveKind};
pub use script_type::ScriptType;
pub use span::Span;
pub use type_hash::TypeHash;
pub use value::{ArrayValue, Value};

pub use rust_decimal::Decimal;
