//! Standard `System` library for textlambda expressions.
//!
//! - **object** - `System.Object`, `System.Type`, `System.Array`, `System.Nullable<T>`
//! - **primitives** - members of `int`, `double`, `bool`, `char`, ...
//! - **string** - `System.String`
//! - **math** - `System.Math` and `System.Convert`
//! - **random** - `System.Random`, the host-supplied randomness source
//! - **collections** - `List<T>` and `Dictionary<K,V>`
//!
//! ```ignore
//! let mut registry = TypeRegistry::new();
//! textlambda_modules::install_all(&mut registry)?;
//! ```

use textlambda_core::RegistrationError;
use textlambda_registry::TypeRegistry;

pub mod collections;
pub mod math;
pub mod object;
pub mod primitives;
pub mod random;
pub mod string;

pub use collections::{ScriptDictionary, ScriptKey, ScriptList};
pub use random::Random;

/// Install every standard module. `System.Object` goes first so that the
/// other types pick it up as their base.
pub fn install_all(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    object::install(registry)?;
    primitives::install(registry)?;
    string::install(registry)?;
    math::install(registry)?;
    random::install(registry)?;
    collections::install(registry)?;
    Ok(())
}

/// A registry holding just the standard library.
pub fn standard_registry() -> Result<TypeRegistry, RegistrationError> {
    let mut registry = TypeRegistry::new();
    install_all(&mut registry)?;
    Ok(registry)
}
