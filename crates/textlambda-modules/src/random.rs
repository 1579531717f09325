//! `System.Random`, a host-supplied randomness source.
//!
//! Expressions can only obtain randomness through an instance: either one
//! they construct with `new Random(seed)` or one passed in as an argument.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use textlambda_core::{DataType, HostClass, NativeError, RegistrationError, Value};
use textlambda_registry::{CallContext, ClassBuilder, TypeRegistry};

pub struct Random {
    rng: Mutex<StdRng>,
}

impl HostClass for Random {
    const TYPE_NAME: &'static str = "System.Random";
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// A reproducible sequence. Negative seeds are folded onto their magnitude.
    pub fn seeded(seed: i32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(u64::from(seed.unsigned_abs()))),
        }
    }

    fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// A non-negative integer below `i32::MAX`.
    pub fn next(&self) -> i32 {
        self.with_rng(|rng| rng.gen_range(0..i32::MAX))
    }

    /// An integer in `[min, max)`; `min` when the range is empty.
    pub fn next_in(&self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.with_rng(|rng| rng.gen_range(min..max))
    }

    /// A double in `[0, 1)`.
    pub fn next_double(&self) -> f64 {
        self.with_rng(|rng| rng.r#gen::<f64>())
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

fn next_bounded(ctx: &CallContext<'_>, min: i32, max: i32) -> Result<Value, NativeError> {
    if max < min {
        return Err(NativeError::other(format!(
            "minValue {min} is greater than maxValue {max}"
        )));
    }
    Ok(Value::Int(ctx.this::<Random>()?.next_in(min, max)))
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    ClassBuilder::host::<Random>(registry)
        .constructor(Random::new)
        .constructor(Random::seeded)
        .method("Next", |r: &Random| r.next())
        .method_raw("Next", vec![DataType::INT], DataType::INT, |ctx| {
            let max: i32 = ctx.arg(0)?;
            next_bounded(ctx, 0, max)
        })
        .method_raw("Next", vec![DataType::INT, DataType::INT], DataType::INT, |ctx| {
            let (min, max): (i32, i32) = (ctx.arg(0)?, ctx.arg(1)?);
            next_bounded(ctx, min, max)
        })
        .method("NextDouble", |r: &Random| r.next_double())
        .build()
}
