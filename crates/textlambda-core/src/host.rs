//! Opaque host objects carried through expression values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{ClassType, DataType};

/// A Rust type exposed to expressions as a registered class.
///
/// `BASES` lists every ancestor's qualified name (nearest first, `System.Object`
/// implied) so that `is`/`as`/cast checks work on a value without consulting
/// the registry.
pub trait HostClass: Any + Send + Sync {
    const TYPE_NAME: &'static str;
    const BASES: &'static [&'static str] = &[];
}

/// Shared handle to a host value plus the type it was created as.
#[derive(Clone)]
pub struct HostObject {
    data_type: DataType,
    bases: &'static [&'static str],
    inner: Arc<dyn Any + Send + Sync>,
}

impl HostObject {
    pub fn new<T: HostClass>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: HostClass>(value: Arc<T>) -> Self {
        Self {
            data_type: DataType::class(T::TYPE_NAME),
            bases: T::BASES,
            inner: value,
        }
    }

    /// Wrap a value whose static type is richer than `T::TYPE_NAME`, such as
    /// a generic instantiation (`List`1[System.Int32]`).
    pub fn with_type<T: HostClass>(data_type: DataType, value: T) -> Self {
        Self {
            data_type,
            bases: T::BASES,
            inner: Arc::new(value),
        }
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: HostClass>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Reference identity, the meaning of `==` between objects.
    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared allocation; stable for the object's lifetime.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    /// Whether this object is `target` or derives from it.
    pub fn is_instance_of(&self, target: &ClassType) -> bool {
        if let DataType::Class(own) = &self.data_type {
            if own.hash == target.hash && (target.args.is_empty() || own.args == target.args) {
                return true;
            }
        }
        self.bases.iter().any(|base| *base == &*target.name)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject({})", self.data_type.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shape;
    impl HostClass for Shape {
        const TYPE_NAME: &'static str = "Demo.Shape";
    }

    struct Circle(f64);
    impl HostClass for Circle {
        const TYPE_NAME: &'static str = "Demo.Circle";
        const BASES: &'static [&'static str] = &["Demo.Shape"];
    }

    #[test]
    fn instance_checks_follow_declared_bases() {
        let circle = HostObject::new(Circle(2.0));
        assert!(circle.is_instance_of(&ClassType::new("Demo.Circle")));
        assert!(circle.is_instance_of(&ClassType::new("Demo.Shape")));
        assert!(!HostObject::new(Shape).is_instance_of(&ClassType::new("Demo.Circle")));
    }

    #[test]
    fn downcast_and_identity() {
        let circle = HostObject::new(Circle(2.0));
        assert_eq!(circle.downcast_ref::<Circle>().map(|c| c.0), Some(2.0));
        assert!(circle.downcast_ref::<Shape>().is_none());
        let copy = circle.clone();
        assert!(copy.ptr_eq(&circle));
        assert!(!HostObject::new(Circle(2.0)).ptr_eq(&circle));
    }
}
