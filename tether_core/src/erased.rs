//! Cloneable values with erased type informations.

use std::any::{Any, type_name};

use crate::error::{Error, Result};

/// [`CloneAny`] clones a trait object into a [`Box`].
///
/// As [`Clone`] requires its implementor to be [`Sized`], it is not
/// dyn-compatible. This trait works around that at the cost of heap allocation.
trait CloneAny: Any + Send + Sync {
    fn clone_boxed(&self) -> Box<dyn CloneAny>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> CloneAny for T
where
    T: Any + Clone + Send + Sync,
{
    fn clone_boxed(&self) -> Box<dyn CloneAny> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// [`Erased`] holds a value of an arbitrary type, as long as it implements
/// [`Clone`], [`Send`], and [`Sync`] and is `'static`.
///
/// The concrete type is remembered so that reading the value back as a different type
/// reports both types instead of silently failing.
pub struct Erased {
    value: Box<dyn CloneAny>,
    type_name: &'static str,
}

impl Erased {
    /// Creates a new `Erased` with the provided `value` of type `T`.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns a reference to the stored value as type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the stored value is not of type `T`.
    pub fn downcast_ref<T>(&self) -> Result<&T>
    where
        T: 'static,
    {
        self.value
            .as_any()
            .downcast_ref::<T>()
            .ok_or(Error::TypeMismatch {
                expected: type_name::<T>(),
                found: self.type_name,
            })
    }
}

impl Clone for Erased {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone_boxed(),
            type_name: self.type_name,
        }
    }
}

impl std::fmt::Debug for Erased {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erased")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[allow(dead_code)]
    fn test_implements_send_and_sync() -> impl Send + Sync {
        Erased::new("Hello".to_string())
    }

    #[test]
    fn test_downcast_ref() {
        let erased = Erased::new("Hello".to_string());
        assert_eq!(erased.downcast_ref::<String>().unwrap(), "Hello");
    }

    #[test]
    fn test_downcast_ref_mismatch() {
        let erased = Erased::new("Hello".to_string());
        let err = erased.downcast_ref::<i32>().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "i32",
                found: type_name::<String>(),
            }
        );
    }

    #[test]
    fn test_clone_shares_arc() {
        let a = Arc::new(100);
        let erased = Erased::new(Arc::clone(&a));
        assert_eq!(Arc::strong_count(&a), 2);

        let cloned = erased.clone();
        assert_eq!(Arc::strong_count(&a), 3);
        assert!(Arc::ptr_eq(
            erased.downcast_ref::<Arc<i32>>().unwrap(),
            cloned.downcast_ref::<Arc<i32>>().unwrap(),
        ));

        drop(cloned);
        drop(erased);
        assert_eq!(Arc::strong_count(&a), 1);
    }
}
