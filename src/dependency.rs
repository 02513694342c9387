//! Property-style access to a single dependency.

use std::marker::PhantomData;
use std::panic::Location;

use crate::key::DependencyKey;
use crate::report::Frame;
use crate::store::Store;

/// [`Dependency`] reads and overrides the value of the key `K` in a store.
///
/// It remembers a name and the place it was created, which are used to attribute
/// diagnostics raised while resolving `K` through it.
///
/// # Example
///
/// ```
/// use tether::{Dependency, DependencyKey, TestCase};
///
/// enum Now {}
///
/// impl DependencyKey for Now {
///     type Value = u64;
///
///     fn test_value() -> u64 {
///         0
///     }
/// }
///
/// let _case = TestCase::begin();
/// # tether::set_context(tether::Context::Test);
/// let now = Dependency::<Now>::new("now");
/// assert_eq!(now.get(), 0);
///
/// now.set(1_700_000_000);
/// assert_eq!(now.get(), 1_700_000_000);
/// ```
pub struct Dependency<'s, K> {
    store: &'s Store,
    frame: Frame,
    _key: PhantomData<fn() -> K>,
}

impl<K> Dependency<'static, K>
where
    K: DependencyKey,
{
    /// Creates an accessor to `K` in the process-wide store.
    #[track_caller]
    pub fn new(name: &'static str) -> Self {
        Self::in_store(Store::global(), name)
    }
}

impl<'s, K> Dependency<'s, K>
where
    K: DependencyKey,
{
    /// Creates an accessor to `K` in `store`.
    #[track_caller]
    pub fn in_store(store: &'s Store, name: &'static str) -> Self {
        Self {
            store,
            frame: Frame::named(name, Location::caller()),
            _key: PhantomData,
        }
    }

    /// Returns the current value of `K`.
    ///
    /// # Panics
    ///
    /// See [`Store::get`].
    #[track_caller]
    pub fn get(&self) -> K::Value {
        self.store.resolve::<K>(Some(self.frame), Location::caller())
    }

    /// Overrides the value of `K`. See [`Store::set`].
    pub fn set(&self, value: K::Value) {
        self.store.set::<K>(value);
    }

    /// Removes the override of `K`. See [`Store::remove_override`].
    pub fn remove_override(&self) -> Option<K::Value> {
        self.store.remove_override::<K>()
    }

    /// Returns the name this accessor was created with.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self.frame.name {
            Some(name) => name,
            None => "",
        }
    }

    /// Returns the frame describing where this accessor was created.
    #[inline]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl<K> Clone for Dependency<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Dependency<'_, K> {}

impl<K> std::fmt::Debug for Dependency<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("key", &std::any::type_name::<K>())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
