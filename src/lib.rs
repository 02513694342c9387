//! Context-aware dependency resolution.
//!
//! Every dependency is identified by a key type implementing [`DependencyKey`], which
//! declares the value to use in a live, preview or test [`Context`]. A [`Store`] resolves
//! keys on demand, caches the results per context, and lets tests override any value
//! globally.
//!
//! ```
//! use tether::{Context, TestCase};
//!
//! tether::dependency_key! {
//!     Greeting: &'static str {
//!         test: "hello, test",
//!         live: "hello, world",
//!     }
//! }
//!
//! let _case = TestCase::begin();
//! tether::set_context(Context::Live);
//! assert_eq!(tether::get::<Greeting>(), "hello, world");
//!
//! tether::override_for_testing::<Greeting>("hello, override");
//! assert_eq!(tether::get::<Greeting>(), "hello, override");
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
pub(crate) mod macros;

pub mod dependency;
pub mod detect;
pub mod key;
pub mod report;
pub mod store;
pub mod testing;

pub use tether_core::{Context, Erased, Error, Result};

pub use dependency::Dependency;
pub use key::DependencyKey;
pub use store::{Store, StoreBuilder};
pub use testing::TestCase;

/// Returns the process-wide store.
#[inline]
pub fn store() -> &'static Store {
    Store::global()
}

/// Returns the value of the dependency `K` from the process-wide store.
#[track_caller]
pub fn get<K>() -> K::Value
where
    K: DependencyKey,
{
    Store::global().get::<K>()
}

/// Overrides the value of the dependency `K` in the process-wide store.
///
/// The override is not scoped: it stays until the store is reset, which [`TestCase`] does
/// at the start and end of every test case.
pub fn override_for_testing<K>(value: K::Value)
where
    K: DependencyKey,
{
    Store::global().set::<K>(value);
}

/// Replaces the context of the process-wide store.
pub fn set_context(context: Context) {
    Store::global().set_context(context);
}
