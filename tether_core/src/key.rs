//! The contract implemented by dependency keys.

/// [`DependencyKey`] declares how to build the value of one dependency.
///
/// A key is a type used purely as an identity tag; it is never instantiated, so an
/// uninhabited `enum Clock {}` is the usual choice. Each key is associated with exactly one
/// [`Value`](Self::Value) type and up to three factories, one per
/// [`Context`](crate::Context):
///
/// - [`test_value`](Self::test_value) is mandatory.
/// - [`live_value`](Self::live_value) should be provided for anything used in production.
///   A store asked for a live value of a key without one reports a diagnostic and falls back
///   to the test value.
/// - [`preview_value`](Self::preview_value) silently falls back to the test value.
///
/// Factories may run at any time (on first access) and their results are cached per context,
/// so they should be cheap and free of side effects. A factory may request other
/// dependencies from the store.
///
/// # Example
///
/// ```
/// use tether_core::DependencyKey;
///
/// enum Greeting {}
///
/// impl DependencyKey for Greeting {
///     type Value = &'static str;
///
///     fn test_value() -> Self::Value {
///         "hello, test"
///     }
///
///     fn live_value() -> Option<Self::Value> {
///         Some("hello, world")
///     }
/// }
///
/// assert_eq!(Greeting::test_value(), "hello, test");
/// assert_eq!(Greeting::preview_value(), None);
/// ```
pub trait DependencyKey: 'static {
    /// The type of the dependency value.
    ///
    /// The store hands out clones of a cached value, so values meant to be shared (clients,
    /// services) are usually wrapped in an [`Arc`](std::sync::Arc). The store does not
    /// synchronize access to the value itself.
    type Value: Clone + Send + Sync + 'static;

    /// Builds the value used under a test harness, and the fallback for other contexts.
    fn test_value() -> Self::Value;

    /// Builds the value used in production, if the key has one.
    fn live_value() -> Option<Self::Value> {
        None
    }

    /// Builds the value used when rendering previews, if the key has one.
    fn preview_value() -> Option<Self::Value> {
        None
    }
}
