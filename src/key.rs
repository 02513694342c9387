//! Declaring dependency keys.

#[doc(inline)]
pub use tether_core::key::DependencyKey;

/// Declares an uninhabited key type and implements [`DependencyKey`] for it.
///
/// `test` is required; `live` and `preview` are optional and, when present, must follow in
/// that order. Each factory is an expression evaluated every time the factory runs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use tether::{Context, Store};
///
/// tether::dependency_key! {
///     /// The base URL of the API.
///     pub BaseUrl: Arc<str> {
///         test: Arc::from("http://localhost"),
///         live: Arc::from("https://api.example.com"),
///     }
/// }
///
/// let store = Store::builder().with_context(Context::Live).build();
/// assert_eq!(&*store.get::<BaseUrl>(), "https://api.example.com");
///
/// let store = Store::builder().with_context(Context::Preview).build();
/// assert_eq!(&*store.get::<BaseUrl>(), "http://localhost");
/// ```
#[macro_export]
macro_rules! dependency_key {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident: $value:ty {
            test: $test:expr
            $(, live: $live:expr)?
            $(, preview: $preview:expr)?
            $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {}

        impl $crate::DependencyKey for $name {
            type Value = $value;

            fn test_value() -> Self::Value {
                $test
            }

            $(
                fn live_value() -> ::core::option::Option<Self::Value> {
                    ::core::option::Option::Some($live)
                }
            )?

            $(
                fn preview_value() -> ::core::option::Option<Self::Value> {
                    ::core::option::Option::Some($preview)
                }
            )?
        }
    };
}

#[cfg(test)]
mod tests {
    use tether_core::Context;

    use crate::store::Store;

    use super::*;

    crate::dependency_key! {
        Timeout: u64 { test: 0 }
    }

    crate::dependency_key! {
        Theme: &'static str {
            test: "plain",
            live: "dark",
            preview: "light",
        }
    }

    crate::dependency_key! {
        pub(crate) Retries: u8 {
            test: 1,
            preview: 3
        }
    }

    #[test]
    fn test_declared_factories() {
        assert_eq!(Timeout::test_value(), 0);
        assert_eq!(Timeout::live_value(), None);
        assert_eq!(Timeout::preview_value(), None);

        assert_eq!(Theme::live_value(), Some("dark"));
        assert_eq!(Theme::preview_value(), Some("light"));

        assert_eq!(Retries::live_value(), None);
        assert_eq!(Retries::preview_value(), Some(3));
    }

    #[test]
    fn test_declared_key_resolves() {
        let store = Store::builder().with_context(Context::Preview).build();
        assert_eq!(store.get::<Theme>(), "light");
        assert_eq!(store.get::<Retries>(), 3);
        assert_eq!(store.get::<Timeout>(), 0);
    }
}
