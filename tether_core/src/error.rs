//! Error types.

use std::error::Error as StdError;

/// [`Error`] is an error that can be raised by functions and methods from this library.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A string did not name any [`Context`](crate::Context).
    UnknownContext(String),
    /// An erased value was read as a type other than the one it was created with.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    pub fn unknown_context<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::UnknownContext(value.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownContext(value) => {
                write!(
                    f,
                    "`{value}` is not a context, expected one of `live`, `preview` or `test`"
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected a value of type `{expected}`, found `{found}`")
            }
        }
    }
}

impl StdError for Error {}

/// [`Result`] is an alias to [`core::result::Result`] with [`Error`] as the
/// default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_context() {
        let err = Error::unknown_context("staging");
        assert_eq!(
            err.to_string(),
            "`staging` is not a context, expected one of `live`, `preview` or `test`"
        );
    }

    #[test]
    fn test_display_type_mismatch() {
        let err = Error::TypeMismatch {
            expected: "i32",
            found: "alloc::string::String",
        };
        assert_eq!(
            err.to_string(),
            "expected a value of type `i32`, found `alloc::string::String`"
        );
    }
}
