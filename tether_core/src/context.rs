//! Execution contexts.

use std::str::FromStr;

use crate::error::Error;

/// The kind of process run a dependency is resolved for.
///
/// Each [`DependencyKey`](crate::DependencyKey) may provide a different value per context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Context {
    /// A production run. Dependencies should use their real implementation.
    Live,
    /// A run rendering UI previews.
    Preview,
    /// A run under a test harness.
    Test,
}

impl Context {
    /// All contexts, in declaration order.
    pub const ALL: [Self; 3] = [Self::Live, Self::Preview, Self::Test];

    /// Returns the name of the context, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Preview => "preview",
            Self::Test => "test",
        }
    }
}

impl FromStr for Context {
    type Err = Error;

    /// Parses a context name. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|context| context.as_str() == s)
            .ok_or_else(|| Error::unknown_context(s))
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("live".parse::<Context>().unwrap(), Context::Live);
        assert_eq!("preview".parse::<Context>().unwrap(), Context::Preview);
        assert_eq!("test".parse::<Context>().unwrap(), Context::Test);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "Live".parse::<Context>().unwrap_err();
        assert_eq!(err, Error::unknown_context("Live"));
        assert!(" test".parse::<Context>().is_err());
        assert!("".parse::<Context>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for context in Context::ALL {
            assert_eq!(context.to_string().parse::<Context>().unwrap(), context);
        }
    }
}
