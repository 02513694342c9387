//! Detection of the execution [`Context`].
//!
//! The context is chosen as follows, first match wins:
//!
//! 1. The context override variable ([`CONTEXT_VAR`] by default) names a context.
//! 2. The host reports a preview renderer: [`Context::Preview`].
//! 3. The host reports a test harness: [`Context::Test`].
//! 4. Otherwise: [`Context::Live`].
//!
//! An override variable set to anything else is reported and ignored.

use std::env;
use std::ffi::OsStr;
use std::panic::Location;
use std::path::Path;

use tether_core::Context;

use crate::report::Reporter;

/// The environment variable read to override the detected context.
pub const CONTEXT_VAR: &str = "TETHER_CONTEXT";

/// The environment variable a preview renderer sets for processes it spawns.
pub const PREVIEW_VAR: &str = "TETHER_PREVIEW";

/// Signals supplied by the host about how the process is being run.
pub trait HostSignals: Send + Sync + 'static {
    /// Returns `true` if the process is rendering UI previews.
    fn preview_active(&self) -> bool;

    /// Returns `true` if the process is running under a test harness.
    fn test_harness_active(&self) -> bool;
}

/// [`HostSignals`] read from the running process.
///
/// - A preview renderer is active if [`PREVIEW_VAR`] is set to a non-empty value other
///   than `0`.
/// - A test harness is active if `cargo nextest` is running the process, or if the
///   executable lives in a `deps` directory, where `cargo test` places test binaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessSignals;

impl HostSignals for ProcessSignals {
    fn preview_active(&self) -> bool {
        env::var_os(PREVIEW_VAR).is_some_and(|value| !value.is_empty() && value != "0")
    }

    fn test_harness_active(&self) -> bool {
        if env::var_os("NEXTEST_RUN_ID").is_some() {
            return true;
        }

        env::current_exe().is_ok_and(|exe| {
            exe.parent()
                .and_then(Path::file_name)
                .is_some_and(|dir| dir == OsStr::new("deps"))
        })
    }
}

/// Constant [`HostSignals`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedSignals {
    pub preview: bool,
    pub test_harness: bool,
}

impl HostSignals for FixedSignals {
    fn preview_active(&self) -> bool {
        self.preview
    }

    fn test_harness_active(&self) -> bool {
        self.test_harness
    }
}

/// Determines the [`Context`] of the running process.
pub struct ContextDetector {
    var: &'static str,
    signals: Box<dyn HostSignals>,
}

impl Default for ContextDetector {
    fn default() -> Self {
        Self::new(CONTEXT_VAR, ProcessSignals)
    }
}

impl ContextDetector {
    /// Creates a detector reading the override from `var` and falling back to `signals`.
    pub fn new<S>(var: &'static str, signals: S) -> Self
    where
        S: HostSignals,
    {
        Self {
            var,
            signals: Box::new(signals),
        }
    }

    pub(crate) fn set_var(&mut self, var: &'static str) {
        self.var = var;
    }

    pub(crate) fn set_signals<S>(&mut self, signals: S)
    where
        S: HostSignals,
    {
        self.signals = Box::new(signals);
    }

    /// Returns the name of the override variable.
    #[inline]
    pub const fn var(&self) -> &'static str {
        self.var
    }

    /// Detects the context from the process environment and the host signals.
    pub fn detect(
        &self,
        reporter: &dyn Reporter,
        location: &'static Location<'static>,
    ) -> Context {
        let raw = env::var_os(self.var);
        self.detect_with(
            raw.as_deref().map(OsStr::to_string_lossy).as_deref(),
            reporter,
            location,
        )
    }

    /// Detects the context from `raw`, the value of the override variable, and the host
    /// signals. An empty value counts as unset.
    ///
    /// An unrecognized value is reported to `reporter`, attributed to `location`.
    pub fn detect_with(
        &self,
        raw: Option<&str>,
        reporter: &dyn Reporter,
        location: &'static Location<'static>,
    ) -> Context {
        if let Some(raw) = raw.filter(|raw| !raw.is_empty()) {
            match raw.parse::<Context>() {
                Ok(context) => {
                    debug!(context = %context, var = self.var, "context overridden");
                    return context;
                }
                Err(err) => reporter.report(
                    &format!(
                        "{err}: ignoring `{var}` and inferring the context instead.",
                        var = self.var,
                    ),
                    location.file(),
                    location.line(),
                ),
            }
        }

        self.infer()
    }

    fn infer(&self) -> Context {
        if self.signals.preview_active() {
            Context::Preview
        } else if self.signals.test_harness_active() {
            Context::Test
        } else {
            Context::Live
        }
    }
}

impl std::fmt::Debug for ContextDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextDetector")
            .field("var", &self.var)
            .finish_non_exhaustive()
    }
}
