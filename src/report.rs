//! Diagnostic reports.
//!
//! Expected failures, such as a missing live implementation or an unrecognized context
//! override, never reach the caller of [`Store::get`](crate::Store::get). They are recovered
//! with a fallback and reported through a [`Reporter`] instead.

use std::any::type_name;
use std::panic::Location;
use std::sync::Arc;

use parking_lot::{Mutex, const_mutex};

use crate::key::DependencyKey;

/// A channel accepting non-fatal diagnostics.
pub trait Reporter: Send + Sync + 'static {
    /// Reports `message`, attributed to `file` and `line`.
    fn report(&self, message: &str, file: &str, line: u32);
}

impl<R> Reporter for Arc<R>
where
    R: Reporter,
{
    #[inline]
    fn report(&self, message: &str, file: &str, line: u32) {
        (**self).report(message, file, line);
    }
}

impl std::fmt::Debug for dyn Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Reporter")
    }
}

/// The default [`Reporter`].
///
/// In debug builds, every report is emitted as a `WARN` event through `tracing`, which is
/// enabled by the default `tracing` feature. In release builds, reports are discarded.
///
/// Building without the `tracing` feature turns this reporter into a no-op; install another
/// [`Reporter`] with [`StoreBuilder::with_reporter`](crate::StoreBuilder::with_reporter) to
/// keep diagnostics visible in that case.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugReporter;

impl Reporter for DebugReporter {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn report(&self, message: &str, file: &str, line: u32) {
        if cfg!(debug_assertions) {
            warn!(file = file, line = line, "{message}");
        }
    }
}

/// A single report captured by [`Recorder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// The reported message.
    pub message: String,
    /// The file the report is attributed to.
    pub file: String,
    /// The line the report is attributed to.
    pub line: u32,
}

/// A [`Reporter`] that keeps every report in memory.
///
/// Wrap it in an [`Arc`] to keep a handle after passing it to a store.
#[derive(Debug, Default)]
pub struct Recorder {
    reports: Mutex<Vec<Report>>,
}

impl Recorder {
    /// Creates an empty recorder.
    pub const fn new() -> Self {
        Self {
            reports: const_mutex(Vec::new()),
        }
    }

    /// Returns a copy of the reports received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    /// Returns the number of reports received so far.
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Returns `true` if nothing was reported so far.
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

}

impl Reporter for Recorder {
    fn report(&self, message: &str, file: &str, line: u32) {
        self.reports.lock().push(Report {
            message: message.to_owned(),
            file: file.to_owned(),
            line,
        });
    }
}

/// Describes the dependency currently being resolved, for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The name the dependency was declared with, if known.
    pub name: Option<&'static str>,
    /// The file the dependency is accessed from.
    pub file: &'static str,
    /// The line the dependency is accessed from.
    pub line: u32,
}

impl Frame {
    /// Creates a named frame located at `location`.
    pub fn named(name: &'static str, location: &'static Location<'static>) -> Self {
        Self {
            name: Some(name),
            file: location.file(),
            line: location.line(),
        }
    }

    /// Creates an anonymous frame located at `location`.
    pub fn at(location: &'static Location<'static>) -> Self {
        Self {
            name: None,
            file: location.file(),
            line: location.line(),
        }
    }
}

pub(crate) fn missing_live_value<K>(frame: &Frame) -> String
where
    K: DependencyKey,
{
    let subject = frame
        .name
        .map_or_else(|| "A dependency".to_owned(), |name| format!("`{name}`"));

    format!(
        "{subject} has no live implementation, but was accessed from a live context.\n\
         \n  Key: {key}\n  Value: {value}\n\n\
         Every dependency used in a live context should implement `live_value`. \
         The test value is used instead.",
        key = type_name::<K>(),
        value = type_name::<K::Value>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Missing {}

    impl DependencyKey for Missing {
        type Value = i32;

        fn test_value() -> Self::Value {
            42
        }
    }

    #[test]
    fn test_recorder() {
        let recorder = Arc::new(Recorder::new());
        let reporter: Box<dyn Reporter> = Box::new(Arc::clone(&recorder));

        reporter.report("something happened", "src/app.rs", 12);
        assert_eq!(
            recorder.reports(),
            vec![Report {
                message: "something happened".to_owned(),
                file: "src/app.rs".to_owned(),
                line: 12,
            }]
        );
        assert_eq!(recorder.len(), 1);
    }

    #[cfg(all(feature = "tracing", debug_assertions))]
    #[test]
    fn test_debug_reporter_emits_warning() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Level, Metadata, Subscriber};

        struct CountWarnings(Arc<AtomicUsize>);

        impl Subscriber for CountWarnings {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }

            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }

            fn record(&self, _: &Id, _: &Record<'_>) {}

            fn record_follows_from(&self, _: &Id, _: &Id) {}

            fn event(&self, event: &Event<'_>) {
                if *event.metadata().level() == Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }

            fn enter(&self, _: &Id) {}

            fn exit(&self, _: &Id) {}
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(CountWarnings(Arc::clone(&warnings)), || {
            DebugReporter.report("no live implementation", "src/app.rs", 3);
        });
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frame_at_caller() {
        let location = Location::caller();
        let frame = Frame::named("clock", location);
        assert_eq!(frame.name, Some("clock"));
        assert_eq!(frame.file, file!());
        assert_eq!(frame.line, location.line());
    }

    #[test]
    fn test_missing_live_value_message() {
        let frame = Frame::named("answer", Location::caller());
        let message = missing_live_value::<Missing>(&frame);
        assert!(message.starts_with("`answer` has no live implementation"));
        assert!(message.contains(type_name::<Missing>()));
        assert!(message.contains("Value: i32"));

        let message = missing_live_value::<Missing>(&Frame::at(Location::caller()));
        assert!(message.starts_with("A dependency has no live implementation"));
    }
}
