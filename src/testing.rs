//! Isolation of test cases sharing the process-wide store.

use parking_lot::{Mutex, MutexGuard, const_mutex};
use tether_core::Context;

use crate::store::Store;

static SERIAL: Mutex<()> = const_mutex(());

/// Marks the duration of a test case using the process-wide store.
///
/// [`begin`](Self::begin) clears every override and cached value of
/// [`Store::global`] before the test case runs, and dropping the guard clears them again and
/// restores the context that was current when the case began. Overrides made in one test case
/// therefore never leak into the next.
///
/// Test harnesses run test cases concurrently, while overrides are global. Only one
/// `TestCase` can be alive at a time; [`begin`](Self::begin) blocks until the previous one
/// is dropped.
#[must_use = "the test case ends as soon as the guard is dropped"]
pub struct TestCase {
    context: Context,
    _serial: MutexGuard<'static, ()>,
}

impl TestCase {
    /// Waits for other test cases to end, then resets the process-wide store.
    #[track_caller]
    pub fn begin() -> Self {
        let serial = SERIAL.lock();
        let store = Store::global();
        store.reset_for_test_boundary();

        Self {
            context: store.context(),
            _serial: serial,
        }
    }
}

impl Drop for TestCase {
    fn drop(&mut self) {
        let store = Store::global();
        store.reset_for_test_boundary();
        store.set_context(self.context);
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::key::DependencyKey;
    use crate::{override_for_testing, set_context, store};

    use super::*;

    enum Flag {}

    impl DependencyKey for Flag {
        type Value = bool;

        fn test_value() -> bool {
            false
        }

        fn live_value() -> Option<bool> {
            Some(true)
        }
    }

    #[test]
    fn test_overrides_do_not_leak() {
        {
            let _case = TestCase::begin();
            set_context(Context::Test);
            override_for_testing::<Flag>(true);
            assert!(store().get::<Flag>());
        }

        let _case = TestCase::begin();
        assert!(!store().is_overridden::<Flag>());
        set_context(Context::Test);
        assert!(!store().get::<Flag>());
    }

    #[test]
    fn test_context_is_restored() {
        let before = {
            let _case = TestCase::begin();
            let before = store().context();
            let other = if before == Context::Live {
                Context::Test
            } else {
                Context::Live
            };
            set_context(other);
            assert_eq!(store().context(), other);
            before
        };

        let _case = TestCase::begin();
        assert_eq!(store().context(), before);
    }

    #[test]
    fn test_cache_is_cleared_between_cases() {
        {
            let _case = TestCase::begin();
            set_context(Context::Live);
            assert!(store().get::<Flag>());
        }

        let _case = TestCase::begin();
        set_context(Context::Live);
        override_for_testing::<Flag>(false);
        assert!(!store().get::<Flag>());
        store().remove_override::<Flag>();
        assert!(store().get::<Flag>());
    }
}
