//! The dependency store.

use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem::take;
use std::panic::Location;
use std::sync::LazyLock;

use parking_lot::ReentrantMutex;
use tether_core::{Context, Erased};

use crate::detect::{ContextDetector, HostSignals};
use crate::key::DependencyKey;
use crate::report::{self, DebugReporter, Frame, Reporter};

static GLOBAL: LazyLock<Store> = LazyLock::new(Store::new);

#[derive(Debug, Default)]
struct State {
    /// Values set with [`Store::set`]. These take precedence over everything else.
    overrides: HashMap<TypeId, Erased>,
    /// Values built by a key's factory, per context.
    cache: HashMap<(TypeId, Context), Erased>,
    context: Option<Context>,
    frame: Option<Frame>,
    /// Keys whose factory is currently running on the thread holding the lock.
    resolving: Vec<(TypeId, &'static str)>,
}

/// [`Store`] resolves and caches dependency values by their [`DependencyKey`].
///
/// A value is resolved in the following order:
///
/// 1. A value set with [`set`](Self::set), if any.
/// 2. The value cached for the key under the current [`Context`], if any.
/// 3. The key's factory for the current context, whose result is then cached. A key without
///    a live value falls back to its test value and reports a diagnostic; a key without a
///    preview value silently falls back to its test value.
///
/// Most programs use the process-wide store returned by [`Store::global`]. Isolated stores
/// can be created with [`Store::new`] or [`Store::builder`].
///
/// All state is guarded by a single reentrant lock, so a factory may request other
/// dependencies from the same store. The values themselves are handed out as clones and are
/// not synchronized by the store.
///
/// # Example
///
/// ```
/// use tether::{Context, DependencyKey, Store};
///
/// enum Greeting {}
///
/// impl DependencyKey for Greeting {
///     type Value = String;
///
///     fn test_value() -> String {
///         "hello, test".to_owned()
///     }
///
///     fn live_value() -> Option<String> {
///         Some("hello, world".to_owned())
///     }
/// }
///
/// let store = Store::builder().with_context(Context::Live).build();
/// assert_eq!(store.get::<Greeting>(), "hello, world");
///
/// store.set::<Greeting>("hello, override".to_owned());
/// assert_eq!(store.get::<Greeting>(), "hello, override");
/// ```
pub struct Store {
    state: ReentrantMutex<RefCell<State>>,
    detector: ContextDetector,
    reporter: Box<dyn Reporter>,
}

/// A builder for [`Store`].
#[derive(Debug)]
pub struct StoreBuilder {
    context: Option<Context>,
    detector: ContextDetector,
    reporter: Box<dyn Reporter>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates a new, empty store that detects its context from the process.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a new builder for `Store`.
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder {
            context: None,
            detector: ContextDetector::default(),
            reporter: Box::new(DebugReporter),
        }
    }

    /// Returns the process-wide store.
    #[inline]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the value of the dependency `K`.
    ///
    /// The call site is used to attribute diagnostics when no [`Frame`] is active.
    ///
    /// # Panics
    ///
    /// Panics if the factory of `K` requests `K` again, directly or through other
    /// dependencies.
    #[track_caller]
    pub fn get<K>(&self) -> K::Value
    where
        K: DependencyKey,
    {
        self.resolve::<K>(None, Location::caller())
    }

    pub(crate) fn resolve<K>(
        &self,
        frame: Option<Frame>,
        location: &'static Location<'static>,
    ) -> K::Value
    where
        K: DependencyKey,
    {
        let key = TypeId::of::<K>();
        let guard = self.state.lock();
        let state: &RefCell<State> = &guard;

        if let Some(value) = state.borrow().overrides.get(&key) {
            trace!("key" = type_name::<K>(), "overridden");
            return read::<K>(value);
        }

        let context = self.current_context(state, location);
        if let Some(value) = state.borrow().cache.get(&(key, context)) {
            return read::<K>(value);
        }

        let value = {
            let frame = frame.unwrap_or_else(|| Frame::at(location));
            let _frame = FrameScope::enter(state, frame);
            let _resolving = Resolving::enter::<K>(state);
            self.construct::<K>(state, context, location)
        };
        debug!("key" = type_name::<K>(), context = %context, "resolved");

        let mut state = state.borrow_mut();
        let cached = state
            .cache
            .entry((key, context))
            .or_insert_with(|| Erased::new(value));
        read::<K>(cached)
    }

    fn construct<K>(
        &self,
        state: &RefCell<State>,
        context: Context,
        location: &'static Location<'static>,
    ) -> K::Value
    where
        K: DependencyKey,
    {
        match context {
            Context::Live => K::live_value().unwrap_or_else(|| {
                let frame = state.borrow().frame.unwrap_or_else(|| Frame::at(location));
                self.reporter.report(
                    &report::missing_live_value::<K>(&frame),
                    frame.file,
                    frame.line,
                );
                K::test_value()
            }),
            Context::Preview => K::preview_value().unwrap_or_else(K::test_value),
            Context::Test => K::test_value(),
        }
    }

    /// Overrides the value of the dependency `K` for every subsequent read, in every context.
    ///
    /// The override is global and unscoped: it stays in place until it is removed with
    /// [`remove_override`](Self::remove_override) or the store is reset with
    /// [`reset_for_test_boundary`](Self::reset_for_test_boundary).
    pub fn set<K>(&self, value: K::Value)
    where
        K: DependencyKey,
    {
        trace!("key" = type_name::<K>(), "override");
        let guard = self.state.lock();
        let previous = guard
            .borrow_mut()
            .overrides
            .insert(TypeId::of::<K>(), Erased::new(value));
        drop(previous);
    }

    /// Removes the override of the dependency `K` and returns it, if one exists.
    ///
    /// Subsequent reads resolve `K` through the cache and its factories again.
    pub fn remove_override<K>(&self) -> Option<K::Value>
    where
        K: DependencyKey,
    {
        trace!("key" = type_name::<K>(), "remove override");
        let guard = self.state.lock();
        let removed = guard.borrow_mut().overrides.remove(&TypeId::of::<K>());
        removed.as_ref().map(read::<K>)
    }

    /// Returns `true` if the dependency `K` is overridden.
    pub fn is_overridden<K>(&self) -> bool
    where
        K: DependencyKey,
    {
        let guard = self.state.lock();
        guard.borrow().overrides.contains_key(&TypeId::of::<K>())
    }

    /// Returns the current context, detecting it if it has not been set or detected yet.
    #[track_caller]
    pub fn context(&self) -> Context {
        let location = Location::caller();
        let guard = self.state.lock();
        self.current_context(&guard, location)
    }

    /// Replaces the context used by subsequent resolutions.
    ///
    /// Values already cached are kept. Keys not yet cached under `context` will be built
    /// fresh, while switching back to a previous context serves the values cached under it.
    pub fn set_context(&self, context: Context) {
        trace!(context = %context, "set context");
        let guard = self.state.lock();
        guard.borrow_mut().context = Some(context);
    }

    /// Removes every override and every cached value.
    ///
    /// The context is left unchanged.
    pub fn reset_for_test_boundary(&self) {
        trace!("reset");
        let guard = self.state.lock();
        // Values are dropped once the borrow ends, as their destructors may use the store.
        let (overrides, cache) = {
            let mut state = guard.borrow_mut();
            (take(&mut state.overrides), take(&mut state.cache))
        };
        drop((overrides, cache));
    }

    fn current_context(
        &self,
        state: &RefCell<State>,
        location: &'static Location<'static>,
    ) -> Context {
        if let Some(context) = state.borrow().context {
            return context;
        }

        let detected = self.detector.detect(&*self.reporter, location);
        *state.borrow_mut().context.get_or_insert(detected)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

impl StoreBuilder {
    /// Uses `context` instead of detecting it.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Reads the context override from the environment variable `var`.
    #[must_use]
    pub fn with_context_var(mut self, var: &'static str) -> Self {
        self.detector.set_var(var);
        self
    }

    /// Infers the context from `signals` when it is not overridden.
    #[must_use]
    pub fn with_signals<S>(mut self, signals: S) -> Self
    where
        S: HostSignals,
    {
        self.detector.set_signals(signals);
        self
    }

    /// Sends diagnostics to `reporter`.
    #[must_use]
    pub fn with_reporter<R>(mut self, reporter: R) -> Self
    where
        R: Reporter,
    {
        self.reporter = Box::new(reporter);
        self
    }

    /// Finalizes the building process and returns the built store.
    #[must_use]
    pub fn build(self) -> Store {
        let Self {
            context,
            detector,
            reporter,
        } = self;

        Store {
            state: ReentrantMutex::new(RefCell::new(State {
                context,
                ..State::default()
            })),
            detector,
            reporter,
        }
    }
}

/// Clones the value of `K` out of `erased`.
///
/// # Panics
///
/// Panics if `erased` does not hold a `K::Value`, which would mean the store is corrupted.
fn read<K>(erased: &Erased) -> K::Value
where
    K: DependencyKey,
{
    match erased.downcast_ref::<K::Value>() {
        Ok(value) => value.clone(),
        Err(err) => panic!("corrupted entry for `{}`: {err}", type_name::<K>()),
    }
}

/// Makes a [`Frame`] current until dropped.
///
/// Every resolution enters its own frame, so a nested resolution never reports under the
/// frame of the dependency that triggered it.
struct FrameScope<'a> {
    state: &'a RefCell<State>,
    previous: Option<Frame>,
}

impl<'a> FrameScope<'a> {
    fn enter(state: &'a RefCell<State>, frame: Frame) -> Self {
        let previous = state.borrow_mut().frame.replace(frame);
        Self { state, previous }
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().frame = self.previous.take();
    }
}

/// Marks a key as being built until dropped.
struct Resolving<'a> {
    state: &'a RefCell<State>,
}

impl<'a> Resolving<'a> {
    fn enter<K>(state: &'a RefCell<State>) -> Self
    where
        K: DependencyKey,
    {
        let key = TypeId::of::<K>();
        let mut borrowed = state.borrow_mut();
        if borrowed.resolving.iter().any(|(id, _)| *id == key) {
            let cycle = borrowed
                .resolving
                .iter()
                .map(|(_, name)| *name)
                .chain([type_name::<K>()])
                .collect::<Vec<_>>()
                .join(" -> ");
            drop(borrowed);
            panic!("dependency cycle detected: {cycle}");
        }

        borrowed.resolving.push((key, type_name::<K>()));
        Self { state }
    }
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().resolving.pop();
    }
}
