//! Observers for wiring events.
//!
//! Hooks for watching registrations, commits and waits as they happen, in the
//! same spirit as resolution tracing: keep implementations cheap, they are
//! called synchronously from registering and constructing threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::key::Key;
use crate::lifecycle::Lifecycle;
use crate::request::Mode;

/// Observer trait for wiring events.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Context, Key, Lifecycle, Mode, WireObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl WireObserver for PrintObserver {
///     fn registered(&self, key: &Key, scope: &str, lifecycle: Lifecycle) {
///         println!("register {} in {:?} as {}", key, scope, lifecycle);
///     }
///
///     fn committed(&self, key: &Key, scope: &str, notified: usize, duration: Duration) {
///         println!("commit {} in {:?}: {} waiters after {:?}", key, scope, notified, duration);
///     }
///
///     fn waiting(&self, key: &Key, scope: &str, mode: Mode) {
///         println!("waiting on {} in {:?} ({})", key, scope, mode);
///     }
///
///     fn constructor_panic(&self, key: &Key, scope: &str, message: &str) {
///         eprintln!("constructor for {} in {:?} panicked: {}", key, scope, message);
///     }
/// }
///
/// let ctx = Context::builder().observer(Arc::new(PrintObserver)).build();
/// ctx.register(|| 1u8);
/// ```
pub trait WireObserver: Send + Sync {
    /// Called when a registration is submitted, before its constructor runs.
    fn registered(&self, key: &Key, scope: &str, lifecycle: Lifecycle);

    /// Called after an instance is committed and its waiters are fulfilled.
    ///
    /// # Arguments
    ///
    /// * `notified` - Number of waiting requests fulfilled by this commit
    /// * `duration` - Time spent in the constructor
    fn committed(&self, key: &Key, scope: &str, notified: usize, duration: Duration);

    /// Called when a request is enqueued because nothing matches yet.
    fn waiting(&self, key: &Key, scope: &str, mode: Mode);

    /// Called when a constructor panics. Nothing is committed for the key.
    fn constructor_panic(&self, key: &Key, scope: &str, message: &str);
}

/// Collection of observers installed on a context.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn WireObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn WireObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn registered(&self, key: &Key, scope: &str, lifecycle: Lifecycle) {
        for observer in &self.observers {
            observer.registered(key, scope, lifecycle);
        }
    }

    #[inline]
    pub(crate) fn committed(&self, key: &Key, scope: &str, notified: usize, duration: Duration) {
        for observer in &self.observers {
            observer.committed(key, scope, notified, duration);
        }
    }

    #[inline]
    pub(crate) fn waiting(&self, key: &Key, scope: &str, mode: Mode) {
        for observer in &self.observers {
            observer.waiting(key, scope, mode);
        }
    }

    #[inline]
    pub(crate) fn constructor_panic(&self, key: &Key, scope: &str, message: &str) {
        for observer in &self.observers {
            observer.constructor_panic(key, scope, message);
        }
    }
}

/// Built-in observer emitting `tracing` events.
///
/// Installed automatically when [`WireConfig::trace_events`](crate::WireConfig)
/// is set.
pub struct TracingObserver {
    target_label: String,
}

impl TracingObserver {
    /// Creates an observer labelling events with `ferrous-wire`.
    pub fn new() -> Self {
        Self {
            target_label: "ferrous-wire".to_string(),
        }
    }

    /// Creates an observer with a custom label field.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            target_label: label.into(),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl WireObserver for TracingObserver {
    fn registered(&self, key: &Key, scope: &str, lifecycle: Lifecycle) {
        info!(label = %self.target_label, key = %key, scope, %lifecycle, "registered");
    }

    fn committed(&self, key: &Key, scope: &str, notified: usize, duration: Duration) {
        info!(label = %self.target_label, key = %key, scope, notified, ?duration, "committed");
    }

    fn waiting(&self, key: &Key, scope: &str, mode: Mode) {
        info!(label = %self.target_label, key = %key, scope, %mode, "waiting");
    }

    fn constructor_panic(&self, key: &Key, scope: &str, message: &str) {
        warn!(label = %self.target_label, key = %key, scope, panic = message, "constructor panicked");
    }
}

/// Observer that counts events, useful for startup assertions and tests.
#[derive(Default)]
pub struct CountingObserver {
    registrations: AtomicUsize,
    commits: AtomicUsize,
    notified: AtomicUsize,
    waits: AtomicUsize,
    panics: AtomicUsize,
}

impl CountingObserver {
    /// Creates an observer with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations submitted.
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Instances committed.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Waiting requests fulfilled by commits.
    pub fn notified_count(&self) -> usize {
        self.notified.load(Ordering::SeqCst)
    }

    /// Requests that had to wait.
    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }

    /// Constructors that panicked.
    pub fn panic_count(&self) -> usize {
        self.panics.load(Ordering::SeqCst)
    }
}

impl WireObserver for CountingObserver {
    fn registered(&self, _key: &Key, _scope: &str, _lifecycle: Lifecycle) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
    }

    fn committed(&self, _key: &Key, _scope: &str, notified: usize, _duration: Duration) {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.notified.fetch_add(notified, Ordering::SeqCst);
    }

    fn waiting(&self, _key: &Key, _scope: &str, _mode: Mode) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }

    fn constructor_panic(&self, _key: &Key, _scope: &str, _message: &str) {
        self.panics.fetch_add(1, Ordering::SeqCst);
    }
}
