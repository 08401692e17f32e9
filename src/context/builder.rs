use std::sync::Arc;

use crate::config::WireConfig;
use crate::observer::{Observers, TracingObserver, WireObserver};
use crate::spawner::{Spawner, ThreadSpawner};

use super::Context;

/// Builder for a [`Context`].
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, CountingObserver, WireConfig};
/// use std::sync::Arc;
///
/// let counter = Arc::new(CountingObserver::new());
/// let ctx = Context::builder()
///     .config(WireConfig { trace_events: true, ..WireConfig::default() })
///     .observer(counter.clone())
///     .build();
///
/// ctx.register(|| 3i32);
/// assert_eq!(*ctx.request_required::<i32>(), 3);
/// assert_eq!(counter.registration_count(), 1);
/// ```
pub struct ContextBuilder {
    config: WireConfig,
    observers: Observers,
    spawner: Option<Arc<dyn Spawner>>,
}

impl ContextBuilder {
    /// Defaults: [`WireConfig::default`], no observers, a [`ThreadSpawner`].
    pub fn new() -> Self {
        Self {
            config: WireConfig::default(),
            observers: Observers::new(),
            spawner: None,
        }
    }

    /// Replaces the configuration.
    pub fn config(mut self, config: WireConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an observer. Observers run in the order they were added.
    pub fn observer(mut self, observer: Arc<dyn WireObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Replaces the task spawner.
    pub fn spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Some(Arc::new(spawner));
        self
    }

    /// Creates the context. A default [`ThreadSpawner`] honors the configured stack size.
    pub fn build(self) -> Context {
        let mut observers = self.observers;
        if self.config.trace_events {
            observers.add(Arc::new(TracingObserver::new()));
        }
        let spawner = self
            .spawner
            .unwrap_or_else(|| Arc::new(ThreadSpawner::from_config(&self.config)));
        Context::from_parts(self.config, observers, spawner)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
