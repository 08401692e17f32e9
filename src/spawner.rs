//! Scheduling of construction tasks.
//!
//! Every registration runs its constructor on a task handed to the context's
//! [`Spawner`]. Constructors may block on their prerequisites, so spawners must
//! give each task its own thread of execution (or a blocking-capable pool).

use std::thread;

use tracing::error;

use crate::config::WireConfig;

/// Boxed construction task.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules construction tasks.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, Spawner, Task};
///
/// // Runs each constructor on a plain std thread, ignoring the name
/// struct BareThreads;
///
/// impl Spawner for BareThreads {
///     fn spawn(&self, _name: String, task: Task) {
///         std::thread::spawn(task);
///     }
/// }
///
/// let ctx = Context::builder().spawner(BareThreads).build();
/// ctx.register(|| 5u8);
/// assert_eq!(*ctx.request_required::<u8>(), 5);
/// ```
pub trait Spawner: Send + Sync {
    /// Runs `task` concurrently with the caller. `name` identifies the
    /// registration for diagnostics.
    fn spawn(&self, name: String, task: Task);
}

/// Spawns one named OS thread per construction task.
#[derive(Debug, Clone, Default)]
pub struct ThreadSpawner {
    stack_size: Option<usize>,
}

impl ThreadSpawner {
    /// Creates a spawner using the platform default stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a spawner honoring `config.stack_size`.
    pub fn from_config(config: &WireConfig) -> Self {
        Self {
            stack_size: config.stack_size,
        }
    }
}

impl Spawner for ThreadSpawner {
    fn spawn(&self, name: String, task: Task) {
        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        if let Err(e) = builder.spawn(task) {
            // The task is dropped; anything waiting on it stays pending
            error!(task = %name, error = %e, "failed to spawn construction thread");
        }
    }
}

/// Runs construction tasks on a tokio runtime's blocking pool.
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "async")]
impl TokioSpawner {
    /// Uses the given runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> crate::DiResult<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| crate::DiError::Usage(format!("no tokio runtime: {}", e)))
    }
}

#[cfg(feature = "async")]
impl Spawner for TokioSpawner {
    fn spawn(&self, name: String, task: Task) {
        tracing::trace!(task = %name, "spawning blocking construction task");
        drop(self.handle.spawn_blocking(task));
    }
}
