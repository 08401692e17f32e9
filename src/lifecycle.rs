//! Registration lifecycles.

/// Lifecycle of a registration, controlling instance sharing.
///
/// The lifecycle is attached when a type is registered and is invisible to the
/// retrieval API: both kinds are requested the same way.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, Lifecycle};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct Config { port: u16 }
/// struct Ticket(u32);
///
/// let ctx = Context::new();
/// ctx.bind::<Config>().register(Lifecycle::Singleton, || Config { port: 8080 });
///
/// let next = Arc::new(AtomicU32::new(0));
/// ctx.bind::<Ticket>().register(Lifecycle::Prototype, move || {
///     Ticket(next.fetch_add(1, Ordering::SeqCst))
/// });
///
/// // Singleton: same instance every time
/// let a = ctx.request_required::<Config>();
/// let b = ctx.request_required::<Config>();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Prototype: fresh instance every time
/// let t1 = ctx.request_required::<Ticket>();
/// let t2 = ctx.request_required::<Ticket>();
/// assert_ne!(t1.0, t2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Constructed once per (scope, type), shared by every retrieval
    ///
    /// The constructor runs once on its own task. The committed instance is
    /// delivered to everyone who was waiting and cached for later lookups.
    #[default]
    Singleton,
    /// Factory re-invoked on every retrieval, never shared
    ///
    /// The scope store keeps the factory instead of a value. Each successful
    /// retrieval, including each read of a delivered promise, runs it again.
    Prototype,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Singleton => f.write_str("singleton"),
            Lifecycle::Prototype => f.write_str("prototype"),
        }
    }
}
