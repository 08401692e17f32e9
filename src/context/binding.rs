use std::marker::PhantomData;
use std::sync::Arc;

use crate::capability::{Capability, CapabilityTable};
use crate::key::key_of_type;
use crate::lifecycle::Lifecycle;
use crate::registration::{AnyArc, AnyConstructor, AnyFactory, Constructor, Registration};
use crate::request::{AsPendingRequest, PendingRequest};
use crate::DEFAULT_SCOPE;

use super::Context;

/// Typed registration under construction.
///
/// Created by [`Context::bind`]. Nothing reaches the context until
/// [`singleton`](Self::singleton), [`prototype`](Self::prototype) or
/// [`register`](Self::register) is called.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{capability, CapabilityDep, Context, Dep};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
/// capability!(dyn Clock);
///
/// struct FixedClock(u64);
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { self.0 }
/// }
///
/// struct Scheduler { clock: Arc<dyn Clock> }
///
/// let ctx = Context::new();
/// let clock = CapabilityDep::<dyn Clock>::in_scope("jobs");
/// ctx.bind::<Scheduler>()
///     .in_scope("jobs")
///     .after(&clock)
///     .singleton({
///         let clock = clock.clone();
///         move || Scheduler { clock: clock.get() }
///     });
/// ctx.bind::<FixedClock>()
///     .in_scope("jobs")
///     .provides::<dyn Clock, _>(|c| c as Arc<dyn Clock>)
///     .singleton(|| FixedClock(42));
///
/// let scheduler = ctx.request_in::<Scheduler>("jobs").unwrap();
/// assert_eq!(scheduler.clock.now(), 42);
/// ```
#[must_use = "a binding does nothing until singleton, prototype or register is called"]
pub struct Binding<'a, T> {
    ctx: &'a Context,
    scope: String,
    capabilities: CapabilityTable,
    prerequisites: Vec<PendingRequest>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Send + Sync + 'static> Binding<'a, T> {
    pub(crate) fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            scope: DEFAULT_SCOPE.to_string(),
            capabilities: CapabilityTable::new(),
            prerequisites: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Target scope; defaults to [`DEFAULT_SCOPE`].
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Adds a prerequisite.
    ///
    /// The request is attached to the context when the binding is submitted. It
    /// does not delay construction: the constructor decides where to block on it.
    pub fn after(mut self, dependency: &impl AsPendingRequest) -> Self {
        self.prerequisites.push(dependency.as_pending().clone());
        self
    }

    /// Declares that `T` provides capability set `I`.
    pub fn provides<I, F>(mut self, upcast: F) -> Self
    where
        I: ?Sized + Capability + Send + Sync,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        self.capabilities.insert::<T, I, F>(upcast);
        self
    }

    /// Submits a singleton: `ctor` runs once, on its own task.
    pub fn singleton<F>(self, ctor: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let ctor: AnyConstructor = Box::new(move || Arc::new(ctor()) as AnyArc);
        self.submit(Constructor::Once(ctor));
    }

    /// Submits a prototype: `factory` runs on every read.
    pub fn prototype<F>(self, factory: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: AnyFactory = Arc::new(move || Arc::new(factory()) as AnyArc);
        self.submit(Constructor::Prototype(factory));
    }

    /// Submits with a lifecycle chosen at runtime.
    pub fn register<F>(self, lifecycle: Lifecycle, ctor: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        match lifecycle {
            Lifecycle::Singleton => self.singleton(ctor),
            Lifecycle::Prototype => self.prototype(ctor),
        }
    }

    fn submit(self, ctor: Constructor) {
        let registration = Registration::new(key_of_type::<T>(), self.scope, ctor)
            .with_capabilities(self.capabilities)
            .with_prerequisites(self.prerequisites);
        self.ctx.submit(registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Dep;

    #[test]
    fn test_binding_collects_prerequisites() {
        let ctx = Context::new();
        let first = Dep::<u8>::new();
        let second = Dep::<u16>::in_scope("other");
        let binding = ctx.bind::<u32>().in_scope("s").after(&first).after(&second);

        assert_eq!(binding.scope, "s");
        assert_eq!(binding.prerequisites.len(), 2);
        assert_eq!(binding.prerequisites[1].scope(), "other");
    }

    #[test]
    fn test_runtime_lifecycle() {
        let ctx = Context::new();
        ctx.bind::<String>()
            .register(Lifecycle::Prototype, || "fresh".to_string());
        let a = ctx.request_required::<String>();
        let b = ctx.request_required::<String>();
        assert_eq!(*a, "fresh");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
