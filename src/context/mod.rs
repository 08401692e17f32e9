//! Wiring context: registration, requests and commit fan-out.
//!
//! A [`Context`] owns one scope store and one waiter registry behind a single
//! lock. Registrations return immediately and construct on their own task;
//! requests either find a committed instance or wait for one.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::capability::{Capability, CapabilityTable};
use crate::config::WireConfig;
use crate::diagnostics::FailedConstruction;
use crate::error::{DiError, DiResult};
use crate::internal::{ScopeStore, StoredEntry, WaiterRegistry};
use crate::key::{key_of_capability, key_of_type, Key};
use crate::observer::Observers;
use crate::promise::Resolved;
use crate::registration::{AnyConstructor, AnyFactory, Constructor, Instance, Registration};
use crate::request::{downcast_capability, structural_usage_error, Mode, PendingRequest};
use crate::spawner::Spawner;
use crate::DEFAULT_SCOPE;

mod binding;
mod builder;

pub use binding::Binding;
pub use builder::ContextBuilder;

/// Order-independent wiring context.
///
/// Registering and requesting can happen in any order and from any thread.
/// Cloning is cheap and every clone shares the same scopes.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Context, Dep};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let ctx = Context::new();
///
/// // The consumer is registered before what it depends on
/// let db = Dep::<Database>::new();
/// ctx.bind::<UserService>().after(&db).singleton({
///     let db = db.clone();
///     move || UserService { db: db.get() }
/// });
/// ctx.register(|| Database { url: "postgres://localhost".to_string() });
///
/// let users = ctx.request_required::<UserService>();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

pub(crate) struct ContextInner {
    pub(crate) state: Mutex<WireState>,
    pub(crate) observers: Observers,
    pub(crate) spawner: Arc<dyn Spawner>,
    pub(crate) config: WireConfig,
}

/// Everything guarded by the coordination lock.
pub(crate) struct WireState {
    pub(crate) store: ScopeStore,
    pub(crate) waiters: WaiterRegistry,
    pub(crate) failures: Vec<FailedConstruction>,
}

impl Context {
    /// Creates a context with default configuration and a [`ThreadSpawner`](crate::ThreadSpawner).
    pub fn new() -> Self {
        ContextBuilder::new().build()
    }

    /// Starts configuring a context.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub(crate) fn from_parts(config: WireConfig, observers: Observers, spawner: Arc<dyn Spawner>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                state: Mutex::new(WireState {
                    store: ScopeStore::new(),
                    waiters: WaiterRegistry::new(),
                    failures: Vec::new(),
                }),
                observers,
                spawner,
                config,
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ContextInner {
        &self.inner
    }

    /// Configuration this context was built with.
    pub fn config(&self) -> &WireConfig {
        &self.inner.config
    }

    /// Returns true if both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ===== Registration =====

    /// Starts a typed registration of `T`.
    ///
    /// The binding collects scope, prerequisites and provided capabilities;
    /// [`Binding::singleton`] or [`Binding::prototype`] submits it.
    pub fn bind<T: Send + Sync + 'static>(&self) -> Binding<'_, T> {
        Binding::new(self)
    }

    /// Registers a singleton `T` in the default scope.
    pub fn register<T, F>(&self, ctor: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.bind::<T>().singleton(ctor);
    }

    /// Registers a singleton `T` in `scope`.
    pub fn register_in<T, F>(&self, scope: &str, ctor: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.bind::<T>().in_scope(scope).singleton(ctor);
    }

    /// Registers a prototype `T` in the default scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::Context;
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// let ctx = Context::new();
    /// let counter = AtomicU32::new(0);
    /// ctx.register_prototype(move || counter.fetch_add(1, Ordering::SeqCst));
    ///
    /// assert_eq!(*ctx.request_required::<u32>(), 0);
    /// assert_eq!(*ctx.request_required::<u32>(), 1);
    /// ```
    pub fn register_prototype<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.bind::<T>().prototype(factory);
    }

    /// Registers a prototype `T` in `scope`.
    pub fn register_prototype_in<T, F>(&self, scope: &str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.bind::<T>().in_scope(scope).prototype(factory);
    }

    /// Type-erased singleton registration.
    ///
    /// The constructor's result is stored under `key` as is; typed readers that
    /// expect another type get [`DiError::TypeMismatch`].
    pub fn register_any(
        &self,
        key: Key,
        scope: &str,
        ctor: AnyConstructor,
        prerequisites: Vec<PendingRequest>,
    ) {
        self.submit(Registration::new(key, scope, Constructor::Once(ctor)).with_prerequisites(prerequisites));
    }

    /// Type-erased prototype registration.
    pub fn register_prototype_any(
        &self,
        key: Key,
        scope: &str,
        factory: AnyFactory,
        prerequisites: Vec<PendingRequest>,
    ) {
        self.submit(
            Registration::new(key, scope, Constructor::Prototype(factory)).with_prerequisites(prerequisites),
        );
    }

    pub(crate) fn submit(&self, registration: Registration) {
        let Registration {
            key,
            scope,
            ctor,
            capabilities,
            prerequisites,
        } = registration;
        let lifecycle = ctor.lifecycle();
        let prerequisite_count = prerequisites.len();

        let waiting: Vec<PendingRequest> = {
            let mut state = self.inner.state.lock();
            state.store.touch(&scope);
            prerequisites
                .into_iter()
                .filter_map(|request| Self::attach(&mut state, request))
                .collect()
        };
        self.report_waiting(&waiting);

        debug!(key = %key, scope = %scope, %lifecycle, prerequisites = prerequisite_count, "registered");
        self.inner.observers.registered(&key, &scope, lifecycle);

        let name = format!("{}{}", self.inner.config.thread_name_prefix, key.display_name());
        let ctx = self.clone();
        self.inner
            .spawner
            .spawn(name, Box::new(move || ctx.construct(key, scope, ctor, capabilities)));
    }

    /// Fulfills `request` from the store or enqueues it. Returns it if it has to wait.
    fn attach(state: &mut WireState, request: PendingRequest) -> Option<PendingRequest> {
        if request.is_fulfilled() {
            return None;
        }
        state.store.touch(request.scope());
        match state.store.lookup(request.scope(), request.key(), request.mode()) {
            Some(resolved) => {
                request.fulfill(resolved);
                None
            }
            None => state.waiters.enqueue(request.clone()).then_some(request),
        }
    }

    fn construct(&self, key: Key, scope: String, ctor: Constructor, capabilities: Arc<CapabilityTable>) {
        let started = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(move || ctor.construct())) {
            Ok(instance) => self.commit(key, &scope, instance, capabilities, started.elapsed()),
            Err(payload) => self.record_failure(key, scope, panic_message(payload.as_ref())),
        }
    }

    /// Stores the instance, then fulfills exact waiters and the first matching structural group.
    fn commit(
        &self,
        key: Key,
        scope: &str,
        instance: Instance,
        capabilities: Arc<CapabilityTable>,
        duration: Duration,
    ) {
        let notified = {
            let mut state = self.inner.state.lock();
            state.store.insert(
                scope,
                key,
                StoredEntry {
                    instance: instance.clone(),
                    capabilities: capabilities.clone(),
                },
            );

            let mut notified = 0;
            let exact = Resolved::exact(instance.clone());
            for request in state.waiters.take_exact(scope, &key) {
                if request.fulfill(exact.clone()) {
                    notified += 1;
                }
            }

            if let Some((capability, group)) = state.waiters.take_first_structural(scope, &capabilities) {
                if let Some(view) = capabilities.view(&capability) {
                    let resolved = Resolved::structural(instance, view);
                    for request in group {
                        if request.fulfill(resolved.clone()) {
                            notified += 1;
                        }
                    }
                }
            }
            notified
        };

        debug!(key = %key, scope, notified, ?duration, "committed");
        self.inner.observers.committed(&key, scope, notified, duration);
    }

    fn record_failure(&self, key: Key, scope: String, message: String) {
        warn!(key = %key, scope = %scope, panic = %message, "constructor panicked; dependents stay pending");
        self.inner.state.lock().failures.push(FailedConstruction {
            key,
            scope: scope.clone(),
            message: message.clone(),
        });
        self.inner.observers.constructor_panic(&key, &scope, &message);
    }

    fn report_waiting(&self, waiting: &[PendingRequest]) {
        for request in waiting {
            debug!(key = %request.key(), scope = request.scope(), mode = %request.mode(), "waiting");
            self.inner
                .observers
                .waiting(request.key(), request.scope(), request.mode());
        }
    }

    // ===== Requests =====

    /// Declares a dependency; see [`PendingRequest::declare`].
    pub fn declare_dependency(&self, key: Key, scope: &str, mode: Mode) -> DiResult<PendingRequest> {
        PendingRequest::declare(key, scope, mode)
    }

    /// Non-blocking exact request.
    ///
    /// Returns a request that is already fulfilled if `key` is committed in
    /// `scope`, otherwise one that is enqueued and fulfilled by the next commit.
    pub fn ask(&self, key: &Key, scope: &str) -> PendingRequest {
        self.ask_mode(*key, scope, Mode::Exact)
    }

    /// Non-blocking structural request.
    ///
    /// Fails immediately with [`DiError::Usage`] if `key` is not a capability set.
    pub fn ask_structural(&self, key: &Key, scope: &str) -> DiResult<PendingRequest> {
        if !key.is_capability() {
            return Err(structural_usage_error(key));
        }
        Ok(self.ask_mode(*key, scope, Mode::Structural))
    }

    fn ask_mode(&self, key: Key, scope: &str, mode: Mode) -> PendingRequest {
        let request = {
            let mut state = self.inner.state.lock();
            state.store.touch(scope);
            if let Some(resolved) = state.store.lookup(scope, &key, mode) {
                return PendingRequest::fulfilled(key, scope.to_string(), mode, resolved);
            }
            let request = PendingRequest::unchecked(key, scope.to_string(), mode);
            // A fresh promise is never already queued
            let _ = state.waiters.enqueue(request.clone());
            request
        };
        self.report_waiting(std::slice::from_ref(&request));
        request
    }

    /// Blocks until `T` is available in the default scope.
    pub fn request<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.request_in::<T>(DEFAULT_SCOPE)
    }

    /// Blocks until `T` is available in `scope`.
    ///
    /// There is no timeout: if `T` is never registered in `scope` this never returns.
    pub fn request_in<T: Send + Sync + 'static>(&self, scope: &str) -> DiResult<Arc<T>> {
        self.ask(&key_of_type::<T>(), scope)
            .wait()?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`request`](Self::request), panicking on a type mismatch.
    pub fn request_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.request_required_in::<T>(DEFAULT_SCOPE)
    }

    /// Like [`request_in`](Self::request_in), panicking on a type mismatch.
    pub fn request_required_in<T: Send + Sync + 'static>(&self, scope: &str) -> Arc<T> {
        self.request_in::<T>(scope)
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Blocks until some instance in the default scope provides `I`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{capability, Context};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> String;
    /// }
    /// capability!(dyn Greeter);
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn greet(&self) -> String { "hello".to_string() }
    /// }
    ///
    /// let ctx = Context::new();
    /// ctx.bind::<English>()
    ///     .provides::<dyn Greeter, _>(|e| e as Arc<dyn Greeter>)
    ///     .singleton(|| English);
    ///
    /// let greeter = ctx.request_capability::<dyn Greeter>().unwrap();
    /// assert_eq!(greeter.greet(), "hello");
    /// ```
    pub fn request_capability<I>(&self) -> DiResult<Arc<I>>
    where
        I: ?Sized + Capability + Send + Sync,
    {
        self.request_capability_in::<I>(DEFAULT_SCOPE)
    }

    /// Blocks until some instance in `scope` provides `I`.
    pub fn request_capability_in<I>(&self, scope: &str) -> DiResult<Arc<I>>
    where
        I: ?Sized + Capability + Send + Sync,
    {
        let request = self.ask_mode(key_of_capability::<I>(), scope, Mode::Structural);
        downcast_capability::<I>(request.wait()?)
    }

    /// Like [`request_capability`](Self::request_capability), panicking on a type mismatch.
    pub fn request_capability_required<I>(&self) -> Arc<I>
    where
        I: ?Sized + Capability + Send + Sync,
    {
        self.request_capability::<I>()
            .unwrap_or_else(|e| panic!("Failed to resolve capability {}: {}", std::any::type_name::<I>(), e))
    }

    /// Awaits `T` in `scope` without blocking a runtime thread.
    #[cfg(feature = "async")]
    pub async fn request_async<T: Send + Sync + 'static>(&self, scope: &str) -> DiResult<Arc<T>> {
        self.ask(&key_of_type::<T>(), scope)
            .wait_async()
            .await?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Awaits an instance providing `I` in `scope` without blocking a runtime thread.
    #[cfg(feature = "async")]
    pub async fn request_capability_async<I>(&self, scope: &str) -> DiResult<Arc<I>>
    where
        I: ?Sized + Capability + Send + Sync,
    {
        let request = self.ask_mode(key_of_capability::<I>(), scope, Mode::Structural);
        downcast_capability::<I>(request.wait_async().await?)
    }

    // ===== Introspection =====

    /// Returns true if `key` has a committed instance in `scope`.
    pub fn contains(&self, key: &Key, scope: &str) -> bool {
        self.inner.state.lock().store.get(scope, key).is_some()
    }

    /// Returns true if `T` has a committed instance in `scope`.
    pub fn contains_type<T: 'static>(&self, scope: &str) -> bool {
        self.contains(&key_of_type::<T>(), scope)
    }

    /// Names of all scopes created so far, sorted.
    pub fn scopes(&self) -> Vec<String> {
        self.inner.state.lock().store.scope_names()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.inner.config)
            .field("has_observers", &self.inner.observers.has_observers())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
