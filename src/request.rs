//! Pending requests and typed dependency handles.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::capability::Capability;
use crate::error::{DiError, DiResult};
use crate::key::{key_of_capability, key_of_type, Key};
use crate::promise::{Promise, Resolved};
use crate::registration::AnyArc;
use crate::DEFAULT_SCOPE;

/// How a pending request is matched against registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Matches a registration of exactly the requested key
    Exact,
    /// Matches any registration that provides the requested capability set
    Structural,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Exact => f.write_str("exact"),
            Mode::Structural => f.write_str("structural"),
        }
    }
}

/// A single-assignment, replay-stable promise for a (scope, key, mode).
///
/// Creating a pending request does not block and does not contact any context.
/// It becomes live when it is passed as a prerequisite to a registration or
/// returned from [`Context::ask`](crate::Context::ask). Cloning shares the
/// underlying promise.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, PendingRequest, Mode, DEFAULT_SCOPE, key_of_type};
///
/// let ctx = Context::new();
/// let dep = PendingRequest::declare(key_of_type::<u64>(), DEFAULT_SCOPE, Mode::Exact).unwrap();
///
/// ctx.bind::<String>().after(&dep).singleton({
///     let dep = dep.clone();
///     move || {
///         let n = dep.wait().unwrap().downcast::<u64>().unwrap();
///         format!("n = {}", n)
///     }
/// });
/// ctx.register(|| 7u64);
///
/// assert_eq!(*ctx.request_required::<String>(), "n = 7");
/// ```
#[derive(Clone)]
pub struct PendingRequest {
    key: Key,
    scope: String,
    mode: Mode,
    promise: Promise,
}

impl PendingRequest {
    /// Declares a dependency on `key` in `scope`.
    ///
    /// Returns [`DiError::Usage`] if `mode` is structural and `key` is not a
    /// capability set.
    pub fn declare(key: Key, scope: impl Into<String>, mode: Mode) -> DiResult<Self> {
        if mode == Mode::Structural && !key.is_capability() {
            return Err(structural_usage_error(&key));
        }
        Ok(Self::unchecked(key, scope.into(), mode))
    }

    pub(crate) fn unchecked(key: Key, scope: String, mode: Mode) -> Self {
        Self {
            key,
            scope,
            mode,
            promise: Promise::new(),
        }
    }

    pub(crate) fn fulfilled(key: Key, scope: String, mode: Mode, resolved: Resolved) -> Self {
        let request = Self::unchecked(key, scope, mode);
        request.promise.fulfill(resolved);
        request
    }

    /// The requested key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The scope the request targets.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Exact or structural.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true once a value has been delivered.
    pub fn is_fulfilled(&self) -> bool {
        self.promise.is_fulfilled()
    }

    /// Blocks until a value is delivered, then returns it.
    ///
    /// This is the suspension point of the protocol: there is no timeout. Repeat
    /// calls return the same value immediately; prototype deliveries produce a
    /// fresh value on every call.
    pub fn wait(&self) -> DiResult<AnyArc> {
        self.realize(&self.promise.wait())
    }

    /// Returns the delivered value without blocking, if any.
    pub fn try_get(&self) -> Option<DiResult<AnyArc>> {
        self.promise.try_get().map(|resolved| self.realize(&resolved))
    }

    /// Awaits delivery without blocking a thread.
    #[cfg(feature = "async")]
    pub async fn wait_async(&self) -> DiResult<AnyArc> {
        let resolved = self.promise.wait_async().await;
        self.realize(&resolved)
    }

    /// Returns true if both handles share one promise.
    pub fn same_promise(&self, other: &PendingRequest) -> bool {
        self.promise.ptr_eq(&other.promise)
    }

    pub(crate) fn fulfill(&self, resolved: Resolved) -> bool {
        self.promise.fulfill(resolved)
    }

    fn realize(&self, resolved: &Resolved) -> DiResult<AnyArc> {
        resolved
            .realize()
            .ok_or(DiError::TypeMismatch(self.key.display_name()))
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("key", &self.key.display_name())
            .field("scope", &self.scope)
            .field("mode", &self.mode)
            .field("fulfilled", &self.is_fulfilled())
            .finish()
    }
}

pub(crate) fn structural_usage_error(key: &Key) -> DiError {
    DiError::Usage(format!(
        "structural request requires a capability set, got concrete type {}",
        key.display_name()
    ))
}

/// Anything that can be passed as a registration prerequisite.
pub trait AsPendingRequest {
    /// The underlying pending request.
    fn as_pending(&self) -> &PendingRequest;
}

impl AsPendingRequest for PendingRequest {
    fn as_pending(&self) -> &PendingRequest {
        self
    }
}

/// Typed exact-mode dependency on `T`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, Dep};
///
/// struct Settings { name: &'static str }
/// struct App { name: &'static str }
///
/// let ctx = Context::new();
/// let settings = Dep::<Settings>::new();
/// ctx.bind::<App>().after(&settings).singleton({
///     let settings = settings.clone();
///     move || App { name: settings.get().name }
/// });
/// ctx.register(|| Settings { name: "wire" });
///
/// assert_eq!(ctx.request_required::<App>().name, "wire");
/// ```
pub struct Dep<T> {
    request: PendingRequest,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Dep<T> {
    /// Dependency on `T` in the default scope.
    pub fn new() -> Self {
        Self::in_scope(DEFAULT_SCOPE)
    }

    /// Dependency on `T` in `scope`.
    pub fn in_scope(scope: impl Into<String>) -> Self {
        Self {
            request: PendingRequest::unchecked(key_of_type::<T>(), scope.into(), Mode::Exact),
            _marker: PhantomData,
        }
    }

    /// Blocks until `T` is delivered.
    pub fn resolve(&self) -> DiResult<Arc<T>> {
        self.request
            .wait()?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Blocks until `T` is delivered; panics on a type mismatch.
    pub fn get(&self) -> Arc<T> {
        self.resolve()
            .unwrap_or_else(|e| panic!("Failed to read dependency {}: {}", std::any::type_name::<T>(), e))
    }

    /// The untyped request.
    pub fn pending(&self) -> &PendingRequest {
        &self.request
    }
}

impl<T: Send + Sync + 'static> Default for Dep<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Dep<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> AsPendingRequest for Dep<T> {
    fn as_pending(&self) -> &PendingRequest {
        &self.request
    }
}

/// Typed structural dependency on capability set `I`.
pub struct CapabilityDep<I: ?Sized> {
    request: PendingRequest,
    _marker: PhantomData<fn() -> Arc<I>>,
}

impl<I: ?Sized + Capability + Send + Sync> CapabilityDep<I> {
    /// Dependency on `I` in the default scope.
    pub fn new() -> Self {
        Self::in_scope(DEFAULT_SCOPE)
    }

    /// Dependency on `I` in `scope`.
    pub fn in_scope(scope: impl Into<String>) -> Self {
        Self {
            request: PendingRequest::unchecked(
                key_of_capability::<I>(),
                scope.into(),
                Mode::Structural,
            ),
            _marker: PhantomData,
        }
    }

    /// Blocks until some instance providing `I` is delivered.
    pub fn resolve(&self) -> DiResult<Arc<I>> {
        downcast_capability::<I>(self.request.wait()?)
    }

    /// Blocks until delivered; panics on a type mismatch.
    pub fn get(&self) -> Arc<I> {
        self.resolve()
            .unwrap_or_else(|e| panic!("Failed to read capability {}: {}", std::any::type_name::<I>(), e))
    }

    /// The untyped request.
    pub fn pending(&self) -> &PendingRequest {
        &self.request
    }
}

impl<I: ?Sized + Capability + Send + Sync> Default for CapabilityDep<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> Clone for CapabilityDep<I> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I: ?Sized> AsPendingRequest for CapabilityDep<I> {
    fn as_pending(&self) -> &PendingRequest {
        &self.request
    }
}

// Capability views are stored as Arc<Arc<dyn I>>
pub(crate) fn downcast_capability<I: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<I>> {
    any.downcast::<Arc<I>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<I>()))
}
