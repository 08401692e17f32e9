//! Single-assignment, replay-stable promise.
//!
//! A promise is written at most once. Every read, first or later, observes the
//! written value; reads never consume it.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::capability::Upcast;
use crate::registration::{AnyArc, Instance};

/// Value delivered through a promise.
///
/// Holds the stored instance plus, for structural deliveries, the view that
/// turns it into the requested capability.
#[derive(Clone)]
pub(crate) struct Resolved {
    instance: Instance,
    view: Option<Upcast>,
}

impl Resolved {
    pub(crate) fn exact(instance: Instance) -> Self {
        Self { instance, view: None }
    }

    pub(crate) fn structural(instance: Instance, view: Upcast) -> Self {
        Self { instance, view: Some(view) }
    }

    /// Realizes the delivered value. `None` means the view rejected the instance.
    pub(crate) fn realize(&self) -> Option<AnyArc> {
        let value = self.instance.realize();
        match &self.view {
            Some(view) => view(&value),
            None => Some(value),
        }
    }
}

struct PromiseInner {
    slot: Mutex<Option<Resolved>>,
    ready: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

#[derive(Clone)]
pub(crate) struct Promise {
    inner: Arc<PromiseInner>,
}

impl Promise {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(PromiseInner {
                slot: Mutex::new(None),
                ready: Condvar::new(),
                #[cfg(feature = "async")]
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// Writes the value. Returns false if the promise was already fulfilled.
    pub(crate) fn fulfill(&self, resolved: Resolved) -> bool {
        {
            let mut slot = self.inner.slot.lock();
            if slot.is_some() {
                return false;
            }
            *slot = Some(resolved);
        }
        self.inner.ready.notify_all();
        #[cfg(feature = "async")]
        self.inner.notify.notify_waiters();
        true
    }

    /// Blocks until the promise is fulfilled. No timeout.
    pub(crate) fn wait(&self) -> Resolved {
        let mut slot = self.inner.slot.lock();
        loop {
            if let Some(resolved) = slot.as_ref() {
                return resolved.clone();
            }
            self.inner.ready.wait(&mut slot);
        }
    }

    #[cfg(feature = "async")]
    pub(crate) async fn wait_async(&self) -> Resolved {
        loop {
            // Register interest before checking so a concurrent fulfill is not missed
            let notified = self.inner.notify.notified();
            if let Some(resolved) = self.try_get() {
                return resolved;
            }
            notified.await;
        }
    }

    pub(crate) fn try_get(&self) -> Option<Resolved> {
        self.inner.slot.lock().clone()
    }

    pub(crate) fn is_fulfilled(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    pub(crate) fn ptr_eq(&self, other: &Promise) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
