//! Registration types.

use std::any::Any;
use std::sync::Arc;

use crate::capability::CapabilityTable;
use crate::key::Key;
use crate::lifecycle::Lifecycle;
use crate::request::PendingRequest;

/// Type-erased shared value as stored and delivered.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased prototype factory.
pub type AnyFactory = Arc<dyn Fn() -> AnyArc + Send + Sync>;

/// Type-erased one-shot constructor.
pub type AnyConstructor = Box<dyn FnOnce() -> AnyArc + Send>;

/// What the scope store holds for a (scope, key).
#[derive(Clone)]
pub(crate) enum Instance {
    Shared(AnyArc),
    Prototype(AnyFactory),
}

impl Instance {
    /// Produces the value handed to a retriever.
    ///
    /// Prototype factories run here, on the retriever's thread.
    pub(crate) fn realize(&self) -> AnyArc {
        match self {
            Instance::Shared(value) => value.clone(),
            Instance::Prototype(factory) => factory(),
        }
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match self {
            Instance::Shared(_) => Lifecycle::Singleton,
            Instance::Prototype(_) => Lifecycle::Prototype,
        }
    }
}

/// Constructor as submitted by a registration.
pub(crate) enum Constructor {
    Once(AnyConstructor),
    Prototype(AnyFactory),
}

impl Constructor {
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match self {
            Constructor::Once(_) => Lifecycle::Singleton,
            Constructor::Prototype(_) => Lifecycle::Prototype,
        }
    }

    /// Runs the construction step. For prototypes this only wraps the factory.
    pub(crate) fn construct(self) -> Instance {
        match self {
            Constructor::Once(ctor) => Instance::Shared(ctor()),
            Constructor::Prototype(factory) => Instance::Prototype(factory),
        }
    }
}

/// A registration awaiting submission to a context.
pub(crate) struct Registration {
    pub(crate) key: Key,
    pub(crate) scope: String,
    pub(crate) ctor: Constructor,
    pub(crate) capabilities: Arc<CapabilityTable>,
    pub(crate) prerequisites: Vec<PendingRequest>,
}

impl Registration {
    pub(crate) fn new(key: Key, scope: impl Into<String>, ctor: Constructor) -> Self {
        Self {
            key,
            scope: scope.into(),
            ctor,
            capabilities: Arc::new(CapabilityTable::new()),
            prerequisites: Vec::new(),
        }
    }

    pub(crate) fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = Arc::new(capabilities);
        self
    }

    pub(crate) fn with_prerequisites(mut self, prerequisites: Vec<PendingRequest>) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}
