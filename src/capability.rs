//! Capability sets and per-registration capability tables.
//!
//! A capability set is a trait object type (`dyn Trait`) that has been marked
//! with [`capability!`](crate::capability!). Registrations declare which
//! capability sets their concrete type provides through
//! [`Binding::provides`](crate::Binding::provides); structural requests are
//! answered by looking the requested capability up in those tables.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::key::Key;
use crate::registration::AnyArc;

/// Marker for types that denote a capability set.
///
/// Implemented for `dyn Trait` types through the [`capability!`](crate::capability!)
/// macro. Only marked types can be requested structurally through the typed API.
pub trait Capability: 'static {}

/// Marks one or more trait object types as capability sets.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::capability;
///
/// trait Render: Send + Sync {
///     fn render(&self) -> String;
/// }
/// trait Measure: Send + Sync {
///     fn width(&self) -> usize;
/// }
///
/// capability!(dyn Render, dyn Measure);
/// ```
#[macro_export]
macro_rules! capability {
    ($($t:ty),+ $(,)?) => {
        $(impl $crate::Capability for $t {})+
    };
}

/// Converts a stored concrete instance into a capability view.
///
/// The view is stored as `Arc<Arc<dyn I>>` erased to `AnyArc`.
pub(crate) type Upcast = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;

/// Capability sets provided by one registration.
#[derive(Clone, Default)]
pub(crate) struct CapabilityTable {
    entries: HashMap<TypeId, (&'static str, Upcast)>,
}

impl CapabilityTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declares that instances of `T` provide `I` through `upcast`.
    pub(crate) fn insert<T, I, F>(&mut self, upcast: F)
    where
        T: Send + Sync + 'static,
        I: ?Sized + Capability + Send + Sync,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let view = move |any: &AnyArc| -> Option<AnyArc> {
            let concrete = any.clone().downcast::<T>().ok()?;
            Some(Arc::new(upcast(concrete)) as AnyArc)
        };
        self.entries
            .insert(TypeId::of::<I>(), (std::any::type_name::<I>(), Arc::new(view)));
    }

    /// Returns the view for `capability`, if provided.
    pub(crate) fn view(&self, capability: &Key) -> Option<Upcast> {
        if !capability.is_capability() {
            return None;
        }
        self.entries
            .get(&capability.type_id())
            .map(|(_, view)| view.clone())
    }

    #[inline]
    pub(crate) fn provides(&self, capability: &Key) -> bool {
        capability.is_capability() && self.entries.contains_key(&capability.type_id())
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }
}
