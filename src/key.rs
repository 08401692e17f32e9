//! Type identity keys for the wiring context.

use std::any::TypeId;

use crate::capability::Capability;

/// Key identifying what is registered or requested.
///
/// Keys are scope-independent: the same key names the same type in every
/// scope. A key is either a concrete type or a capability set (a `dyn Trait`
/// marked with [`capability!`](crate::capability!)). Only capability keys may
/// be used for structural requests.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{capability, key_of_capability, key_of_type, Key};
/// use std::any::TypeId;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// capability!(dyn Greeter);
///
/// let concrete = key_of_type::<u32>();
/// assert!(!concrete.is_capability());
/// assert_eq!(concrete, Key::Type(TypeId::of::<u32>(), "u32"));
///
/// let cap = key_of_capability::<dyn Greeter>();
/// assert!(cap.is_capability());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Capability set key (`dyn Trait`) with TypeId and name for diagnostics
    Capability(TypeId, &'static str),
}

impl Key {
    /// Get the type or trait name for display
    ///
    /// Returns the `std::any::type_name` of the keyed type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Capability(_, name) => name,
        }
    }

    /// Returns true if this key denotes a capability set.
    #[inline]
    pub fn is_capability(&self) -> bool {
        matches!(self, Key::Capability(_, _))
    }

    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        match self {
            Key::Type(id, _) | Key::Capability(id, _) => *id,
        }
    }
}

// TypeId-only comparison; names are diagnostics only
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Capability(a, _), Key::Capability(b, _)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Capability(id, _) => {
                1u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Key for a concrete type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a capability set.
#[inline(always)]
pub fn key_of_capability<I: ?Sized + Capability>() -> Key {
    Key::Capability(TypeId::of::<I>(), std::any::type_name::<I>())
}
