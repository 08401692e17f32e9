//! Internal implementation details.

pub(crate) mod scope_store;
pub(crate) mod waiters;

pub(crate) use scope_store::{ScopeStore, StoredEntry};
pub(crate) use waiters::WaiterRegistry;
