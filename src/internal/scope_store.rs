//! Per-scope storage of committed instances.

use std::collections::HashMap;
use std::sync::Arc;

use crate::capability::CapabilityTable;
use crate::key::Key;
use crate::promise::Resolved;
use crate::registration::Instance;
use crate::request::Mode;

/// A committed instance together with the capabilities its registration declared.
pub(crate) struct StoredEntry {
    pub(crate) instance: Instance,
    pub(crate) capabilities: Arc<CapabilityTable>,
}

impl StoredEntry {
    fn resolve_as(&self, capability: &Key) -> Option<Resolved> {
        self.capabilities
            .view(capability)
            .map(|view| Resolved::structural(self.instance.clone(), view))
    }
}

/// Mapping scope -> key -> committed instance.
#[derive(Default)]
pub(crate) struct ScopeStore {
    scopes: HashMap<String, HashMap<Key, StoredEntry>>,
}

impl ScopeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates `scope` if it does not exist yet.
    pub(crate) fn touch(&mut self, scope: &str) {
        if !self.scopes.contains_key(scope) {
            self.scopes.insert(scope.to_string(), HashMap::new());
        }
    }

    /// Stores `entry`, replacing any previous commit for the same key.
    pub(crate) fn insert(&mut self, scope: &str, key: Key, entry: StoredEntry) -> Option<StoredEntry> {
        self.touch(scope);
        self.scopes
            .get_mut(scope)
            .and_then(|entries| entries.insert(key, entry))
    }

    pub(crate) fn get(&self, scope: &str, key: &Key) -> Option<&StoredEntry> {
        self.scopes.get(scope).and_then(|entries| entries.get(key))
    }

    /// First stored instance in `scope` providing `capability`. Scan order is unspecified.
    pub(crate) fn find_capability(&self, scope: &str, capability: &Key) -> Option<Resolved> {
        self.scopes
            .get(scope)?
            .values()
            .find_map(|entry| entry.resolve_as(capability))
    }

    /// Looks up what a request in `mode` would be fulfilled with right now.
    pub(crate) fn lookup(&self, scope: &str, key: &Key, mode: Mode) -> Option<Resolved> {
        match mode {
            Mode::Exact => self
                .get(scope, key)
                .map(|entry| Resolved::exact(entry.instance.clone())),
            Mode::Structural => self.find_capability(scope, key),
        }
    }

    pub(crate) fn scope_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.scopes.keys().cloned().collect();
        names.sort();
        names
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Key, &StoredEntry)> {
        self.scopes.iter().flat_map(|(scope, entries)| {
            entries.iter().map(move |(key, entry)| (scope.as_str(), key, entry))
        })
    }
}
