//! Per-scope queues of pending requests.

use std::collections::HashMap;

use crate::capability::CapabilityTable;
use crate::diagnostics::UnresolvedRequest;
use crate::key::Key;
use crate::request::{Mode, PendingRequest};

#[derive(Default)]
struct ScopeWaiters {
    exact: HashMap<Key, Vec<PendingRequest>>,
    // Groups kept in enqueue order; scanned front to back on commit
    structural: Vec<(Key, Vec<PendingRequest>)>,
}

/// Waiters grouped by scope, then by requested key.
#[derive(Default)]
pub(crate) struct WaiterRegistry {
    scopes: HashMap<String, ScopeWaiters>,
}

impl WaiterRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `request` to its group. Returns false if the group already holds
    /// a handle sharing its promise.
    pub(crate) fn enqueue(&mut self, request: PendingRequest) -> bool {
        let waiters = self.scopes.entry(request.scope().to_string()).or_default();
        let key = *request.key();
        let group = match request.mode() {
            Mode::Exact => waiters.exact.entry(key).or_default(),
            Mode::Structural => {
                let position = match waiters.structural.iter().position(|(k, _)| *k == key) {
                    Some(position) => position,
                    None => {
                        waiters.structural.push((key, Vec::new()));
                        waiters.structural.len() - 1
                    }
                };
                &mut waiters.structural[position].1
            }
        };
        if group.iter().any(|queued| queued.same_promise(&request)) {
            return false;
        }
        group.push(request);
        true
    }

    /// Removes and returns every exact waiter for (scope, key).
    pub(crate) fn take_exact(&mut self, scope: &str, key: &Key) -> Vec<PendingRequest> {
        self.scopes
            .get_mut(scope)
            .and_then(|waiters| waiters.exact.remove(key))
            .unwrap_or_default()
    }

    /// Removes and returns the first structural group in `scope` whose capability
    /// is provided by `capabilities`.
    pub(crate) fn take_first_structural(
        &mut self,
        scope: &str,
        capabilities: &CapabilityTable,
    ) -> Option<(Key, Vec<PendingRequest>)> {
        let waiters = self.scopes.get_mut(scope)?;
        let position = waiters
            .structural
            .iter()
            .position(|(capability, _)| capabilities.provides(capability))?;
        Some(waiters.structural.remove(position))
    }

    /// Every waiter not yet fulfilled.
    pub(crate) fn unresolved(&self) -> Vec<UnresolvedRequest> {
        let mut unresolved = Vec::new();
        for waiters in self.scopes.values() {
            let exact = waiters.exact.values().flatten();
            let structural = waiters.structural.iter().flat_map(|(_, group)| group);
            for request in exact.chain(structural) {
                if !request.is_fulfilled() {
                    unresolved.push(UnresolvedRequest::from(request));
                }
            }
        }
        unresolved
    }

    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn len(&self) -> usize {
        self.scopes
            .values()
            .map(|w| {
                w.exact.values().map(Vec::len).sum::<usize>()
                    + w.structural.iter().map(|(_, g)| g.len()).sum::<usize>()
            })
            .sum()
    }
}
