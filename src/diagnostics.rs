//! Diagnostics: unresolved requests and failed constructions.
//!
//! Nothing in the wiring protocol times out, so a dependency that never gets
//! registered shows up only as a caller that never returns. These snapshots make
//! that state visible for end-of-wiring assertions.

use std::fmt;

use crate::context::Context;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::request::{Mode, PendingRequest};

/// Snapshot of a request still waiting for a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRequest {
    /// Requested key
    pub key: Key,
    /// Scope the request targets
    pub scope: String,
    /// Exact or structural
    pub mode: Mode,
}

impl From<&PendingRequest> for UnresolvedRequest {
    fn from(request: &PendingRequest) -> Self {
        Self {
            key: *request.key(),
            scope: request.scope().to_string(),
            mode: request.mode(),
        }
    }
}

impl fmt::Display for UnresolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in scope {:?} ({})", self.key.display_name(), self.scope, self.mode)
    }
}

/// Record of a constructor that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedConstruction {
    /// Key the registration targeted
    pub key: Key,
    /// Scope the registration targeted
    pub scope: String,
    /// Panic message, or a placeholder for non-string payloads
    pub message: String,
}

impl From<&FailedConstruction> for DiError {
    fn from(failure: &FailedConstruction) -> Self {
        DiError::ConstructorFailed {
            key: failure.key.display_name(),
            scope: failure.scope.clone(),
            message: failure.message.clone(),
        }
    }
}

impl Context {
    /// Every enqueued request (both modes, all scopes) not fulfilled yet.
    ///
    /// Taken under the context lock; a pure read.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_wire::{Context, Dep, Mode};
    ///
    /// struct Missing;
    /// struct Service;
    ///
    /// let ctx = Context::new();
    /// let missing = Dep::<Missing>::new();
    /// ctx.bind::<Service>().after(&missing).singleton(|| Service);
    ///
    /// let unresolved = ctx.unresolved_requests();
    /// assert_eq!(unresolved.len(), 1);
    /// assert_eq!(unresolved[0].mode, Mode::Exact);
    /// assert!(ctx.ensure_resolved().is_err());
    /// ```
    pub fn unresolved_requests(&self) -> Vec<UnresolvedRequest> {
        self.inner().state.lock().waiters.unresolved()
    }

    /// Constructors that panicked so far, in the order they failed.
    pub fn failed_constructions(&self) -> Vec<FailedConstruction> {
        self.inner().state.lock().failures.clone()
    }

    /// Checks that no constructor failed and nothing is left waiting.
    ///
    /// Returns the first failed construction as [`DiError::ConstructorFailed`],
    /// otherwise [`DiError::Unresolved`] with the full snapshot.
    pub fn ensure_resolved(&self) -> DiResult<()> {
        let state = self.inner().state.lock();
        if let Some(failure) = state.failures.first() {
            return Err(failure.into());
        }
        let unresolved = state.waiters.unresolved();
        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(DiError::Unresolved(unresolved))
        }
    }

    /// Human-readable dump of committed instances, waiters and failures.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let state = self.inner().state.lock();
        let mut s = String::new();
        s.push_str("=== Wiring Context Debug ===\n");
        s.push_str("Committed:\n");
        let mut rows: Vec<String> = state
            .store
            .iter()
            .map(|(scope, key, entry)| {
                format!(
                    "  [{:?}] {}: {} provides {:?}\n",
                    scope,
                    key.display_name(),
                    entry.instance.lifecycle(),
                    entry.capabilities.names()
                )
            })
            .collect();
        rows.sort();
        rows.iter().for_each(|row| s.push_str(row));
        s.push_str(&format!("Waiting ({}):\n", state.waiters.len()));
        for request in state.waiters.unresolved() {
            s.push_str(&format!("  {}\n", request));
        }
        for failure in &state.failures {
            s.push_str(&format!(
                "Failed: [{:?}] {}: {}\n",
                failure.scope,
                failure.key.display_name(),
                failure.message
            ));
        }
        s
    }
}
