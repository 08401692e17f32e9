//! Error types for the wiring context.

use std::fmt;

use crate::diagnostics::UnresolvedRequest;

/// Wiring errors
///
/// Represents the conditions that can be reported by a [`Context`](crate::Context)
/// at the call site. Missing registrations and failing constructors do not
/// surface here on their own: a request for something that never commits simply
/// keeps waiting. They become visible through
/// [`Context::ensure_resolved`](crate::Context::ensure_resolved).
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, DiError, DEFAULT_SCOPE, key_of_type};
///
/// let ctx = Context::new();
/// // A concrete type is not a capability set
/// match ctx.ask_structural(&key_of_type::<String>(), DEFAULT_SCOPE) {
///     Err(DiError::Usage(msg)) => assert!(msg.contains("alloc::string::String")),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// The call site used the API incorrectly (e.g. structural request on a concrete type)
    Usage(String),
    /// Delivered value could not be downcast to the expected type
    TypeMismatch(&'static str),
    /// Requests still waiting for a registration
    Unresolved(Vec<UnresolvedRequest>),
    /// A constructor panicked; nothing was committed for its key
    ConstructorFailed {
        /// Type name of the registration
        key: &'static str,
        /// Scope the registration targeted
        scope: String,
        /// Panic message, if it was a string
        message: String,
    },
    /// Configuration could not be loaded
    Config(String),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Usage(msg) => write!(f, "Usage error: {}", msg),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Unresolved(requests) => {
                let names: Vec<String> = requests.iter().map(|r| r.to_string()).collect();
                write!(f, "Unresolved requests: {}", names.join(", "))
            }
            DiError::ConstructorFailed { key, scope, message } => {
                write!(f, "Constructor for {} in scope {:?} panicked: {}", key, scope, message)
            }
            DiError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for wiring operations
///
/// A convenience alias for `Result<T, DiError>` used throughout ferrous-wire.
pub type DiResult<T> = Result<T, DiError>;
