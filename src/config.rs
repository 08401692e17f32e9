//! Context configuration.
//!
//! [`WireConfig`] can be built in code, read from the environment, or (with the
//! `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Environment variable overriding [`WireConfig::thread_name_prefix`].
pub const ENV_THREAD_PREFIX: &str = "FERROUS_WIRE_THREAD_PREFIX";
/// Environment variable overriding [`WireConfig::stack_size`] (bytes).
pub const ENV_STACK_SIZE: &str = "FERROUS_WIRE_STACK_SIZE";
/// Environment variable overriding [`WireConfig::trace_events`] (`true`/`false`/`1`/`0`).
pub const ENV_TRACE_EVENTS: &str = "FERROUS_WIRE_TRACE";

/// Settings for a [`Context`](crate::Context).
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, WireConfig};
///
/// let config = WireConfig {
///     thread_name_prefix: "boot:".to_string(),
///     ..WireConfig::default()
/// };
/// let ctx = Context::builder().config(config).build();
/// assert_eq!(ctx.config().thread_name_prefix, "boot:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct WireConfig {
    /// Prefix for construction thread names; the type name is appended
    pub thread_name_prefix: String,
    /// Stack size for construction threads, platform default if `None`
    pub stack_size: Option<usize>,
    /// Install a [`TracingObserver`](crate::TracingObserver) when building the context
    pub trace_events: bool,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "wire-ctor:".to_string(),
            stack_size: None,
            trace_events: false,
        }
    }
}

impl WireConfig {
    /// Defaults overridden by any `FERROUS_WIRE_*` environment variables that are set.
    pub fn from_env() -> DiResult<Self> {
        let mut config = Self::default();
        if let Ok(prefix) = env::var(ENV_THREAD_PREFIX) {
            config.thread_name_prefix = prefix;
        }
        if let Ok(size) = env::var(ENV_STACK_SIZE) {
            let size = size
                .trim()
                .parse::<usize>()
                .map_err(|e| DiError::Config(format!("{}: {}", ENV_STACK_SIZE, e)))?;
            config.stack_size = Some(size);
        }
        if let Ok(flag) = env::var(ENV_TRACE_EVENTS) {
            config.trace_events = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(DiError::Config(format!(
                        "{}: expected a boolean, got {:?}",
                        ENV_TRACE_EVENTS, other
                    )))
                }
            };
        }
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))
    }
}
