//! # ferrous-wire
//!
//! Order-independent, concurrent dependency wiring for Rust.
//!
//! Components register constructors and declare what they depend on in any
//! order, from any thread. Each constructor runs on its own task and blocks on
//! its prerequisites only when it reads them; a request that arrives before its
//! registration simply waits for it.
//!
//! ## Features
//!
//! - **Order independence**: consumers may be registered before their producers
//! - **Named scopes**: independent namespaces inside one context, created on first use
//! - **Singleton and prototype lifecycles**: one shared instance, or a fresh one per read
//! - **Structural requests**: ask for "something that provides `dyn Trait`" instead of a concrete type
//! - **Diagnostics**: snapshot what is still waiting instead of hanging silently
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{Context, Dep};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let ctx = Context::new();
//!
//! // Register the consumer first; it waits for the database
//! let db = Dep::<Database>::new();
//! ctx.bind::<UserService>().after(&db).singleton({
//!     let db = db.clone();
//!     move || UserService { db: db.get() }
//! });
//!
//! ctx.register(|| Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//!
//! let users = ctx.request_required::<UserService>();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifecycles
//!
//! - **Singleton**: constructed once; every reader shares the instance
//! - **Prototype**: the factory runs again on every read
//!
//! ## Scopes
//!
//! ```rust
//! use ferrous_wire::Context;
//!
//! let ctx = Context::new();
//! ctx.register_in("primary", || "db-1".to_string());
//! ctx.register_in("replica", || "db-2".to_string());
//!
//! assert_eq!(*ctx.request_in::<String>("primary").unwrap(), "db-1");
//! assert_eq!(*ctx.request_in::<String>("replica").unwrap(), "db-2");
//! ```
//!
//! ## Structural Requests
//!
//! ```rust
//! use ferrous_wire::{capability, Context};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//! capability!(dyn Logger);
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! let ctx = Context::new();
//! ctx.bind::<ConsoleLogger>()
//!     .provides::<dyn Logger, _>(|l| l as Arc<dyn Logger>)
//!     .singleton(|| ConsoleLogger);
//!
//! let logger = ctx.request_capability::<dyn Logger>().unwrap();
//! assert_eq!(logger.log("hi"), "[LOG] hi");
//! ```

pub mod capability;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod module;
pub mod observer;
pub mod registration;
pub mod request;
pub mod spawner;

// Internal modules
mod internal;
mod promise;

/// Name of the scope used when none is given.
pub const DEFAULT_SCOPE: &str = "";

pub use capability::Capability;
pub use config::WireConfig;
pub use context::{Binding, Context, ContextBuilder};
pub use diagnostics::{FailedConstruction, UnresolvedRequest};
pub use error::{DiError, DiResult};
pub use key::{key_of_capability, key_of_type, Key};
pub use lifecycle::Lifecycle;
pub use module::WiringModule;
pub use observer::{CountingObserver, TracingObserver, WireObserver};
pub use registration::{AnyArc, AnyConstructor, AnyFactory};
pub use request::{AsPendingRequest, CapabilityDep, Dep, Mode, PendingRequest};
pub use spawner::{Spawner, Task, ThreadSpawner};

#[cfg(feature = "async")]
pub use spawner::TokioSpawner;
