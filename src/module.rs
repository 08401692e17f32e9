//! Wiring modules.
//!
//! Groups of registrations packaged as one unit, so independent parts of a
//! program can wire themselves into a shared context in any order.

use crate::{Context, DiResult};

/// A unit of registrations applied to a [`Context`].
///
/// # Example
///
/// ```rust
/// use ferrous_wire::{Context, Dep, DiResult, WiringModule};
///
/// struct Pool { size: usize }
/// struct Repository { pool_size: usize }
///
/// struct StorageModule;
/// impl WiringModule for StorageModule {
///     fn wire(self, ctx: &Context) -> DiResult<()> {
///         ctx.register_in("storage", || Pool { size: 8 });
///         Ok(())
///     }
/// }
///
/// struct RepositoryModule;
/// impl WiringModule for RepositoryModule {
///     fn wire(self, ctx: &Context) -> DiResult<()> {
///         let pool = Dep::<Pool>::in_scope("storage");
///         ctx.bind::<Repository>().after(&pool).singleton({
///             let pool = pool.clone();
///             move || Repository { pool_size: pool.get().size }
///         });
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let ctx = Context::new();
/// ctx.add_module(RepositoryModule)?.add_module(StorageModule)?;
/// assert_eq!(ctx.request::<Repository>()?.pool_size, 8);
/// # Ok(())
/// # }
/// ```
pub trait WiringModule {
    /// Submits this module's registrations.
    fn wire(self, ctx: &Context) -> DiResult<()>;
}

impl Context {
    /// Applies a module and returns the context for chaining.
    pub fn add_module<M: WiringModule>(&self, module: M) -> DiResult<&Self> {
        module.wire(self)?;
        Ok(self)
    }
}
