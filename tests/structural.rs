/// Structural (capability) requests
///
/// A structural request matches any instance whose registration declares the
/// requested capability set.

use ferrous_wire::{
    capability, key_of_capability, key_of_type, CapabilityDep, Context, DiError, Mode,
    DEFAULT_SCOPE,
};
use std::sync::Arc;
use std::thread;

trait Storage: Send + Sync {
    fn name(&self) -> &'static str;
}

trait Compress: Send + Sync {
    fn ratio(&self) -> u32;
}

capability!(dyn Storage, dyn Compress);

struct Disk;
impl Storage for Disk {
    fn name(&self) -> &'static str {
        "disk"
    }
}

struct Memory;
impl Storage for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }
}
impl Compress for Memory {
    fn ratio(&self) -> u32 {
        4
    }
}

fn register_disk(ctx: &Context, scope: &str) {
    ctx.bind::<Disk>()
        .in_scope(scope)
        .provides::<dyn Storage, _>(|d| d as Arc<dyn Storage>)
        .singleton(|| Disk);
}

fn register_memory(ctx: &Context, scope: &str) {
    ctx.bind::<Memory>()
        .in_scope(scope)
        .provides::<dyn Storage, _>(|m| m as Arc<dyn Storage>)
        .provides::<dyn Compress, _>(|m| m as Arc<dyn Compress>)
        .singleton(|| Memory);
}

#[test]
fn test_single_provider_is_returned() {
    let ctx = Context::new();
    register_disk(&ctx, DEFAULT_SCOPE);

    let storage = ctx.request_capability::<dyn Storage>().unwrap();
    assert_eq!(storage.name(), "disk");
}

#[test]
fn test_one_of_several_providers_is_returned() {
    let ctx = Context::new();
    register_disk(&ctx, "s");
    register_memory(&ctx, "s");
    // Both committed before asking
    ctx.request_in::<Disk>("s").unwrap();
    ctx.request_in::<Memory>("s").unwrap();

    let storage = ctx.request_capability_in::<dyn Storage>("s").unwrap();
    assert!(["disk", "memory"].contains(&storage.name()));
}

#[test]
fn test_capability_provided_by_one_instance_only() {
    let ctx = Context::new();
    register_disk(&ctx, DEFAULT_SCOPE);
    register_memory(&ctx, DEFAULT_SCOPE);

    let compress = ctx.request_capability::<dyn Compress>().unwrap();
    assert_eq!(compress.ratio(), 4);
}

#[test]
fn test_structural_request_before_registration() {
    let ctx = Context::new();
    let waiter = {
        let ctx = ctx.clone();
        thread::spawn(move || ctx.request_capability_in::<dyn Storage>("late").unwrap().name())
    };
    register_disk(&ctx, "late");
    assert_eq!(waiter.join().unwrap(), "disk");
}

#[test]
fn test_capability_not_visible_in_other_scope() {
    let ctx = Context::new();
    register_disk(&ctx, "a");
    ctx.request_in::<Disk>("a").unwrap();

    let pending = ctx
        .ask_structural(&key_of_capability::<dyn Storage>(), "b")
        .unwrap();
    assert!(!pending.is_fulfilled());
    assert_eq!(ctx.unresolved_requests()[0].mode, Mode::Structural);
}

#[test]
fn test_structural_prerequisite() {
    struct Archiver {
        backend: &'static str,
    }

    let ctx = Context::new();
    let storage = CapabilityDep::<dyn Storage>::new();
    ctx.bind::<Archiver>().after(&storage).singleton({
        let storage = storage.clone();
        move || Archiver {
            backend: storage.get().name(),
        }
    });
    register_memory(&ctx, DEFAULT_SCOPE);

    assert_eq!(ctx.request_required::<Archiver>().backend, "memory");
}

#[test]
fn test_structural_prerequisite_matches_committed_instance() {
    struct Reader {
        backend: &'static str,
    }

    let ctx = Context::new();
    register_disk(&ctx, DEFAULT_SCOPE);
    ctx.request_required::<Disk>();

    let storage = CapabilityDep::<dyn Storage>::new();
    ctx.bind::<Reader>().after(&storage).singleton({
        let storage = storage.clone();
        move || Reader {
            backend: storage.get().name(),
        }
    });

    assert_eq!(ctx.request_required::<Reader>().backend, "disk");
}

#[test]
fn test_structural_on_concrete_key_is_usage_error() {
    let ctx = Context::new();
    register_disk(&ctx, DEFAULT_SCOPE);

    let err = ctx
        .ask_structural(&key_of_type::<Disk>(), DEFAULT_SCOPE)
        .unwrap_err();
    assert!(matches!(err, DiError::Usage(_)));

    let err = ctx
        .declare_dependency(key_of_type::<Disk>(), DEFAULT_SCOPE, Mode::Structural)
        .unwrap_err();
    assert!(matches!(err, DiError::Usage(_)));
}

#[test]
fn test_exact_request_for_capability_key_waits_for_exact_registration() {
    let ctx = Context::new();
    register_disk(&ctx, DEFAULT_SCOPE);
    ctx.request_required::<Disk>();

    // Nothing is registered under the capability key itself
    let exact = ctx.ask(&key_of_capability::<dyn Storage>(), DEFAULT_SCOPE);
    assert!(!exact.is_fulfilled());
}

#[test]
fn test_commit_fulfills_one_structural_group() {
    struct Cache;
    impl Storage for Cache {
        fn name(&self) -> &'static str {
            "cache"
        }
    }
    impl Compress for Cache {
        fn ratio(&self) -> u32 {
            2
        }
    }

    let ctx = Context::new();
    let storage = ctx
        .ask_structural(&key_of_capability::<dyn Storage>(), "groups")
        .unwrap();
    let compress = ctx
        .ask_structural(&key_of_capability::<dyn Compress>(), "groups")
        .unwrap();

    // Provides both capabilities, but only the first waiting group is served
    register_memory(&ctx, "groups");
    ctx.request_in::<Memory>("groups").unwrap();
    assert!(storage.is_fulfilled());
    assert!(!compress.is_fulfilled());
    assert_eq!(ctx.unresolved_requests().len(), 1);

    // The next matching commit serves the remaining group
    ctx.bind::<Cache>()
        .in_scope("groups")
        .provides::<dyn Storage, _>(|c| c as Arc<dyn Storage>)
        .provides::<dyn Compress, _>(|c| c as Arc<dyn Compress>)
        .singleton(|| Cache);
    let ratio = compress
        .wait()
        .unwrap()
        .downcast::<Arc<dyn Compress>>()
        .unwrap()
        .ratio();
    assert_eq!(ratio, 2);
}
