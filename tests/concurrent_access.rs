/// Concurrent access integration tests
///
/// These tests verify that one commit reaches every waiter, that singletons stay
/// single under contention, and that scopes do not interfere.

use crossbeam_utils::thread as scoped;
use ferrous_wire::{Context, Dep};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug)]
struct CounterService {
    thread_name: Option<String>,
}

impl CounterService {
    fn new() -> Self {
        Self {
            thread_name: thread::current().name().map(str::to_string),
        }
    }
}

#[test]
fn test_broadcast_to_many_waiters() {
    const WAITERS: usize = 32;
    let ctx = Context::new();
    let barrier = Barrier::new(WAITERS + 1);

    let results = scoped::scope(|s| {
        let handles: Vec<_> = (0..WAITERS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    ctx.request_required::<CounterService>()
                })
            })
            .collect();

        barrier.wait();
        ctx.register(CounterService::new);

        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    let first = &results[0];
    assert!(results.iter().all(|r| Arc::ptr_eq(r, first)));
    assert!(ctx.unresolved_requests().is_empty());
}

#[test]
fn test_constructor_runs_on_named_thread() {
    let ctx = Context::new();
    ctx.register(CounterService::new);

    let service = ctx.request_required::<CounterService>();
    let name = service.thread_name.as_deref().unwrap_or_default();
    assert!(name.starts_with("wire-ctor:"));
    assert!(name.contains("CounterService"));
}

#[test]
fn test_concurrent_registration_across_scopes() {
    const SCOPES: u32 = 16;
    let ctx = Context::new();

    scoped::scope(|s| {
        for i in 0..SCOPES {
            let ctx = &ctx;
            s.spawn(move |_| ctx.register_in(&format!("tenant-{}", i), move || i));
        }
    })
    .unwrap();

    for i in 0..SCOPES {
        assert_eq!(*ctx.request_in::<u32>(&format!("tenant-{}", i)).unwrap(), i);
    }
    assert_eq!(ctx.scopes().len(), SCOPES as usize);
}

#[test]
fn test_mixed_requesters_and_registrations() {
    struct Leaf(u32);
    struct Branch(u32);

    let ctx = Context::new();
    let constructed = AtomicU32::new(0);

    scoped::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                let branch = ctx.request_required::<Branch>();
                assert_eq!(branch.0, 10);
            });
        }

        let leaf = Dep::<Leaf>::new();
        ctx.bind::<Branch>().after(&leaf).singleton({
            let leaf = leaf.clone();
            move || Branch(leaf.get().0 * 10)
        });

        s.spawn(|_| {
            constructed.fetch_add(1, Ordering::SeqCst);
            ctx.register(|| Leaf(1));
        });
    })
    .unwrap();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(ctx.ensure_resolved().is_ok());
}

#[test]
fn test_singleton_identity_under_contention() {
    let ctx = Context::new();
    let created = Arc::new(AtomicU32::new(0));
    ctx.register({
        let created = created.clone();
        move || {
            created.fetch_add(1, Ordering::SeqCst);
            vec![0u8; 64]
        }
    });

    let all = scoped::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| s.spawn(|_| ctx.request_required::<Vec<u8>>()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    assert!(all.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(created.load(Ordering::SeqCst), 1);
}
