use ferrous_wire::{Context, Dep};
use serial_test::serial;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_TICKET: AtomicU32 = AtomicU32::new(0);

#[derive(Debug)]
struct Ticket(u32);

fn issue_ticket() -> Ticket {
    Ticket(NEXT_TICKET.fetch_add(1, Ordering::SeqCst) + 1)
}

#[test]
#[serial]
fn test_prototype_yields_increasing_values() {
    NEXT_TICKET.store(0, Ordering::SeqCst);
    let ctx = Context::new();
    ctx.register_prototype(issue_ticket);

    let first = ctx.request_required::<Ticket>();
    let second = ctx.request_required::<Ticket>();
    let third = ctx.request_required::<Ticket>();

    assert_eq!((first.0, second.0, third.0), (1, 2, 3));
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
#[serial]
fn test_prototype_factory_not_run_before_read() {
    NEXT_TICKET.store(0, Ordering::SeqCst);
    let ctx = Context::new();
    ctx.register_prototype_in("lazy", issue_ticket);

    // Committing a prototype stores the factory only
    let pending = ctx.ask(&ferrous_wire::key_of_type::<Ticket>(), "lazy");
    pending.wait().unwrap();
    let produced_by_wait = NEXT_TICKET.load(Ordering::SeqCst);
    assert_eq!(produced_by_wait, 1);

    ctx.request_in::<Ticket>("lazy").unwrap();
    assert_eq!(NEXT_TICKET.load(Ordering::SeqCst), 2);
}

#[test]
#[serial]
fn test_each_dependent_gets_its_own_prototype() {
    NEXT_TICKET.store(0, Ordering::SeqCst);

    struct Holder {
        ticket: Arc<Ticket>,
    }

    let ctx = Context::new();
    let ticket = Dep::<Ticket>::new();
    ctx.bind::<Holder>().after(&ticket).prototype({
        let ticket = ticket.clone();
        move || Holder {
            ticket: ticket.get(),
        }
    });
    ctx.register_prototype(issue_ticket);

    let a = ctx.request_required::<Holder>();
    let b = ctx.request_required::<Holder>();
    assert_ne!(a.ticket.0, b.ticket.0);
}

#[test]
fn test_singleton_runs_constructor_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let ctx = Context::new();
    ctx.register({
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            "shared".to_string()
        }
    });

    for _ in 0..10 {
        assert_eq!(*ctx.request_required::<String>(), "shared");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
