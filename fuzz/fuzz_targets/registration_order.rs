#![no_main]

use ferrous_wire::{Context, Dep};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

#[derive(Debug)]
struct Root(u8);

#[derive(Debug)]
struct Middle(Arc<Root>);

#[derive(Debug)]
struct Top(Arc<Middle>);

const SCOPES: [&str; 3] = ["", "alpha", "beta"];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let ctx = Context::new();
    let value = data[0];
    let mut registered = [[false; 3]; SCOPES.len()];

    // Each byte picks one of three registrations and a scope
    for byte in &data[1..] {
        let scope_index = (*byte as usize / 3) % SCOPES.len();
        let scope = SCOPES[scope_index];
        let which = *byte as usize % 3;
        if registered[scope_index][which] {
            continue;
        }
        registered[scope_index][which] = true;

        match which {
            0 => ctx.register_in(scope, move || Root(value)),
            1 => {
                let root = Dep::<Root>::in_scope(scope);
                ctx.bind::<Middle>().in_scope(scope).after(&root).singleton({
                    let root = root.clone();
                    move || Middle(root.get())
                });
            }
            _ => {
                let middle = Dep::<Middle>::in_scope(scope);
                ctx.bind::<Top>().in_scope(scope).after(&middle).singleton({
                    let middle = middle.clone();
                    move || Top(middle.get())
                });
            }
        }
    }

    for (scope_index, scope) in SCOPES.iter().enumerate() {
        if registered[scope_index].iter().all(|r| *r) {
            let top = ctx.request_in::<Top>(scope).unwrap();
            assert_eq!(top.0 .0 .0, value);
        }
    }
});
