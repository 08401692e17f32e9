/// Tests for wiring modules
///
/// Each module wires its own part of the graph; the order in which modules are
/// applied must not matter.

use ferrous_wire::{Context, Dep, DiError, DiResult, WiringModule};
use std::sync::Arc;

// ===== Test Services =====

#[derive(Debug, Clone)]
struct Config {
    name: String,
    value: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "test-config".to_string(),
            value: 42,
        }
    }
}

#[derive(Debug)]
struct DatabaseService {
    config: Arc<Config>,
    connection_id: String,
}

impl DatabaseService {
    fn new(config: Arc<Config>) -> Self {
        Self {
            connection_id: format!("conn-{}", config.value),
            config,
        }
    }
}

#[derive(Debug)]
struct UserService {
    db: Arc<DatabaseService>,
}

// ===== Modules =====

struct ConfigModule;

impl WiringModule for ConfigModule {
    fn wire(self, ctx: &Context) -> DiResult<()> {
        ctx.register(Config::default);
        Ok(())
    }
}

struct DatabaseModule;

impl WiringModule for DatabaseModule {
    fn wire(self, ctx: &Context) -> DiResult<()> {
        let config = Dep::<Config>::new();
        ctx.bind::<DatabaseService>().after(&config).singleton({
            let config = config.clone();
            move || DatabaseService::new(config.get())
        });
        Ok(())
    }
}

struct UserModule;

impl WiringModule for UserModule {
    fn wire(self, ctx: &Context) -> DiResult<()> {
        let db = Dep::<DatabaseService>::new();
        ctx.bind::<UserService>().after(&db).singleton({
            let db = db.clone();
            move || UserService { db: db.get() }
        });
        Ok(())
    }
}

struct FailingModule;

impl WiringModule for FailingModule {
    fn wire(self, _ctx: &Context) -> DiResult<()> {
        Err(DiError::Config("missing database url".to_string()))
    }
}

// ===== Tests =====

#[test]
fn test_modules_in_dependency_order() -> DiResult<()> {
    let ctx = Context::new();
    ctx.add_module(ConfigModule)?
        .add_module(DatabaseModule)?
        .add_module(UserModule)?;

    let users = ctx.request::<UserService>()?;
    assert_eq!(users.db.connection_id, "conn-42");
    assert_eq!(users.db.config.name, "test-config");
    Ok(())
}

#[test]
fn test_modules_in_reverse_order() -> DiResult<()> {
    let ctx = Context::new();
    ctx.add_module(UserModule)?
        .add_module(DatabaseModule)?
        .add_module(ConfigModule)?;

    let users = ctx.request::<UserService>()?;
    let db = ctx.request::<DatabaseService>()?;
    assert!(Arc::ptr_eq(&users.db, &db));
    Ok(())
}

#[test]
fn test_modules_from_separate_threads() {
    let ctx = Context::new();
    let handles = vec![
        std::thread::spawn({
            let ctx = ctx.clone();
            move || ctx.add_module(UserModule).map(|_| ())
        }),
        std::thread::spawn({
            let ctx = ctx.clone();
            move || ctx.add_module(ConfigModule).map(|_| ())
        }),
        std::thread::spawn({
            let ctx = ctx.clone();
            move || ctx.add_module(DatabaseModule).map(|_| ())
        }),
    ];
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(ctx.request_required::<UserService>().db.connection_id, "conn-42");
}

#[test]
fn test_module_error_propagates() {
    let ctx = Context::new();
    let result = ctx.add_module(ConfigModule).and_then(|c| c.add_module(FailingModule));
    assert!(matches!(result, Err(DiError::Config(_))));

    // Registrations made before the failure stay in place
    assert_eq!(ctx.request_required::<Config>().value, 42);
}
