#![cfg(feature = "async")]

use ferrous_wire::{
    capability, key_of_type, Context, Dep, TokioSpawner, DEFAULT_SCOPE,
};
use std::sync::Arc;
use std::time::Duration;

trait Transport: Send + Sync {
    fn endpoint(&self) -> String;
}
capability!(dyn Transport);

struct Http {
    host: Arc<String>,
}
impl Transport for Http {
    fn endpoint(&self) -> String {
        format!("http://{}", self.host)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_await_before_registration() {
    let ctx = Context::builder()
        .spawner(TokioSpawner::current().unwrap())
        .build();

    let waiter = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.request_async::<String>(DEFAULT_SCOPE).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    ctx.register(|| "ready".to_string());

    let value = waiter.await.unwrap().unwrap();
    assert_eq!(*value, "ready");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_constructors_on_tokio_spawner() {
    let ctx = Context::builder()
        .spawner(TokioSpawner::current().unwrap())
        .build();

    let host = Dep::<String>::in_scope("net");
    ctx.bind::<Http>()
        .in_scope("net")
        .after(&host)
        .provides::<dyn Transport, _>(|h| h as Arc<dyn Transport>)
        .singleton({
            let host = host.clone();
            move || Http { host: host.get() }
        });
    ctx.register_in("net", || "localhost".to_string());

    let transport = ctx
        .request_capability_async::<dyn Transport>("net")
        .await
        .unwrap();
    assert_eq!(transport.endpoint(), "http://localhost");
}

#[tokio::test]
async fn test_pending_request_wait_async() {
    let ctx = Context::new();
    let pending = ctx.ask(&key_of_type::<u32>(), DEFAULT_SCOPE);
    ctx.register(|| 8u32);

    let value = pending.wait_async().await.unwrap();
    assert_eq!(*value.downcast::<u32>().unwrap(), 8);

    // Replays without waiting
    let again = pending.wait_async().await.unwrap();
    assert_eq!(*again.downcast::<u32>().unwrap(), 8);
}

#[tokio::test]
async fn test_current_spawner_outside_runtime_fails() {
    let result = std::thread::spawn(TokioSpawner::current).join().unwrap();
    assert!(result.is_err());
}
