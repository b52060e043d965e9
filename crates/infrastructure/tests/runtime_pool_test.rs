use ferrous_hooks_domain::HookError;
use ferrous_hooks_infrastructure::script::{RuntimeLimits, RuntimePool};
use std::time::Duration;

fn limits() -> RuntimeLimits {
    RuntimeLimits {
        memory_limit_bytes: 16 * 1024 * 1024,
        max_stack_bytes: 512 * 1024,
    }
}

#[tokio::test]
async fn test_runtimes_are_created_lazily_and_reused() {
    let pool = RuntimePool::new(2, limits(), Duration::from_millis(100));
    assert_eq!(pool.live_count(), 0);

    let first = pool.acquire().await.unwrap();
    assert_eq!(pool.available(), 1);
    drop(first);

    let _again = pool.acquire().await.unwrap();
    assert_eq!(pool.live_count(), 1);
    assert_eq!(pool.idle_count(), 0);
}

#[tokio::test]
async fn test_exhausted_pool_times_out() {
    let pool = RuntimePool::new(1, limits(), Duration::from_millis(50));
    let _held = pool.acquire().await.unwrap();

    let result = pool.acquire().await;

    assert!(matches!(result, Err(HookError::PoolExhausted(50))));
}

#[tokio::test]
async fn test_waiter_gets_released_runtime() {
    let pool = RuntimePool::new(1, limits(), Duration::from_millis(500));
    let held = pool.acquire().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(held);

    assert!(waiter.await.unwrap().is_ok());
    assert_eq!(pool.live_count(), 1);
}

#[tokio::test]
async fn test_discarded_runtime_is_not_reused() {
    let pool = RuntimePool::new(1, limits(), Duration::from_millis(100));

    let mut runtime = pool.acquire().await.unwrap();
    runtime.discard();
    drop(runtime);

    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.idle_count(), 0);
    assert_eq!(pool.available(), 1);
}
