#![allow(dead_code)]
use ferrous_hooks_application::ports::HttpFetcher;
use ferrous_hooks_domain::{EngineConfig, HookConfig};
use ferrous_hooks_infrastructure::fetch::FetchBridge;
use ferrous_hooks_infrastructure::script::{QuickJsScriptHost, RuntimePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/hooks"))
}

/// Writes `files` (relative path, source) under a fresh temp dir.
pub fn script_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, source).unwrap();
    }
    dir
}

pub fn engine(pool_size: usize) -> EngineConfig {
    EngineConfig {
        pool_size,
        acquire_timeout_ms: 500,
        fetch_timeout_ms: 500,
        execution_timeout_ms: 2_000,
        ..EngineConfig::default()
    }
}

pub struct TestHost {
    pub host: QuickJsScriptHost,
    pub pool: Arc<RuntimePool>,
}

pub fn build_host(
    script: &Path,
    config: &EngineConfig,
    fetcher: Arc<dyn HttpFetcher>,
) -> TestHost {
    let pool = RuntimePool::from_config(config);
    build_host_on(script, config, fetcher, Arc::clone(&pool))
}

pub fn build_host_on(
    script: &Path,
    config: &EngineConfig,
    fetcher: Arc<dyn HttpFetcher>,
    pool: Arc<RuntimePool>,
) -> TestHost {
    let bridge = Arc::new(FetchBridge::from_current(fetcher, config.fetch_timeout()).unwrap());
    let hook = HookConfig::new("test", script);
    let host = QuickJsScriptHost::new(
        &hook,
        Arc::clone(&pool),
        bridge,
        config.execution_timeout(),
    )
    .unwrap();
    TestHost { host, pool }
}

/// Waits until every runtime is back in the pool.
pub async fn wait_for_pool(pool: &RuntimePool) -> bool {
    for _ in 0..100 {
        if pool.available() == pool.size() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
