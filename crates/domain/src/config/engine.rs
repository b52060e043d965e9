use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits shared by every script hook.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of script runtimes shared by all hooks.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,

    /// Upper bound for a single `fetch.get` call.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Wall-clock budget of one hook invocation, fetches included.
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,

    #[serde(default = "default_memory_limit_bytes")]
    pub memory_limit_bytes: usize,

    #[serde(default = "default_max_stack_bytes")]
    pub max_stack_bytes: usize,

    #[serde(default = "default_max_fetch_body_bytes")]
    pub max_fetch_body_bytes: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TTL applied to script records that do not carry one.
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,
}

impl EngineConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            execution_timeout_ms: default_execution_timeout_ms(),
            memory_limit_bytes: default_memory_limit_bytes(),
            max_stack_bytes: default_max_stack_bytes(),
            max_fetch_body_bytes: default_max_fetch_body_bytes(),
            user_agent: default_user_agent(),
            default_ttl: default_ttl(),
        }
    }
}

fn default_pool_size() -> usize {
    16
}

fn default_acquire_timeout_ms() -> u64 {
    1_000
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_execution_timeout_ms() -> u64 {
    10_000
}

fn default_memory_limit_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_max_stack_bytes() -> usize {
    1024 * 1024
}

fn default_max_fetch_body_bytes() -> usize {
    1024 * 1024
}

fn default_user_agent() -> String {
    concat!("Ferrous-Hooks/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_ttl() -> u32 {
    60
}
