use ferrous_hooks_domain::{EngineConfig, HookError};
use rquickjs::Runtime;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct RuntimeLimits {
    pub memory_limit_bytes: usize,
    pub max_stack_bytes: usize,
}

impl From<&EngineConfig> for RuntimeLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            memory_limit_bytes: config.memory_limit_bytes,
            max_stack_bytes: config.max_stack_bytes,
        }
    }
}

/// Bounded set of QuickJS runtimes shared by every hook.
///
/// At most `size` runtimes exist; an acquirer waits up to `acquire_timeout`
/// for one to free up. Runtimes are created lazily and returned on drop of
/// the [`PooledRuntime`] guard.
pub struct RuntimePool {
    idle: Mutex<Vec<Runtime>>,
    permits: Arc<Semaphore>,
    limits: RuntimeLimits,
    acquire_timeout: Duration,
    size: usize,
    live: AtomicUsize,
}

impl RuntimePool {
    pub fn new(size: usize, limits: RuntimeLimits, acquire_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            idle: Mutex::new(Vec::with_capacity(size)),
            permits: Arc::new(Semaphore::new(size)),
            limits,
            acquire_timeout,
            size,
            live: AtomicUsize::new(0),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Arc<Self> {
        Self::new(
            config.pool_size,
            RuntimeLimits::from(config),
            config.acquire_timeout(),
        )
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runtimes not currently held by an invocation.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    pub async fn acquire(self: &Arc<Self>) -> Result<PooledRuntime, HookError> {
        let timeout_ms = self.acquire_timeout.as_millis() as u64;

        let permit = tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| HookError::PoolExhausted(timeout_ms))?
            .map_err(|_| HookError::PoolExhausted(timeout_ms))?;

        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let runtime = match reused {
            Some(runtime) => runtime,
            None => self.create()?,
        };

        Ok(PooledRuntime {
            runtime: Some(runtime),
            pool: Arc::clone(self),
            discard: false,
            _permit: permit,
        })
    }

    fn create(&self) -> Result<Runtime, HookError> {
        let runtime = Runtime::new()
            .map_err(|e| HookError::ScriptRuntime(format!("Failed to create runtime: {}", e)))?;
        runtime.set_memory_limit(self.limits.memory_limit_bytes);
        runtime.set_max_stack_size(self.limits.max_stack_bytes);

        let total = self.live.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(total, "Script runtime created");
        Ok(runtime)
    }

    fn release(&self, runtime: Runtime) {
        runtime.set_interrupt_handler(None);
        runtime.run_gc();
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(runtime);
    }
}

/// Exclusive handle on one runtime. Going out of scope returns the runtime
/// to its pool unless it was marked for discard.
pub struct PooledRuntime {
    runtime: Option<Runtime>,
    pool: Arc<RuntimePool>,
    discard: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledRuntime {
    pub fn runtime(&self) -> &Runtime {
        self.runtime
            .as_ref()
            .expect("runtime is only taken when the guard drops")
    }

    /// Drops the runtime instead of reusing it.
    pub fn discard(&mut self) {
        self.discard = true;
    }
}

impl Drop for PooledRuntime {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        if self.discard || std::thread::panicking() {
            self.pool.live.fetch_sub(1, Ordering::Relaxed);
            debug!("Script runtime discarded");
            return;
        }

        self.pool.release(runtime);
    }
}
