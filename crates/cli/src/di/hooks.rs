use ferrous_hooks_application::ports::HookHandler;
use ferrous_hooks_application::use_cases::{HookChain, HookDispatcher};
use ferrous_hooks_domain::{Config, HookConfig, HookError};
use ferrous_hooks_infrastructure::fetch::{FetchBridge, ReqwestFetcher};
use ferrous_hooks_infrastructure::script::{QuickJsScriptHost, RuntimePool};
use std::sync::Arc;
use tracing::{error, info};

pub struct LoadedHook {
    pub name: String,
    pub host: Arc<QuickJsScriptHost>,
}

pub struct HookEngine {
    pub chain: HookChain,
    pub hooks: Vec<LoadedHook>,
    pub pool: Arc<RuntimePool>,
}

impl HookEngine {
    /// Must be called from inside the tokio runtime the hooks will run on.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let engine = &config.engine;

        let fetcher = Arc::new(ReqwestFetcher::from_config(engine)?);
        let bridge = Arc::new(FetchBridge::from_current(fetcher, engine.fetch_timeout())?);
        let pool = RuntimePool::from_config(engine);

        let mut hooks = Vec::new();
        let mut handlers: Vec<Arc<dyn HookHandler>> = Vec::new();

        for hook in config.enabled_hooks() {
            let host = Arc::new(Self::build_host(hook, &pool, &bridge, config)?);
            let dispatcher = HookDispatcher::new(hook.name.as_str(), host.clone(), engine.default_ttl);

            info!(
                hook = %hook.name,
                script = %host.entry().display(),
                module_root = %host.loader().root().display(),
                "Hook registered"
            );

            handlers.push(Arc::new(dispatcher));
            hooks.push(LoadedHook {
                name: hook.name.clone(),
                host,
            });
        }

        Ok(Self {
            chain: HookChain::new(handlers),
            hooks,
            pool,
        })
    }

    fn build_host(
        hook: &HookConfig,
        pool: &Arc<RuntimePool>,
        bridge: &Arc<FetchBridge>,
        config: &Config,
    ) -> anyhow::Result<QuickJsScriptHost> {
        QuickJsScriptHost::new(
            hook,
            Arc::clone(pool),
            Arc::clone(bridge),
            config.engine.execution_timeout(),
        )
        .map_err(|e| {
            error!(hook = %hook.name, error = %e, "Failed to set up hook");
            anyhow::anyhow!(e)
        })
    }

    /// Compiles every entry script on the blocking pool. Returns the number
    /// of hooks that failed.
    pub async fn preload(&self) -> usize {
        let mut failed = 0;

        for hook in &self.hooks {
            let host = Arc::clone(&hook.host);
            let loaded = tokio::task::spawn_blocking(move || host.preload())
                .await
                .unwrap_or_else(|e| {
                    Err(HookError::Compile {
                        path: hook.host.entry().display().to_string(),
                        message: format!("compile task failed: {}", e),
                    })
                });

            match loaded {
                Ok(script) => info!(
                    hook = %hook.name,
                    path = %script.path().display(),
                    modules = hook.host.loader().compiled_count(),
                    "Hook script compiled"
                ),
                Err(e) => {
                    failed += 1;
                    error!(hook = %hook.name, error = %e, "Hook script failed to compile");
                }
            }
        }

        failed
    }
}
