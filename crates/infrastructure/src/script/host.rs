use super::bindings::{self, InvocationScope};
use super::marshal;
use super::module_loader::{CompiledScript, ModuleLoader};
use super::runtime_pool::{PooledRuntime, RuntimePool};
use crate::fetch::FetchBridge;
use async_trait::async_trait;
use ferrous_hooks_application::ports::{HookInvocation, ScriptHost};
use ferrous_hooks_domain::{HookConfig, HookError, Phase};
use rquickjs::{CatchResultExt, Context, Ctx, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs one hook's entry script on pooled QuickJS runtimes.
///
/// Each call gets a fresh context on a pooled runtime, so nothing a script
/// leaves in its globals is visible to the next call. The script itself
/// runs on tokio's blocking pool, which is where `fetch.get` parks.
pub struct QuickJsScriptHost {
    hook: Arc<str>,
    entry: PathBuf,
    loader: Arc<ModuleLoader>,
    pool: Arc<RuntimePool>,
    fetch: Arc<FetchBridge>,
    execution_timeout: Duration,
}

impl QuickJsScriptHost {
    pub fn new(
        hook: &HookConfig,
        pool: Arc<RuntimePool>,
        fetch: Arc<FetchBridge>,
        execution_timeout: Duration,
    ) -> Result<Self, HookError> {
        let loader = Arc::new(ModuleLoader::new(hook.resolved_module_root())?);
        let entry = loader.locate(&hook.script)?;

        Ok(Self {
            hook: Arc::from(hook.name.as_str()),
            entry,
            loader,
            pool,
            fetch,
            execution_timeout,
        })
    }

    pub fn entry(&self) -> &Path {
        &self.entry
    }

    pub fn loader(&self) -> &Arc<ModuleLoader> {
        &self.loader
    }

    /// Compiles the entry script ahead of the first query. Blocks while
    /// compiling, so async callers should go through `spawn_blocking`.
    pub fn preload(&self) -> Result<Arc<CompiledScript>, HookError> {
        self.loader.load(&self.entry)
    }
}

#[async_trait]
impl ScriptHost for QuickJsScriptHost {
    async fn run(
        &self,
        invocation: HookInvocation,
        cancel: CancellationToken,
    ) -> Result<serde_json::Value, HookError> {
        // Cancelled when this future finishes or is dropped, which
        // interrupts a script still running on the blocking pool.
        let execution = cancel.child_token();
        let _interrupt = execution.clone().drop_guard();

        let runtime = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HookError::Cancelled),
            acquired = self.pool.acquire() => acquired?,
        };

        let job = Job {
            scope: InvocationScope::new(
                Arc::clone(&self.hook),
                Arc::clone(&self.loader),
                Arc::clone(&self.fetch),
                execution.clone(),
            ),
            entry: self.entry.clone(),
            invocation,
            caller: cancel.clone(),
            timeout_ms: self.execution_timeout.as_millis() as u64,
        };

        let mut task = tokio::task::spawn_blocking(move || job.execute(runtime));

        tokio::select! {
            biased;
            joined = &mut task => joined.map_err(|e| {
                HookError::ScriptRuntime(format!("Script thread failed: {}", e))
            })?,
            _ = cancel.cancelled() => Err(HookError::Cancelled),
            _ = tokio::time::sleep(self.execution_timeout) => {
                debug!(hook = %self.hook, "Interrupting script after execution timeout");
                Err(HookError::ExecutionTimeout(self.execution_timeout.as_millis() as u64))
            }
        }
    }
}

struct Job {
    scope: InvocationScope,
    entry: PathBuf,
    invocation: HookInvocation,
    caller: CancellationToken,
    timeout_ms: u64,
}

enum Outcome {
    Returned(Option<String>),
    MissingMain,
}

impl Job {
    fn execute(self, mut runtime: PooledRuntime) -> Result<serde_json::Value, HookError> {
        // compiles on the first call only
        self.scope.loader.load(&self.entry)?;

        let interrupt = self.scope.cancel.clone();
        runtime
            .runtime()
            .set_interrupt_handler(Some(Box::new(move || interrupt.is_cancelled())));

        let result = self.evaluate(&runtime);

        if let Err(HookError::ScriptRuntime(message)) = &result {
            if message.contains("out of memory") {
                runtime.discard();
            }
        }

        result
    }

    fn evaluate(&self, runtime: &PooledRuntime) -> Result<serde_json::Value, HookError> {
        let context = Context::full(runtime.runtime())
            .map_err(|e| HookError::ScriptRuntime(format!("Failed to create context: {}", e)))?;

        let outcome = context.with(|ctx| {
            self.call_main(&ctx)
                .catch(&ctx)
                .map_err(|caught| caught.to_string())
        });

        match outcome {
            Ok(Outcome::Returned(text)) => marshal::parse_result(text),
            Ok(Outcome::MissingMain) => Err(HookError::MissingEntryPoint(
                self.entry.display().to_string(),
            )),
            Err(message) => Err(self.failure(message)),
        }
    }

    fn call_main<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Outcome> {
        let bindings = bindings::install(ctx, &self.scope)?;

        let dir = self.entry.parent().unwrap_or(Path::new("/"));
        let require = bindings.require_from(dir)?;
        let exports: Value = require.call((self.entry.to_string_lossy().into_owned(),))?;

        let main = match exports.as_object() {
            Some(exports) => exports.get::<_, Value>("main")?.into_function(),
            None => None,
        };
        let Some(main) = main else {
            return Ok(Outcome::MissingMain);
        };

        let query = &self.invocation.query;
        let answers = match self.invocation.phase {
            Phase::Pre => Value::new_null(ctx.clone()),
            Phase::Post => {
                let plain = marshal::json_to_js(ctx, &marshal::answers_to_json(&self.invocation.answers))?;
                bindings.answers(plain)?
            }
        };

        let returned: Value = main.call((
            self.invocation.phase.code(),
            answers,
            query.record_type.to_u16(),
            query.name.to_string(),
        ))?;

        Ok(Outcome::Returned(marshal::js_to_json(ctx, returned)?))
    }

    fn failure(&self, message: String) -> HookError {
        if let Some(load_failure) = self.scope.take_load_failure() {
            return load_failure;
        }
        if self.scope.cancel.is_cancelled() {
            return if self.caller.is_cancelled() {
                HookError::Cancelled
            } else {
                HookError::ExecutionTimeout(self.timeout_ms)
            };
        }
        HookError::ScriptRuntime(message)
    }
}
