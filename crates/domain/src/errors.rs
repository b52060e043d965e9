use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("Failed to compile {path}: {message}")]
    Compile { path: String, message: String },

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Script {0} does not expose a main function")]
    MissingEntryPoint(String),

    #[error("Script runtime error: {0}")]
    ScriptRuntime(String),

    #[error("Malformed action: {0}")]
    MalformedAction(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Fetch of {url} timed out after {timeout_ms}ms")]
    FetchTimeout { url: String, timeout_ms: u64 },

    #[error("Hook invocation cancelled")]
    Cancelled,

    #[error("Script exceeded its execution budget of {0}ms")]
    ExecutionTimeout(u64),

    #[error("No script runtime available within {0}ms")]
    PoolExhausted(u64),
}

impl HookError {
    /// Loader-level failures disable the hook that produced them.
    pub fn disables_hook(&self) -> bool {
        matches!(
            self,
            HookError::Compile { .. } | HookError::ModuleNotFound(_) | HookError::MissingEntryPoint(_)
        )
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        HookError::MalformedAction(message.into())
    }
}
