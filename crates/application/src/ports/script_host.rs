use async_trait::async_trait;
use ferrous_hooks_domain::{HookError, HookQuery, Phase, ResourceRecord};
use tokio_util::sync::CancellationToken;

/// Everything one script call may see. The answers are a copy owned by the
/// invocation, never the pipeline's records.
#[derive(Debug, Clone)]
pub struct HookInvocation {
    pub phase: Phase,
    pub query: HookQuery,
    pub answers: Vec<ResourceRecord>,
}

impl HookInvocation {
    pub fn pre(query: HookQuery) -> Self {
        Self {
            phase: Phase::Pre,
            query,
            answers: Vec::new(),
        }
    }

    pub fn post(query: HookQuery, answers: Vec<ResourceRecord>) -> Self {
        Self {
            phase: Phase::Post,
            query,
            answers,
        }
    }
}

#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Runs the entry script's `main` and returns whatever it returned,
    /// as JSON (`Null` for `undefined`).
    async fn run(
        &self,
        invocation: HookInvocation,
        cancel: CancellationToken,
    ) -> Result<serde_json::Value, HookError>;
}
