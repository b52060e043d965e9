use async_trait::async_trait;
use ferrous_hooks_domain::{Action, HookQuery, Phase, ResourceRecord};
use tokio_util::sync::CancellationToken;

/// What the DNS pipeline calls, once per phase, for every hook it runs.
#[async_trait]
pub trait HookHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Never fails: script faults come back as `Action::Empty`.
    async fn invoke(
        &self,
        phase: Phase,
        query: &HookQuery,
        answers: Option<&[ResourceRecord]>,
        cancel: &CancellationToken,
    ) -> Action;
}
