use crate::ports::HookHandler;
use ferrous_hooks_domain::{Action, HookQuery, Phase, ResourceRecord};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of running every pre-phase hook for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreOutcome {
    /// The question to resolve, possibly replaced by a `Question` action.
    pub query: HookQuery,
    /// Records supplied by `Reply` actions.
    pub answers: Vec<ResourceRecord>,
    /// Set when a hook asked to skip upstream resolution.
    pub done: bool,
}

/// Ordered list of hooks, applied the way the DNS pipeline folds their
/// actions into a single query.
pub struct HookChain {
    hooks: Vec<Arc<dyn HookHandler>>,
}

impl HookChain {
    pub fn new(hooks: Vec<Arc<dyn HookHandler>>) -> Self {
        Self { hooks }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn run_pre(&self, query: HookQuery, cancel: &CancellationToken) -> PreOutcome {
        let mut outcome = PreOutcome {
            query,
            answers: Vec::new(),
            done: false,
        };

        for hook in &self.hooks {
            if cancel.is_cancelled() {
                break;
            }

            let action = hook.invoke(Phase::Pre, &outcome.query, None, cancel).await;
            let (done, stop) = (action.is_done(), action.is_stop());

            match action {
                Action::Empty => continue,
                Action::Reply { records, .. } => outcome.answers.extend(records),
                Action::Question { query, .. } => {
                    debug!(
                        hook = %hook.name(),
                        from = %outcome.query.name,
                        to = %query.name,
                        "Question replaced by hook"
                    );
                    outcome.query = query;
                }
                // rejected by the interpreter in this phase
                Action::Rewrite { .. } => {}
            }

            outcome.done |= done;
            if stop {
                debug!(hook = %hook.name(), "Hook chain stopped");
                break;
            }
        }

        outcome
    }

    pub async fn run_post(
        &self,
        query: &HookQuery,
        mut answers: Vec<ResourceRecord>,
        cancel: &CancellationToken,
    ) -> Vec<ResourceRecord> {
        for hook in &self.hooks {
            if cancel.is_cancelled() {
                break;
            }

            let action = hook
                .invoke(Phase::Post, query, Some(answers.as_slice()), cancel)
                .await;
            let stop = action.is_stop();

            match action {
                Action::Empty => continue,
                Action::Reply { records, .. } => answers.extend(records),
                Action::Rewrite { records, .. } => answers = records,
                Action::Question { .. } => {}
            }

            if stop {
                debug!(hook = %hook.name(), "Hook chain stopped");
                break;
            }
        }

        answers
    }
}
