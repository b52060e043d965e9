use crate::ports::{HookHandler, HookInvocation, ScriptHost};
use crate::services::ActionInterpreter;
use async_trait::async_trait;
use ferrous_hooks_domain::{Action, HookError, HookQuery, Phase, ResourceRecord};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Runs one configured hook script and turns whatever happens into an
/// [`Action`]. A hook whose script cannot be loaded is disabled and
/// skipped from then on.
pub struct HookDispatcher {
    name: Arc<str>,
    host: Arc<dyn ScriptHost>,
    interpreter: ActionInterpreter,
    disabled: AtomicBool,
}

impl HookDispatcher {
    pub fn new(name: impl Into<Arc<str>>, host: Arc<dyn ScriptHost>, default_ttl: u32) -> Self {
        Self {
            name: name.into(),
            host,
            interpreter: ActionInterpreter::new(default_ttl),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    pub async fn invoke(
        &self,
        phase: Phase,
        query: &HookQuery,
        answers: Option<&[ResourceRecord]>,
    ) -> Action {
        self.invoke_with_cancel(phase, query, answers, CancellationToken::new())
            .await
    }

    pub async fn invoke_with_cancel(
        &self,
        phase: Phase,
        query: &HookQuery,
        answers: Option<&[ResourceRecord]>,
        cancel: CancellationToken,
    ) -> Action {
        if self.is_disabled() {
            return Action::Empty;
        }

        let invocation = match phase {
            Phase::Pre => HookInvocation::pre(query.clone()),
            Phase::Post => HookInvocation::post(query.clone(), answers.unwrap_or_default().to_vec()),
        };

        match self.host.run(invocation, cancel).await {
            Ok(raw) => self.interpreter.interpret_or_empty(phase, query, &raw),
            Err(e) => {
                self.record_failure(phase, query, &e);
                Action::Empty
            }
        }
    }

    fn record_failure(&self, phase: Phase, query: &HookQuery, e: &HookError) {
        if e.disables_hook() {
            self.disabled.store(true, Ordering::Release);
            error!(
                hook = %self.name,
                phase = %phase,
                qname = %query.name,
                error = %e,
                "Hook script failed to load, disabling hook"
            );
            return;
        }

        match e {
            HookError::Cancelled => debug!(
                hook = %self.name,
                phase = %phase,
                qname = %query.name,
                "Hook invocation cancelled"
            ),
            _ => warn!(
                hook = %self.name,
                phase = %phase,
                qname = %query.name,
                error = %e,
                "Hook script failed"
            ),
        }
    }
}

#[async_trait]
impl HookHandler for HookDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        phase: Phase,
        query: &HookQuery,
        answers: Option<&[ResourceRecord]>,
        cancel: &CancellationToken,
    ) -> Action {
        self.invoke_with_cancel(phase, query, answers, cancel.clone())
            .await
    }
}
