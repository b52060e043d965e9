#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_hooks_application::ports::{HookHandler, HookInvocation, ScriptHost};
use ferrous_hooks_domain::{Action, HookError, HookQuery, Phase, ResourceRecord};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Script host that replays a fixed result and records what it was given.
pub struct MockScriptHost {
    result: Mutex<Result<Value, HookError>>,
    calls: AtomicUsize,
    invocations: Mutex<Vec<HookInvocation>>,
}

impl MockScriptHost {
    pub fn returning(value: Value) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Ok(value)),
            calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: HookError) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
        })
    }

    pub fn set_result(&self, result: Result<Value, HookError>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_invocation(&self) -> Option<HookInvocation> {
        self.invocations.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScriptHost for MockScriptHost {
    async fn run(
        &self,
        invocation: HookInvocation,
        cancel: CancellationToken,
    ) -> Result<Value, HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(invocation);
        if cancel.is_cancelled() {
            return Err(HookError::Cancelled);
        }
        self.result.lock().unwrap().clone()
    }
}

/// Hook that hands out queued actions, then `Action::Empty`.
pub struct MockHookHandler {
    name: String,
    actions: Mutex<VecDeque<Action>>,
    seen: Mutex<Vec<(Phase, HookQuery, Vec<ResourceRecord>)>>,
}

impl MockHookHandler {
    pub fn new(name: &str, actions: Vec<Action>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            actions: Mutex::new(actions.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<(Phase, HookQuery, Vec<ResourceRecord>)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl HookHandler for MockHookHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        phase: Phase,
        query: &HookQuery,
        answers: Option<&[ResourceRecord]>,
        _cancel: &CancellationToken,
    ) -> Action {
        self.seen.lock().unwrap().push((
            phase,
            query.clone(),
            answers.map(|a| a.to_vec()).unwrap_or_default(),
        ));
        self.actions.lock().unwrap().pop_front().unwrap_or_default()
    }
}
