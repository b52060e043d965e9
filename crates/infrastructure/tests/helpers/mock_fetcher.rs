#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_hooks_application::ports::{FetchResponse, HttpFetcher};
use ferrous_hooks_domain::HookError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns a fixed response and remembers the requested URLs.
pub struct StaticFetcher {
    result: Result<FetchResponse, HookError>,
    urls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn ok(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(FetchResponse::new(status, body)),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(HookError::Fetch(message.to_string())),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetcher for StaticFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, HookError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.result.clone()
    }
}

/// Never answers.
pub struct PendingFetcher {
    started: AtomicUsize,
}

impl PendingFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: AtomicUsize::new(0),
        })
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpFetcher for PendingFetcher {
    async fn get(&self, _url: &str) -> Result<FetchResponse, HookError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        futures::future::pending().await
    }
}
