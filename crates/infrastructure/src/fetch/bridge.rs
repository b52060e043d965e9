use ferrous_hooks_application::ports::{FetchResponse, HttpFetcher};
use ferrous_hooks_domain::HookError;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lets a script thread issue an HTTP GET as if it were synchronous.
///
/// The request itself runs on the tokio runtime behind `handle`; only the
/// calling thread is parked. Every call ends in one of: a 2xx response, an
/// error, a timeout after `timeout`, or cancellation.
pub struct FetchBridge {
    fetcher: Arc<dyn HttpFetcher>,
    handle: Handle,
    timeout: Duration,
}

impl FetchBridge {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, handle: Handle, timeout: Duration) -> Self {
        Self {
            fetcher,
            handle,
            timeout,
        }
    }

    /// Binds to the runtime the caller is running on.
    pub fn from_current(fetcher: Arc<dyn HttpFetcher>, timeout: Duration) -> Result<Self, HookError> {
        let handle = Handle::try_current()
            .map_err(|e| HookError::Fetch(format!("No tokio runtime for fetch bridge: {}", e)))?;
        Ok(Self::new(fetcher, handle, timeout))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn get(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, HookError> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HookError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, self.fetcher.get(url)) => outcome,
        };

        let response = outcome.map_err(|_| HookError::FetchTimeout {
            url: url.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        })??;

        if !response.is_success() {
            return Err(HookError::Fetch(format!("HTTP {} for {}", response.status, url)));
        }

        debug!(url = %url, status = response.status, bytes = response.body.len(), "Fetch completed");
        Ok(response)
    }

    /// Blocks the current thread until [`get`](Self::get) finishes.
    ///
    /// Must run outside async context, e.g. inside `spawn_blocking`.
    pub fn get_blocking(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, HookError> {
        self.handle.block_on(self.get(url, cancel))
    }
}
