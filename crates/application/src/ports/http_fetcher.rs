use async_trait::async_trait;
use ferrous_hooks_domain::HookError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Plain GET. Timeouts are enforced by the caller.
    async fn get(&self, url: &str) -> Result<FetchResponse, HookError>;
}
