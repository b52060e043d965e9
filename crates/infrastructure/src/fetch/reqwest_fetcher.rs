use async_trait::async_trait;
use ferrous_hooks_application::ports::{FetchResponse, HttpFetcher};
use ferrous_hooks_domain::{EngineConfig, HookError};
use std::time::Duration;

/// Added to the bridge timeout for the client's own timeout, so a slow
/// server surfaces as the bridge's `FetchTimeout`.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(1);

pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, HookError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| HookError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, HookError> {
        Self::new(
            &config.user_agent,
            config.fetch_timeout() + CLIENT_TIMEOUT_MARGIN,
            config.max_fetch_body_bytes,
        )
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, HookError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HookError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status().as_u16();
        let mut body = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| HookError::Fetch(format!("Failed to read body from {}: {}", url, e)))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(HookError::Fetch(format!(
                    "Response from {} exceeds {} bytes",
                    url, self.max_body_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResponse::new(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }
}
