mod hook_handler;
mod http_fetcher;
mod script_host;

pub use hook_handler::HookHandler;
pub use http_fetcher::{FetchResponse, HttpFetcher};
pub use script_host::{HookInvocation, ScriptHost};

// Re-export for convenience
pub use tokio_util::sync::CancellationToken;
