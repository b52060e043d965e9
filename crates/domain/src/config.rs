mod engine;
mod errors;
mod hooks;
mod logging;
mod root;

pub use engine::EngineConfig;
pub use errors::ConfigError;
pub use hooks::HookConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
