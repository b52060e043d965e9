//! Ferrous Hooks Domain Layer
pub mod action;
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod hook_query;

pub use action::{Action, ActionKind};
pub use config::{CliOverrides, Config, ConfigError, EngineConfig, HookConfig, LoggingConfig};
pub use dns_record::{RecordData, RecordType, ResourceRecord};
pub use errors::HookError;
pub use hook_query::{is_fqdn, HookQuery, Phase};
