pub mod bindings;
pub mod host;
pub mod marshal;
pub mod module_loader;
pub mod runtime_pool;

pub use bindings::SCRIPT_LOG_TARGET;
pub use host::QuickJsScriptHost;
pub use module_loader::{CompiledScript, ModuleLoader};
pub use runtime_pool::{PooledRuntime, RuntimeLimits, RuntimePool};
