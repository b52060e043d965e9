pub mod hook_chain;
pub mod invoke_hook;

pub use hook_chain::{HookChain, PreOutcome};
pub use invoke_hook::HookDispatcher;
