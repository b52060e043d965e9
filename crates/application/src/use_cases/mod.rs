pub mod hooks;

pub use hooks::{HookChain, HookDispatcher, PreOutcome};
