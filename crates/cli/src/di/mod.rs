mod hooks;

pub use hooks::HookEngine;
