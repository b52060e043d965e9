use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One script hook in the chain. Hooks run in the order they are declared.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HookConfig {
    pub name: String,

    /// Entry script exposing `main(phase, answers, type, name)`.
    pub script: PathBuf,

    /// Directory `require` may load from. Defaults to the entry script's directory.
    #[serde(default)]
    pub module_root: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl HookConfig {
    pub fn new(name: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            module_root: None,
            enabled: true,
        }
    }

    pub fn resolved_module_root(&self) -> PathBuf {
        match &self.module_root {
            Some(root) => root.clone(),
            None => self
                .script
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn default_true() -> bool {
    true
}
