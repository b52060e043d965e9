use super::RecordType;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Post,
}

impl Phase {
    /// Value bound to the `pre` / `post` script constants.
    pub fn code(&self) -> i32 {
        match self {
            Phase::Pre => 0,
            Phase::Post => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl HookQuery {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
        }
    }

    pub fn is_fqdn(&self) -> bool {
        is_fqdn(&self.name)
    }
}

/// A fully-qualified name is non-empty, ends with a dot and has no empty labels.
pub fn is_fqdn(name: &str) -> bool {
    if name == "." {
        return true;
    }
    match name.strip_suffix('.') {
        Some(rest) => !rest.is_empty() && rest.split('.').all(|label| !label.is_empty()),
        None => false,
    }
}
