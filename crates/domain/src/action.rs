use super::{HookQuery, Phase, ResourceRecord};
use std::fmt;
use std::str::FromStr;

/// Action names a script can return, with the numeric value bound to each
/// name in the script context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Noop,
    Question,
    Reply,
    Rewrite,
}

impl ActionKind {
    pub fn code(&self) -> i64 {
        match self {
            ActionKind::Noop => 0,
            ActionKind::Question => 1,
            ActionKind::Reply => 2,
            ActionKind::Rewrite => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ActionKind::Noop),
            1 => Some(ActionKind::Question),
            2 => Some(ActionKind::Reply),
            3 => Some(ActionKind::Rewrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Noop => "Noop",
            ActionKind::Question => "Question",
            ActionKind::Reply => "Reply",
            ActionKind::Rewrite => "Rewrite",
        }
    }

    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::Noop,
            ActionKind::Question,
            ActionKind::Reply,
            ActionKind::Rewrite,
        ]
    }

    /// `Rewrite` only makes sense once answers exist, `Question` only before
    /// resolution starts.
    pub fn allowed_in(&self, phase: Phase) -> bool {
        match self {
            ActionKind::Noop | ActionKind::Reply => true,
            ActionKind::Question => phase == Phase::Pre,
            ActionKind::Rewrite => phase == Phase::Post,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Noop" => Ok(ActionKind::Noop),
            "Question" => Ok(ActionKind::Question),
            "Reply" => Ok(ActionKind::Reply),
            "Rewrite" => Ok(ActionKind::Rewrite),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// Outcome of one hook invocation, handed back to the DNS pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    /// Passthrough.
    #[default]
    Empty,

    /// Records supplied by the script are added to the answer.
    Reply {
        records: Vec<ResourceRecord>,
        done: bool,
        stop: bool,
    },

    /// Post phase only: the answer set is replaced.
    Rewrite {
        records: Vec<ResourceRecord>,
        done: bool,
        stop: bool,
    },

    /// Pre phase only: a different question is resolved instead.
    Question {
        query: HookQuery,
        done: bool,
        stop: bool,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Empty => ActionKind::Noop,
            Action::Reply { .. } => ActionKind::Reply,
            Action::Rewrite { .. } => ActionKind::Rewrite,
            Action::Question { .. } => ActionKind::Question,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Action::Empty)
    }

    pub fn is_done(&self) -> bool {
        match self {
            Action::Empty => false,
            Action::Reply { done, .. }
            | Action::Rewrite { done, .. }
            | Action::Question { done, .. } => *done,
        }
    }

    pub fn is_stop(&self) -> bool {
        match self {
            Action::Empty => false,
            Action::Reply { stop, .. }
            | Action::Rewrite { stop, .. }
            | Action::Question { stop, .. } => *stop,
        }
    }

    pub fn records(&self) -> &[ResourceRecord] {
        match self {
            Action::Reply { records, .. } | Action::Rewrite { records, .. } => records,
            _ => &[],
        }
    }
}
