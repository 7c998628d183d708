use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ids::TaskId;

/// Who is performing an operation. Passed explicitly into every mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Created,
    Moved,
    Deleted,
}

impl ActivityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Moved => "moved",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "moved" => Ok(Self::Moved),
            "deleted" => Ok(Self::Deleted),
            other => Err(format!("unknown activity kind '{other}'")),
        }
    }
}

/// Advisory audit record. Never consulted for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub task_id: TaskId,
    pub actor: Actor,
    pub kind: ActivityKind,
    pub detail: String,
    pub created_at_us: i64,
}

impl ActivityRecord {
    pub fn now(task_id: TaskId, actor: &Actor, kind: ActivityKind, detail: impl Into<String>) -> Self {
        Self {
            task_id,
            actor: actor.clone(),
            kind,
            detail: detail.into(),
            created_at_us: super::now_us(),
        }
    }
}
