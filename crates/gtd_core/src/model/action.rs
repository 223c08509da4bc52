//! Action and project records for the `/actions/` and `/projects/` endpoints.
//!
//! The backend workflow context owns these; no screen reads them yet, the
//! actions screen still projects done things instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ActionId = i64;
pub type ProjectId = i64;

/// Workflow status codes used by the backend action model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum ActionStatus {
    #[default]
    ToDo,
    InProgress,
    Completed,
    Delayed,
    Delegated,
    Planned,
    Someday,
    Removed,
    Other(i64),
}

impl From<i64> for ActionStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::ToDo,
            1 => Self::InProgress,
            2 => Self::Completed,
            3 => Self::Delayed,
            4 => Self::Delegated,
            5 => Self::Planned,
            6 => Self::Someday,
            7 => Self::Removed,
            other => Self::Other(other),
        }
    }
}

impl From<ActionStatus> for i64 {
    fn from(value: ActionStatus) -> Self {
        match value {
            ActionStatus::ToDo => 0,
            ActionStatus::InProgress => 1,
            ActionStatus::Completed => 2,
            ActionStatus::Delayed => 3,
            ActionStatus::Delegated => 4,
            ActionStatus::Planned => 5,
            ActionStatus::Someday => 6,
            ActionStatus::Removed => 7,
            ActionStatus::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Payload for `POST /actions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAction {
    pub title: String,
    pub description: String,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Payload for `POST /projects/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
}
