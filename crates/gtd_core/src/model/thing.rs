//! Thing domain model.
//!
//! # Responsibility
//! - Mirror the backend `Thing` record (`{id, title, description, status}`).
//! - Provide display labels used by the inbox and clarify screens.
//!
//! # Invariants
//! - Status codes 0/1/2 map to Pending/Someday/Done; any other code is kept
//!   verbatim as `Other` so one odd record never breaks a whole list.
//! - The client never caches things across views; every show refetches.

use serde::{Deserialize, Serialize};

/// Backend-assigned identifier.
pub type ThingId = i64;

/// Lifecycle state of a captured thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum ThingStatus {
    #[default]
    Pending,
    Someday,
    Done,
    Other(i64),
}

impl ThingStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Someday => 1,
            Self::Done => 2,
            Self::Other(code) => code,
        }
    }

    /// Short Korean label shown next to an item.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "대기",
            Self::Someday => "연기",
            Self::Done => "완료",
            Self::Other(_) => "알 수 없음",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Pending => "status-pending",
            Self::Someday => "status-someday",
            Self::Done => "status-done",
            Self::Other(_) => "",
        }
    }
}

impl From<i64> for ThingStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Someday,
            2 => Self::Done,
            other => Self::Other(other),
        }
    }
}

impl From<ThingStatus> for i64 {
    fn from(value: ThingStatus) -> Self {
        value.code()
    }
}

/// Remote thing as returned by `GET /things/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    pub id: ThingId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ThingStatus,
}

impl Thing {
    pub fn new(id: ThingId, title: impl Into<String>, status: ThingStatus) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == ThingStatus::Pending
    }
}

/// Payload for `POST /things/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThing {
    pub title: String,
    pub description: String,
    pub status: ThingStatus,
}

impl NewThing {
    /// New things always start as `Pending`.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: ThingStatus::Pending,
        }
    }

    pub fn validate(&self) -> Result<(), ThingValidationError> {
        if self.title.trim().is_empty() {
            return Err(ThingValidationError::EmptyTitle);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ThingValidationError {
    #[error("thing title cannot be empty")]
    EmptyTitle,
}

#[cfg(test)]
mod tests {
    use super::{NewThing, Thing, ThingStatus, ThingValidationError};

    #[test]
    fn status_decodes_from_backend_codes() {
        let things: Vec<Thing> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "a", "description": "", "status": 0},
                {"id": 2, "title": "b", "status": 1},
                {"id": 3, "title": "c", "description": "x", "status": 2},
                {"id": 4, "title": "d", "description": "", "status": 7}
            ]"#,
        )
        .unwrap();

        let statuses: Vec<ThingStatus> = things.iter().map(|thing| thing.status).collect();
        assert_eq!(
            statuses,
            vec![
                ThingStatus::Pending,
                ThingStatus::Someday,
                ThingStatus::Done,
                ThingStatus::Other(7)
            ]
        );
        assert_eq!(things[1].description, "");
        assert_eq!(ThingStatus::Other(7).label(), "알 수 없음");
    }

    #[test]
    fn new_thing_serializes_with_pending_code() {
        let payload = serde_json::to_value(NewThing::new("buy milk", "")).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({"title": "buy milk", "description": "", "status": 0})
        );
    }

    #[test]
    fn blank_title_fails_validation() {
        assert_eq!(
            NewThing::new("   ", "desc").validate(),
            Err(ThingValidationError::EmptyTitle)
        );
        assert!(NewThing::new("call bob", "").validate().is_ok());
    }
}
