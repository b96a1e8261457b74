//! Revision history model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of record a revision belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionObject {
    EventLocation,
    EventStatus,
    EventType,
    Event,
    DiaryEvent,
}

impl std::fmt::Display for RevisionObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLocation => write!(f, "event_location"),
            Self::EventStatus => write!(f, "event_status"),
            Self::EventType => write!(f, "event_type"),
            Self::Event => write!(f, "event"),
            Self::DiaryEvent => write!(f, "diary_event"),
        }
    }
}

impl std::str::FromStr for RevisionObject {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event_location" => Ok(Self::EventLocation),
            "event_status" => Ok(Self::EventStatus),
            "event_type" => Ok(Self::EventType),
            "event" => Ok(Self::Event),
            "diary_event" => Ok(Self::DiaryEvent),
            _ => Err(anyhow::anyhow!("Invalid revision object type: {}", s)),
        }
    }
}

/// What happened to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionAction {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl std::fmt::Display for RevisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
            Self::Restored => write!(f, "restored"),
        }
    }
}

impl std::str::FromStr for RevisionAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            "restored" => Ok(Self::Restored),
            _ => Err(anyhow::anyhow!("Invalid revision action: {}", s)),
        }
    }
}

/// JSON snapshot of a record taken after a write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: i64,
    pub object_type: RevisionObject,
    pub object_id: i64,
    pub action: RevisionAction,
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
