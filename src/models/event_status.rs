//! Event status model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Editorial status of an event. Only statuses with `publish` set make
/// their events publicly visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStatus {
    pub id: i64,
    pub description: String,
    pub publish: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventStatus {
    pub fn new(description: String, publish: bool) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            description,
            publish,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEventStatusInput {
    pub description: String,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventStatusInput {
    pub description: Option<String>,
    pub publish: Option<bool>,
}
