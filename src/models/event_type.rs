//! Event type model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub id: i64,
    pub description: String,
    /// Events of this type are highlighted in the promoted listing
    pub promote: bool,
    pub routine: bool,
    /// CSS class used when rendering events of this type
    pub css_class_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventType {
    pub fn new(description: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            description,
            promote: false,
            routine: true,
            css_class_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventTypeInput {
    pub description: String,
    #[serde(default)]
    pub promote: bool,
    #[serde(default = "default_routine")]
    pub routine: bool,
    #[serde(default)]
    pub css_class_name: String,
}

impl Default for CreateEventTypeInput {
    fn default() -> Self {
        Self {
            description: String::new(),
            promote: false,
            routine: default_routine(),
            css_class_name: String::new(),
        }
    }
}

fn default_routine() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventTypeInput {
    pub description: Option<String>,
    pub promote: Option<bool>,
    pub routine: Option<bool>,
    pub css_class_name: Option<String>,
}
