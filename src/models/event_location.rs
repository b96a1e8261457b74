//! Event location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an event takes place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    pub id: i64,
    pub description: String,
    pub url: Option<String>,
    /// Link to a map of the venue
    pub url_map: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventLocation {
    pub fn new(description: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            description,
            url: None,
            url_map: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for EventLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Input for creating a location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEventLocationInput {
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_map: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Input for updating a location
///
/// `url` and `url_map` use `Some(None)` to clear the stored link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventLocationInput {
    pub description: Option<String>,
    pub url: Option<Option<String>>,
    pub url_map: Option<Option<String>>,
    pub notes: Option<String>,
}
