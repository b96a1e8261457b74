//! Calendar event model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event
///
/// Events are never physically removed by editors; `deleted` marks them as
/// withdrawn and every public listing must exclude them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub event_type_id: i64,
    pub description: String,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub location_id: i64,
    pub notes: String,
    pub status_id: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        event_type_id: i64,
        location_id: i64,
        status_id: i64,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            event_type_id,
            description: String::new(),
            start_date,
            start_time: None,
            end_date: None,
            end_time: None,
            location_id,
            notes: String::new(),
            status_id,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    pub event_type_id: i64,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    pub location_id: i64,
    #[serde(default)]
    pub notes: String,
    pub status_id: i64,
}

/// Input for updating an event
///
/// Nullable columns use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventInput {
    pub event_type_id: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub end_time: Option<Option<NaiveTime>>,
    pub location_id: Option<i64>,
    pub notes: Option<String>,
    pub status_id: Option<i64>,
}

/// Parse a time of day entered in 24 hour format, e.g. `19:00` or `21:30:15`.
pub fn parse_time_24h(input: &str) -> anyhow::Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid time '{}': please enter in 24 hour format e.g. 19:00",
                input
            )
        })
}
