//! Diary event model
//!
//! A self-contained event record with free-text location. It shares no
//! tables with [`Event`](super::Event).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEvent {
    pub id: i64,
    pub event_date: NaiveDate,
    pub description: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEvent {
    pub fn new(event_date: NaiveDate, start_time: NaiveTime, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            event_date,
            description,
            start_time,
            end_time: None,
            location: String::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for DiaryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiaryEventInput {
    pub event_date: NaiveDate,
    pub description: String,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiaryEventInput {
    pub event_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<Option<NaiveTime>>,
    pub location: Option<String>,
    pub notes: Option<Option<String>>,
}
