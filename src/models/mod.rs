//! Data models
//!
//! Database entities for the calendar and their create/update inputs.

mod diary_event;
mod event;
mod event_location;
mod event_status;
mod event_type;
mod revision;

pub use diary_event::{CreateDiaryEventInput, DiaryEvent, UpdateDiaryEventInput};
pub use event::{parse_time_24h, CreateEventInput, Event, UpdateEventInput};
pub use event_location::{CreateEventLocationInput, EventLocation, UpdateEventLocationInput};
pub use event_status::{CreateEventStatusInput, EventStatus, UpdateEventStatusInput};
pub use event_type::{CreateEventTypeInput, EventType, UpdateEventTypeInput};
pub use revision::{Revision, RevisionAction, RevisionObject};
