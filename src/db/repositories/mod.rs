//! Database repositories
//!
//! One repository per table, each a trait plus its sqlx implementation.

pub mod diary_event;
pub mod event;
pub mod event_location;
pub mod event_status;
pub mod event_type;
pub mod revision;

pub use diary_event::{DiaryEventRepository, SqlxDiaryEventRepository};
pub use event::{EventRepository, SqlxEventRepository};
pub use event_location::{EventLocationRepository, SqlxEventLocationRepository};
pub use event_status::{EventStatusRepository, SqlxEventStatusRepository};
pub use event_type::{EventTypeRepository, SqlxEventTypeRepository};
pub use revision::{RevisionRepository, SqlxRevisionRepository};
