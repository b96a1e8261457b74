//! Services layer
//!
//! Validation, window queries, revision recording and cache invalidation on
//! top of the repositories.

pub mod diary_event;
pub mod event;
pub mod lookup;
pub mod revision;
pub mod window;

pub use diary_event::{DiaryEventService, DiaryEventServiceError};
pub use event::{today, EventService, EventServiceError, LISTING_CACHE_PREFIX};
pub use lookup::{EventLocationService, EventStatusService, EventTypeService, LookupServiceError};
pub use revision::RevisionService;
pub use window::{months_ahead, EventWindows};
