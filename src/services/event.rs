//! Event service
//!
//! Answers the two public listings and handles editor writes:
//! - `published`: visible events from today up to the published horizon
//! - `promoted`: highlighted events after the published horizon up to the
//!   promoted horizon
//!
//! Listings are cached per reference date. Any write drops every cached
//! listing.

use crate::cache::Cache;
use crate::config::CalendarConfig;
use crate::db::repositories::{
    EventLocationRepository, EventRepository, EventStatusRepository, EventTypeRepository,
};
use crate::models::{CreateEventInput, Event, RevisionAction, RevisionObject, UpdateEventInput};
use crate::services::revision::RevisionService;
use crate::services::window::EventWindows;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Key prefix shared by every cached listing
pub const LISTING_CACHE_PREFIX: &str = "events:";

pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Error types for event service operations
#[derive(Debug, thiserror::Error)]
pub enum EventServiceError {
    /// Event not found
    #[error("Event not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Current calendar date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub struct EventService {
    repo: Arc<dyn EventRepository>,
    types: Arc<dyn EventTypeRepository>,
    locations: Arc<dyn EventLocationRepository>,
    statuses: Arc<dyn EventStatusRepository>,
    revisions: Arc<RevisionService>,
    cache: Arc<Cache>,
    calendar: CalendarConfig,
}

impl EventService {
    /// Create a new event service
    ///
    /// # Arguments
    /// * `repo` - Event repository
    /// * `types`, `locations`, `statuses` - Lookup repositories used to check references
    /// * `revisions` - Revision recorder
    /// * `cache` - Listing cache
    /// * `calendar` - Window widths
    pub fn new(
        repo: Arc<dyn EventRepository>,
        types: Arc<dyn EventTypeRepository>,
        locations: Arc<dyn EventLocationRepository>,
        statuses: Arc<dyn EventStatusRepository>,
        revisions: Arc<RevisionService>,
        cache: Arc<Cache>,
        calendar: CalendarConfig,
    ) -> Self {
        Self {
            repo,
            types,
            locations,
            statuses,
            revisions,
            cache,
            calendar,
        }
    }

    pub fn windows_for(&self, today: NaiveDate) -> EventWindows {
        EventWindows::for_date(today, &self.calendar)
    }

    /// Published events as of the current UTC date
    pub async fn published(&self) -> Result<Vec<Event>, EventServiceError> {
        self.published_on(today()).await
    }

    /// Promoted events as of the current UTC date
    pub async fn promoted(&self) -> Result<Vec<Event>, EventServiceError> {
        self.promoted_on(today()).await
    }

    /// Events with a publishing status, not deleted, starting between
    /// `today` and the published horizon inclusive
    pub async fn published_on(&self, today: NaiveDate) -> Result<Vec<Event>, EventServiceError> {
        let key = format!("{}published:{}", LISTING_CACHE_PREFIX, today);
        if let Some(events) = self.cached(&key).await {
            return Ok(events);
        }

        let generation = self.cache.generation();
        let windows = self.windows_for(today);
        let events = self
            .repo
            .list_published(windows.today, windows.published_until)
            .await
            .context("Failed to list published events")?;

        self.store(&key, &events, generation).await;
        Ok(events)
    }

    /// Events with a publishing status and a promoting type, not deleted,
    /// starting after the published horizon up to the promoted horizon
    /// inclusive
    pub async fn promoted_on(&self, today: NaiveDate) -> Result<Vec<Event>, EventServiceError> {
        let key = format!("{}promoted:{}", LISTING_CACHE_PREFIX, today);
        if let Some(events) = self.cached(&key).await {
            return Ok(events);
        }

        let generation = self.cache.generation();
        let windows = self.windows_for(today);
        let events = self
            .repo
            .list_promoted(windows.published_until, windows.promoted_until)
            .await
            .context("Failed to list promoted events")?;

        self.store(&key, &events, generation).await;
        Ok(events)
    }

    /// Cache failures degrade to a database read
    async fn cached(&self, key: &str) -> Option<Vec<Event>> {
        match self.cache.get::<Vec<Event>>(key).await {
            Ok(Some(events)) => {
                tracing::debug!("Cache hit: {}", key);
                Some(events)
            }
            Ok(None) => {
                tracing::debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Skipped when a write invalidated the listings while they were loading
    async fn store(&self, key: &str, events: &[Event], generation: u64) {
        match self.cache.set_if_current(key, &events, generation).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Discarding listing invalidated during load: {}", key),
            Err(e) => tracing::warn!("Failed to cache {}: {}", key, e),
        }
    }

    fn invalidate_listings(&self) -> Result<(), EventServiceError> {
        self.cache
            .delete_prefix(LISTING_CACHE_PREFIX)
            .context("Failed to invalidate event listings")?;
        Ok(())
    }

    /// Create an event
    ///
    /// # Errors
    /// - `ValidationError` if the description is too long or a referenced
    ///   type, location or status does not exist
    pub async fn create(&self, input: CreateEventInput) -> Result<Event, EventServiceError> {
        let description = validate_description(&input.description)?;
        self.check_references(input.event_type_id, input.location_id, input.status_id)
            .await?;

        let mut event = Event::new(
            input.event_type_id,
            input.location_id,
            input.status_id,
            input.start_date,
        );
        event.description = description;
        event.start_time = input.start_time;
        event.end_date = input.end_date;
        event.end_time = input.end_time;
        event.notes = input.notes;

        let created = self
            .repo
            .create(&event)
            .await
            .context("Failed to create event")?;
        self.invalidate_listings()?;
        self.revisions
            .record(RevisionObject::Event, created.id, RevisionAction::Created, &created)
            .await?;

        tracing::info!("Created event {} on {}", created.id, created.start_date);
        Ok(created)
    }

    /// Get an event by ID, including soft-deleted ones
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Event>, EventServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get event")
            .map_err(Into::into)
    }

    /// All events that are not soft-deleted, in start order
    pub async fn list(&self) -> Result<Vec<Event>, EventServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list events")
            .map_err(Into::into)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateEventInput,
    ) -> Result<Event, EventServiceError> {
        let mut event = self.require(id).await?;

        if let Some(description) = input.description {
            event.description = validate_description(&description)?;
        }
        if let Some(event_type_id) = input.event_type_id {
            event.event_type_id = event_type_id;
        }
        if let Some(location_id) = input.location_id {
            event.location_id = location_id;
        }
        if let Some(status_id) = input.status_id {
            event.status_id = status_id;
        }
        if let Some(start_date) = input.start_date {
            event.start_date = start_date;
        }
        if let Some(start_time) = input.start_time {
            event.start_time = start_time;
        }
        if let Some(end_date) = input.end_date {
            event.end_date = end_date;
        }
        if let Some(end_time) = input.end_time {
            event.end_time = end_time;
        }
        if let Some(notes) = input.notes {
            event.notes = notes;
        }
        self.check_references(event.event_type_id, event.location_id, event.status_id)
            .await?;

        let updated = self
            .repo
            .update(&event)
            .await
            .context("Failed to update event")?;
        self.invalidate_listings()?;
        self.revisions
            .record(RevisionObject::Event, id, RevisionAction::Updated, &updated)
            .await?;

        tracing::info!("Updated event {}", id);
        Ok(updated)
    }

    /// Mark an event as deleted; it stays retrievable by ID
    ///
    /// Deleting an already deleted event changes nothing.
    pub async fn soft_delete(&self, id: i64) -> Result<Event, EventServiceError> {
        self.set_deleted(id, true, RevisionAction::Deleted).await
    }

    /// Clear the deleted flag
    pub async fn restore(&self, id: i64) -> Result<Event, EventServiceError> {
        self.set_deleted(id, false, RevisionAction::Restored).await
    }

    async fn set_deleted(
        &self,
        id: i64,
        deleted: bool,
        action: RevisionAction,
    ) -> Result<Event, EventServiceError> {
        let event = self.require(id).await?;
        if event.deleted == deleted {
            return Ok(event);
        }

        self.repo
            .set_deleted(id, deleted)
            .await
            .context("Failed to change event deleted flag")?;
        let event = self.require(id).await?;
        self.invalidate_listings()?;
        self.revisions
            .record(RevisionObject::Event, id, action, &event)
            .await?;

        tracing::info!("Event {} {}", id, action);
        Ok(event)
    }

    /// Remove an event row permanently
    pub async fn delete(&self, id: i64) -> Result<(), EventServiceError> {
        let event = self.require(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete event")?;
        self.invalidate_listings()?;
        self.revisions
            .record(RevisionObject::Event, id, RevisionAction::Deleted, &event)
            .await?;

        tracing::info!("Permanently deleted event {}", id);
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<Event, EventServiceError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| EventServiceError::NotFound(format!("Event with ID {} not found", id)))
    }

    async fn check_references(
        &self,
        event_type_id: i64,
        location_id: i64,
        status_id: i64,
    ) -> Result<(), EventServiceError> {
        if self
            .types
            .get_by_id(event_type_id)
            .await
            .context("Failed to check event type")?
            .is_none()
        {
            return Err(EventServiceError::ValidationError(format!(
                "Event type {} does not exist",
                event_type_id
            )));
        }
        if self
            .locations
            .get_by_id(location_id)
            .await
            .context("Failed to check event location")?
            .is_none()
        {
            return Err(EventServiceError::ValidationError(format!(
                "Event location {} does not exist",
                location_id
            )));
        }
        if self
            .statuses
            .get_by_id(status_id)
            .await
            .context("Failed to check event status")?
            .is_none()
        {
            return Err(EventServiceError::ValidationError(format!(
                "Event status {} does not exist",
                status_id
            )));
        }
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<String, EventServiceError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(EventServiceError::ValidationError(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        RevisionRepository, SqlxEventLocationRepository, SqlxEventRepository,
        SqlxEventStatusRepository, SqlxEventTypeRepository, SqlxRevisionRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{EventLocation, EventStatus, EventType, Revision};
    use async_trait::async_trait;
    use chrono::NaiveTime;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Fixture {
        service: Arc<EventService>,
        revisions: Arc<RevisionService>,
        concert: i64,
        festival: i64,
        hall: i64,
        confirmed: i64,
        draft: i64,
    }

    async fn setup() -> Fixture {
        setup_with(SqlxEventRepository::boxed, SqlxRevisionRepository::boxed).await
    }

    async fn setup_with<E, R>(events: E, revision_repo: R) -> Fixture
    where
        E: FnOnce(DynDatabasePool) -> Arc<dyn EventRepository>,
        R: FnOnce(DynDatabasePool) -> Arc<dyn RevisionRepository>,
    {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");

        let types = SqlxEventTypeRepository::boxed(pool.clone());
        let locations = SqlxEventLocationRepository::boxed(pool.clone());
        let statuses = SqlxEventStatusRepository::boxed(pool.clone());

        let concert = types.create(&EventType::new("Concert".to_string())).await.unwrap().id;
        let mut festival = EventType::new("Festival".to_string());
        festival.promote = true;
        let festival = types.create(&festival).await.unwrap().id;
        let hall = locations
            .create(&EventLocation::new("Hall".to_string()))
            .await
            .unwrap()
            .id;
        let confirmed = statuses
            .create(&EventStatus::new("Confirmed".to_string(), true))
            .await
            .unwrap()
            .id;
        let draft = statuses
            .create(&EventStatus::new("Draft".to_string(), false))
            .await
            .unwrap()
            .id;

        let revisions = Arc::new(RevisionService::new(revision_repo(pool.clone())));
        let service = Arc::new(EventService::new(
            events(pool),
            types,
            locations,
            statuses,
            revisions.clone(),
            Arc::new(Cache::new(100, Duration::from_secs(60))),
            CalendarConfig::default(),
        ));

        Fixture {
            service,
            revisions,
            concert,
            festival,
            hall,
            confirmed,
            draft,
        }
    }

    /// Holds the first published listing between its query and its return
    struct GatedEventRepository {
        inner: Arc<dyn EventRepository>,
        armed: AtomicBool,
        queried: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl EventRepository for GatedEventRepository {
        async fn create(&self, event: &Event) -> anyhow::Result<Event> {
            self.inner.create(event).await
        }

        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<Event>> {
            self.inner.get_by_id(id).await
        }

        async fn list(&self) -> anyhow::Result<Vec<Event>> {
            self.inner.list().await
        }

        async fn list_published(
            &self,
            from: NaiveDate,
            until: NaiveDate,
        ) -> anyhow::Result<Vec<Event>> {
            let events = self.inner.list_published(from, until).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.queried.notify_one();
                self.release.notified().await;
            }
            events
        }

        async fn list_promoted(
            &self,
            after: NaiveDate,
            until: NaiveDate,
        ) -> anyhow::Result<Vec<Event>> {
            self.inner.list_promoted(after, until).await
        }

        async fn update(&self, event: &Event) -> anyhow::Result<Event> {
            self.inner.update(event).await
        }

        async fn set_deleted(&self, id: i64, deleted: bool) -> anyhow::Result<bool> {
            self.inner.set_deleted(id, deleted).await
        }

        async fn delete(&self, id: i64) -> anyhow::Result<bool> {
            self.inner.delete(id).await
        }
    }

    struct UnavailableRevisionRepository;

    #[async_trait]
    impl RevisionRepository for UnavailableRevisionRepository {
        async fn create(
            &self,
            _object_type: RevisionObject,
            _object_id: i64,
            _action: RevisionAction,
            _snapshot: &serde_json::Value,
        ) -> anyhow::Result<Revision> {
            anyhow::bail!("revision store unavailable")
        }

        async fn list_for(
            &self,
            _object_type: RevisionObject,
            _object_id: i64,
        ) -> anyhow::Result<Vec<Revision>> {
            Ok(Vec::new())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reference() -> NaiveDate {
        date(2026, 10, 14)
    }

    impl Fixture {
        fn input(
            &self,
            event_type: i64,
            status: i64,
            start: NaiveDate,
            name: &str,
        ) -> CreateEventInput {
            CreateEventInput {
                event_type_id: event_type,
                description: name.to_string(),
                start_date: start,
                start_time: None,
                end_date: None,
                end_time: None,
                location_id: self.hall,
                notes: String::new(),
                status_id: status,
            }
        }

        async fn add(&self, event_type: i64, status: i64, start: NaiveDate, name: &str) -> Event {
            self.service
                .create(self.input(event_type, status, start, name))
                .await
                .expect("Failed to create event")
        }

        async fn published_names(&self) -> Vec<String> {
            names(self.service.published_on(reference()).await.unwrap())
        }

        async fn promoted_names(&self) -> Vec<String> {
            names(self.service.promoted_on(reference()).await.unwrap())
        }
    }

    fn names(events: Vec<Event>) -> Vec<String> {
        events.into_iter().map(|e| e.description).collect()
    }

    #[tokio::test]
    async fn test_unpublished_status_in_neither_listing() {
        let f = setup().await;
        f.add(f.festival, f.draft, date(2026, 10, 20), "Draft soon").await;
        f.add(f.festival, f.draft, date(2027, 3, 1), "Draft later").await;

        assert!(f.published_names().await.is_empty());
        assert!(f.promoted_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_in_neither_listing() {
        let f = setup().await;
        let soon = f.add(f.festival, f.confirmed, date(2026, 10, 20), "Soon").await;
        let later = f.add(f.festival, f.confirmed, date(2027, 3, 1), "Later").await;
        f.service.soft_delete(soon.id).await.unwrap();
        f.service.soft_delete(later.id).await.unwrap();

        assert!(f.published_names().await.is_empty());
        assert!(f.promoted_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_published_horizon_belongs_to_published_only() {
        let f = setup().await;
        f.add(f.festival, f.confirmed, date(2026, 12, 14), "Horizon").await;

        assert_eq!(f.published_names().await, vec!["Horizon"]);
        assert!(f.promoted_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_day_after_published_horizon_is_promoted_only() {
        let f = setup().await;
        f.add(f.festival, f.confirmed, date(2026, 12, 15), "Next day").await;

        assert!(f.published_names().await.is_empty());
        assert_eq!(f.promoted_names().await, vec!["Next day"]);
    }

    #[tokio::test]
    async fn test_promoted_horizon_inclusive() {
        let f = setup().await;
        f.add(f.festival, f.confirmed, date(2027, 6, 14), "Last day").await;
        f.add(f.festival, f.confirmed, date(2027, 6, 15), "Too far").await;

        assert_eq!(f.promoted_names().await, vec!["Last day"]);
        assert!(f.published_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_promoted_requires_promoting_type() {
        let f = setup().await;
        f.add(f.concert, f.confirmed, date(2027, 1, 10), "Plain concert").await;
        f.add(f.concert, f.confirmed, date(2026, 11, 1), "Near concert").await;

        assert!(f.promoted_names().await.is_empty());
        assert_eq!(f.published_names().await, vec!["Near concert"]);
    }

    #[tokio::test]
    async fn test_past_events_excluded() {
        let f = setup().await;
        f.add(f.concert, f.confirmed, date(2026, 10, 13), "Yesterday").await;
        f.add(f.concert, f.confirmed, date(2026, 10, 14), "Today").await;

        assert_eq!(f.published_names().await, vec!["Today"]);
    }

    #[tokio::test]
    async fn test_published_ordered_by_start() {
        let f = setup().await;
        let mut evening = f.input(f.concert, f.confirmed, date(2026, 11, 2), "Evening");
        evening.start_time = Some(NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        f.service.create(evening).await.unwrap();
        let mut morning = f.input(f.concert, f.confirmed, date(2026, 11, 2), "Morning");
        morning.start_time = Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        f.service.create(morning).await.unwrap();
        f.add(f.concert, f.confirmed, date(2026, 11, 2), "All day").await;
        f.add(f.concert, f.confirmed, date(2026, 10, 30), "Earlier").await;

        assert_eq!(
            f.published_names().await,
            vec!["Earlier", "All day", "Morning", "Evening"]
        );
    }

    #[tokio::test]
    async fn test_month_end_reference_date() {
        let f = setup().await;
        f.add(f.festival, f.confirmed, date(2026, 10, 31), "Halloween").await;
        f.add(f.festival, f.confirmed, date(2026, 11, 1), "After").await;

        let published = names(f.service.published_on(date(2026, 8, 31)).await.unwrap());
        assert_eq!(published, vec!["Halloween"]);
        let promoted = names(f.service.promoted_on(date(2026, 8, 31)).await.unwrap());
        assert_eq!(promoted, vec!["After"]);
    }

    #[tokio::test]
    async fn test_create_invalidates_cached_listing() {
        let f = setup().await;
        assert!(f.published_names().await.is_empty());

        f.add(f.concert, f.confirmed, date(2026, 11, 1), "Fresh").await;
        assert_eq!(f.published_names().await, vec!["Fresh"]);
    }

    #[tokio::test]
    async fn test_write_during_listing_load_does_not_leave_stale_cache() {
        let queried = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gate = (queried.clone(), release.clone());
        let f = setup_with(
            move |pool| {
                Arc::new(GatedEventRepository {
                    inner: SqlxEventRepository::boxed(pool),
                    armed: AtomicBool::new(true),
                    queried: gate.0,
                    release: gate.1,
                }) as Arc<dyn EventRepository>
            },
            SqlxRevisionRepository::boxed,
        )
        .await;

        let service = f.service.clone();
        let reader = tokio::spawn(async move { service.published_on(reference()).await });

        queried.notified().await;
        f.add(f.concert, f.confirmed, date(2026, 11, 1), "New").await;
        release.notify_one();

        let loaded_before_write = reader.await.unwrap().unwrap();
        assert!(loaded_before_write.is_empty());
        assert_eq!(f.published_names().await, vec!["New"]);
    }

    #[tokio::test]
    async fn test_failed_revision_still_invalidates_listings() {
        let f = setup_with(SqlxEventRepository::boxed, |_| {
            Arc::new(UnavailableRevisionRepository) as Arc<dyn RevisionRepository>
        })
        .await;
        assert!(f.published_names().await.is_empty());

        let result = f
            .service
            .create(f.input(f.concert, f.confirmed, date(2026, 11, 1), "Unrecorded"))
            .await;
        assert!(matches!(result, Err(EventServiceError::InternalError(_))));
        assert_eq!(f.published_names().await, vec!["Unrecorded"]);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_references() {
        let f = setup().await;
        let result = f
            .service
            .create(f.input(999, f.confirmed, date(2026, 11, 1), "Orphan"))
            .await;
        assert!(matches!(result, Err(EventServiceError::ValidationError(_))));

        let mut input = f.input(f.concert, f.confirmed, date(2026, 11, 1), "Nowhere");
        input.location_id = 999;
        assert!(matches!(
            f.service.create(input).await,
            Err(EventServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_long_description() {
        let f = setup().await;
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let result = f
            .service
            .create(f.input(f.concert, f.confirmed, date(2026, 11, 1), &long))
            .await;
        assert!(matches!(result, Err(EventServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_empty_description_allowed() {
        let f = setup().await;
        let event = f.add(f.concert, f.confirmed, date(2026, 11, 1), "").await;
        assert_eq!(event.to_string(), "");
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let f = setup().await;
        let event = f.add(f.concert, f.confirmed, date(2026, 11, 1), "Fair").await;

        let deleted = f.service.soft_delete(event.id).await.unwrap();
        assert!(deleted.deleted);
        assert!(f.service.list().await.unwrap().is_empty());
        assert!(f.service.get_by_id(event.id).await.unwrap().is_some());

        let restored = f.service.restore(event.id).await.unwrap();
        assert!(!restored.deleted);
        assert_eq!(names(f.service.list().await.unwrap()), vec!["Fair"]);
        assert_eq!(f.published_names().await, vec!["Fair"]);

        let history = f.revisions.history(RevisionObject::Event, event.id).await.unwrap();
        let actions: Vec<RevisionAction> = history.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![RevisionAction::Restored, RevisionAction::Deleted, RevisionAction::Created]
        );
    }

    #[tokio::test]
    async fn test_soft_delete_twice_records_once() {
        let f = setup().await;
        let event = f.add(f.concert, f.confirmed, date(2026, 11, 1), "Fair").await;
        f.service.soft_delete(event.id).await.unwrap();
        f.service.soft_delete(event.id).await.unwrap();

        let history = f.revisions.history(RevisionObject::Event, event.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_update_moves_event_between_windows() {
        let f = setup().await;
        let event = f.add(f.festival, f.confirmed, date(2026, 11, 1), "Moving").await;
        assert_eq!(f.published_names().await, vec!["Moving"]);

        let updated = f
            .service
            .update(
                event.id,
                UpdateEventInput {
                    start_date: Some(date(2027, 2, 1)),
                    start_time: Some(Some(NaiveTime::from_hms_opt(20, 0, 0).unwrap())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.start_date, date(2027, 2, 1));
        assert_eq!(updated.description, "Moving");

        assert!(f.published_names().await.is_empty());
        assert_eq!(f.promoted_names().await, vec!["Moving"]);
    }

    #[tokio::test]
    async fn test_update_rejects_missing_status() {
        let f = setup().await;
        let event = f.add(f.concert, f.confirmed, date(2026, 11, 1), "Fair").await;
        let result = f
            .service
            .update(
                event.id,
                UpdateEventInput {
                    status_id: Some(999),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(EventServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let f = setup().await;
        let event = f.add(f.concert, f.confirmed, date(2026, 11, 1), "Gone").await;
        f.service.delete(event.id).await.unwrap();

        assert!(f.service.get_by_id(event.id).await.unwrap().is_none());
        assert!(matches!(
            f.service.delete(event.id).await,
            Err(EventServiceError::NotFound(_))
        ));
        let latest = f
            .revisions
            .latest(RevisionObject::Event, event.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.snapshot["description"], "Gone");
    }

    #[tokio::test]
    async fn test_unknown_event_not_found() {
        let f = setup().await;
        assert!(matches!(
            f.service.soft_delete(42).await,
            Err(EventServiceError::NotFound(_))
        ));
        assert!(matches!(
            f.service.update(42, UpdateEventInput::default()).await,
            Err(EventServiceError::NotFound(_))
        ));
    }
}
