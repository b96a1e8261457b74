//! Lookup table services
//!
//! Locations, statuses and types are small editor-managed tables that events
//! point at. Every write here can change what the public listings contain, so
//! each one drops the cached listings.

use crate::cache::Cache;
use crate::db::repositories::{EventLocationRepository, EventStatusRepository, EventTypeRepository};
use crate::models::{
    CreateEventLocationInput, CreateEventStatusInput, CreateEventTypeInput, EventLocation,
    EventStatus, EventType, RevisionAction, RevisionObject, UpdateEventLocationInput,
    UpdateEventStatusInput, UpdateEventTypeInput,
};
use crate::services::event::LISTING_CACHE_PREFIX;
use crate::services::revision::RevisionService;
use anyhow::Context;
use std::sync::Arc;

pub const MAX_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_CSS_CLASS_LENGTH: usize = 100;

/// Error types for lookup service operations
#[derive(Debug, thiserror::Error)]
pub enum LookupServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Trim and check a lookup description
fn validate_description(description: &str) -> Result<String, LookupServiceError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(LookupServiceError::ValidationError(
            "Description cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(LookupServiceError::ValidationError(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Blank input clears the URL; anything else must parse as an absolute URL.
fn validate_url(field: &str, value: Option<String>) -> Result<Option<String>, LookupServiceError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    url::Url::parse(trimmed).map_err(|e| {
        LookupServiceError::ValidationError(format!("Invalid {} '{}': {}", field, trimmed, e))
    })?;
    Ok(Some(trimmed.to_string()))
}

fn validate_css_class(css_class_name: &str) -> Result<String, LookupServiceError> {
    let trimmed = css_class_name.trim();
    if trimmed.chars().count() > MAX_CSS_CLASS_LENGTH {
        return Err(LookupServiceError::ValidationError(format!(
            "CSS class name cannot exceed {} characters",
            MAX_CSS_CLASS_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

fn invalidate_listings(cache: &Cache) -> Result<(), LookupServiceError> {
    cache
        .delete_prefix(LISTING_CACHE_PREFIX)
        .context("Failed to invalidate event listings")?;
    Ok(())
}

/// Event location management
pub struct EventLocationService {
    repo: Arc<dyn EventLocationRepository>,
    revisions: Arc<RevisionService>,
    cache: Arc<Cache>,
}

impl EventLocationService {
    pub fn new(
        repo: Arc<dyn EventLocationRepository>,
        revisions: Arc<RevisionService>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            repo,
            revisions,
            cache,
        }
    }

    /// Create a location
    ///
    /// # Errors
    /// - `ValidationError` if the description is blank or too long, or a URL
    ///   is not absolute
    pub async fn create(
        &self,
        input: CreateEventLocationInput,
    ) -> Result<EventLocation, LookupServiceError> {
        let mut location = EventLocation::new(validate_description(&input.description)?);
        location.url = validate_url("url", input.url)?;
        location.url_map = validate_url("map url", input.url_map)?;
        location.notes = input.notes;

        let created = self
            .repo
            .create(&location)
            .await
            .context("Failed to create event location")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventLocation, created.id, RevisionAction::Created, &created)
            .await?;

        tracing::info!("Created event location {} ({})", created.id, created.description);
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<EventLocation>, LookupServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get event location")
            .map_err(Into::into)
    }

    /// All locations ordered by description
    pub async fn list(&self) -> Result<Vec<EventLocation>, LookupServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list event locations")
            .map_err(Into::into)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateEventLocationInput,
    ) -> Result<EventLocation, LookupServiceError> {
        let mut location = self.require(id).await?;

        if let Some(description) = input.description {
            location.description = validate_description(&description)?;
        }
        if let Some(url) = input.url {
            location.url = validate_url("url", url)?;
        }
        if let Some(url_map) = input.url_map {
            location.url_map = validate_url("map url", url_map)?;
        }
        if let Some(notes) = input.notes {
            location.notes = notes;
        }

        let updated = self
            .repo
            .update(&location)
            .await
            .context("Failed to update event location")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventLocation, id, RevisionAction::Updated, &updated)
            .await?;

        tracing::info!("Updated event location {}", id);
        Ok(updated)
    }

    /// Delete a location together with every event held there
    pub async fn delete(&self, id: i64) -> Result<(), LookupServiceError> {
        let location = self.require(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete event location")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventLocation, id, RevisionAction::Deleted, &location)
            .await?;

        tracing::info!("Deleted event location {}", id);
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<EventLocation, LookupServiceError> {
        self.get_by_id(id).await?.ok_or_else(|| {
            LookupServiceError::NotFound(format!("Event location with ID {} not found", id))
        })
    }
}

/// Event status management
pub struct EventStatusService {
    repo: Arc<dyn EventStatusRepository>,
    revisions: Arc<RevisionService>,
    cache: Arc<Cache>,
}

impl EventStatusService {
    pub fn new(
        repo: Arc<dyn EventStatusRepository>,
        revisions: Arc<RevisionService>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            repo,
            revisions,
            cache,
        }
    }

    pub async fn create(
        &self,
        input: CreateEventStatusInput,
    ) -> Result<EventStatus, LookupServiceError> {
        let status = EventStatus::new(validate_description(&input.description)?, input.publish);
        let created = self
            .repo
            .create(&status)
            .await
            .context("Failed to create event status")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventStatus, created.id, RevisionAction::Created, &created)
            .await?;

        tracing::info!("Created event status {} ({})", created.id, created.description);
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<EventStatus>, LookupServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get event status")
            .map_err(Into::into)
    }

    pub async fn list(&self) -> Result<Vec<EventStatus>, LookupServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list event statuses")
            .map_err(Into::into)
    }

    /// Update a status
    ///
    /// Flipping `publish` moves every event with this status in or out of
    /// the public listings.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateEventStatusInput,
    ) -> Result<EventStatus, LookupServiceError> {
        let mut status = self.require(id).await?;

        if let Some(description) = input.description {
            status.description = validate_description(&description)?;
        }
        if let Some(publish) = input.publish {
            status.publish = publish;
        }

        let updated = self
            .repo
            .update(&status)
            .await
            .context("Failed to update event status")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventStatus, id, RevisionAction::Updated, &updated)
            .await?;

        tracing::info!("Updated event status {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), LookupServiceError> {
        let status = self.require(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete event status")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventStatus, id, RevisionAction::Deleted, &status)
            .await?;

        tracing::info!("Deleted event status {}", id);
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<EventStatus, LookupServiceError> {
        self.get_by_id(id).await?.ok_or_else(|| {
            LookupServiceError::NotFound(format!("Event status with ID {} not found", id))
        })
    }
}

/// Event type management
pub struct EventTypeService {
    repo: Arc<dyn EventTypeRepository>,
    revisions: Arc<RevisionService>,
    cache: Arc<Cache>,
}

impl EventTypeService {
    pub fn new(
        repo: Arc<dyn EventTypeRepository>,
        revisions: Arc<RevisionService>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            repo,
            revisions,
            cache,
        }
    }

    pub async fn create(
        &self,
        input: CreateEventTypeInput,
    ) -> Result<EventType, LookupServiceError> {
        let mut event_type = EventType::new(validate_description(&input.description)?);
        event_type.promote = input.promote;
        event_type.routine = input.routine;
        event_type.css_class_name = validate_css_class(&input.css_class_name)?;

        let created = self
            .repo
            .create(&event_type)
            .await
            .context("Failed to create event type")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventType, created.id, RevisionAction::Created, &created)
            .await?;

        tracing::info!("Created event type {} ({})", created.id, created.description);
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<EventType>, LookupServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get event type")
            .map_err(Into::into)
    }

    pub async fn list(&self) -> Result<Vec<EventType>, LookupServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list event types")
            .map_err(Into::into)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateEventTypeInput,
    ) -> Result<EventType, LookupServiceError> {
        let mut event_type = self.require(id).await?;

        if let Some(description) = input.description {
            event_type.description = validate_description(&description)?;
        }
        if let Some(promote) = input.promote {
            event_type.promote = promote;
        }
        if let Some(routine) = input.routine {
            event_type.routine = routine;
        }
        if let Some(css_class_name) = input.css_class_name {
            event_type.css_class_name = validate_css_class(&css_class_name)?;
        }

        let updated = self
            .repo
            .update(&event_type)
            .await
            .context("Failed to update event type")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventType, id, RevisionAction::Updated, &updated)
            .await?;

        tracing::info!("Updated event type {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), LookupServiceError> {
        let event_type = self.require(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete event type")?;
        invalidate_listings(&self.cache)?;
        self.revisions
            .record(RevisionObject::EventType, id, RevisionAction::Deleted, &event_type)
            .await?;

        tracing::info!("Deleted event type {}", id);
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<EventType, LookupServiceError> {
        self.get_by_id(id).await?.ok_or_else(|| {
            LookupServiceError::NotFound(format!("Event type with ID {} not found", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxEventLocationRepository, SqlxEventStatusRepository, SqlxEventTypeRepository,
        SqlxRevisionRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use std::time::Duration;

    struct Services {
        locations: EventLocationService,
        statuses: EventStatusService,
        types: EventTypeService,
        revisions: Arc<RevisionService>,
        cache: Arc<Cache>,
    }

    async fn setup() -> Services {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let revisions = Arc::new(RevisionService::new(SqlxRevisionRepository::boxed(pool.clone())));
        let cache = Arc::new(Cache::new(100, Duration::from_secs(60)));

        Services {
            locations: EventLocationService::new(
                SqlxEventLocationRepository::boxed(pool.clone()),
                revisions.clone(),
                cache.clone(),
            ),
            statuses: EventStatusService::new(
                SqlxEventStatusRepository::boxed(pool.clone()),
                revisions.clone(),
                cache.clone(),
            ),
            types: EventTypeService::new(
                SqlxEventTypeRepository::boxed(pool),
                revisions.clone(),
                cache.clone(),
            ),
            revisions,
            cache,
        }
    }

    #[tokio::test]
    async fn test_create_location_trims_and_validates_urls() {
        let services = setup().await;
        let location = services
            .locations
            .create(CreateEventLocationInput {
                description: "  Village Hall ".to_string(),
                url: Some("https://example.org/hall".to_string()),
                url_map: Some("   ".to_string()),
                notes: "Side entrance".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(location.description, "Village Hall");
        assert_eq!(location.url.as_deref(), Some("https://example.org/hall"));
        assert_eq!(location.url_map, None);
        assert_eq!(location.to_string(), "Village Hall");
    }

    #[tokio::test]
    async fn test_create_location_rejects_relative_url() {
        let services = setup().await;
        let result = services
            .locations
            .create(CreateEventLocationInput {
                description: "Hall".to_string(),
                url: Some("/hall".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(LookupServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_description_rules() {
        let services = setup().await;

        let blank = services
            .statuses
            .create(CreateEventStatusInput {
                description: "   ".to_string(),
                publish: true,
            })
            .await;
        assert!(matches!(blank, Err(LookupServiceError::ValidationError(_))));

        let too_long = services
            .types
            .create(CreateEventTypeInput {
                description: "x".repeat(MAX_DESCRIPTION_LENGTH + 1),
                ..Default::default()
            })
            .await;
        assert!(matches!(too_long, Err(LookupServiceError::ValidationError(_))));

        let at_limit = services
            .types
            .create(CreateEventTypeInput {
                description: "x".repeat(MAX_DESCRIPTION_LENGTH),
                ..Default::default()
            })
            .await;
        assert!(at_limit.is_ok());
    }

    #[tokio::test]
    async fn test_css_class_limit() {
        let services = setup().await;
        let result = services
            .types
            .create(CreateEventTypeInput {
                description: "Concert".to_string(),
                css_class_name: "c".repeat(MAX_CSS_CLASS_LENGTH + 1),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(LookupServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_event_type_defaults_to_routine() {
        let services = setup().await;
        let event_type = services
            .types
            .create(CreateEventTypeInput {
                description: "Meeting".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(event_type.routine);
        assert!(!event_type.promote);
        assert_eq!(event_type.css_class_name, "");
    }

    #[tokio::test]
    async fn test_list_ordered_by_description() {
        let services = setup().await;
        for name in ["Provisional", "Cancelled", "Confirmed"] {
            services
                .statuses
                .create(CreateEventStatusInput {
                    description: name.to_string(),
                    publish: false,
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = services
            .statuses
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.description)
            .collect();
        assert_eq!(names, vec!["Cancelled", "Confirmed", "Provisional"]);
    }

    #[tokio::test]
    async fn test_update_records_revision() {
        let services = setup().await;
        let status = services
            .statuses
            .create(CreateEventStatusInput {
                description: "Provisional".to_string(),
                publish: false,
            })
            .await
            .unwrap();

        let updated = services
            .statuses
            .update(
                status.id,
                UpdateEventStatusInput {
                    publish: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.publish);
        assert_eq!(updated.description, "Provisional");

        let history = services
            .revisions
            .history(RevisionObject::EventStatus, status.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, RevisionAction::Updated);
        assert_eq!(history[1].action, RevisionAction::Created);
    }

    #[tokio::test]
    async fn test_update_location_clears_url() {
        let services = setup().await;
        let location = services
            .locations
            .create(CreateEventLocationInput {
                description: "Hall".to_string(),
                url: Some("https://example.org".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = services
            .locations
            .update(
                location.id,
                UpdateEventLocationInput {
                    url: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.url, None);
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let services = setup().await;
        assert!(matches!(
            services.types.update(99, UpdateEventTypeInput::default()).await,
            Err(LookupServiceError::NotFound(_))
        ));
        assert!(matches!(
            services.locations.delete(99).await,
            Err(LookupServiceError::NotFound(_))
        ));
    }

    struct UnavailableRevisionRepository;

    #[async_trait::async_trait]
    impl crate::db::repositories::RevisionRepository for UnavailableRevisionRepository {
        async fn create(
            &self,
            _object_type: RevisionObject,
            _object_id: i64,
            _action: RevisionAction,
            _snapshot: &serde_json::Value,
        ) -> anyhow::Result<crate::models::Revision> {
            anyhow::bail!("revision store unavailable")
        }

        async fn list_for(
            &self,
            _object_type: RevisionObject,
            _object_id: i64,
        ) -> anyhow::Result<Vec<crate::models::Revision>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_revision_still_invalidates_listings() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let cache = Arc::new(Cache::new(100, Duration::from_secs(60)));
        let statuses = EventStatusService::new(
            SqlxEventStatusRepository::boxed(pool),
            Arc::new(RevisionService::new(Arc::new(UnavailableRevisionRepository))),
            cache.clone(),
        );
        cache
            .set("events:published:2026-10-14", &Vec::<i64>::new())
            .await
            .unwrap();

        let result = statuses
            .create(CreateEventStatusInput {
                description: "Confirmed".to_string(),
                publish: true,
            })
            .await;
        assert!(matches!(result, Err(LookupServiceError::InternalError(_))));
        assert!(cache
            .get::<Vec<i64>>("events:published:2026-10-14")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_writes_invalidate_listings() {
        let services = setup().await;
        services
            .cache
            .set("events:published:2026-10-14", &Vec::<i64>::new())
            .await
            .unwrap();

        let status = services
            .statuses
            .create(CreateEventStatusInput {
                description: "Confirmed".to_string(),
                publish: true,
            })
            .await
            .unwrap();
        assert!(services
            .cache
            .get::<Vec<i64>>("events:published:2026-10-14")
            .await
            .unwrap()
            .is_none());

        services
            .cache
            .set("events:promoted:2026-10-14", &Vec::<i64>::new())
            .await
            .unwrap();
        services.statuses.delete(status.id).await.unwrap();
        assert!(services
            .cache
            .get::<Vec<i64>>("events:promoted:2026-10-14")
            .await
            .unwrap()
            .is_none());
    }
}
