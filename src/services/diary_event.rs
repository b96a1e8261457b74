//! Diary event service
//!
//! Diary entries are a standalone schedule with free-text locations. They
//! never appear in the published or promoted listings.

use crate::db::repositories::DiaryEventRepository;
use crate::models::{
    CreateDiaryEventInput, DiaryEvent, RevisionAction, RevisionObject, UpdateDiaryEventInput,
};
use crate::services::revision::RevisionService;
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;

pub const MAX_LOCATION_LENGTH: usize = 200;

/// Error types for diary event service operations
#[derive(Debug, thiserror::Error)]
pub enum DiaryEventServiceError {
    #[error("Diary event not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct DiaryEventService {
    repo: Arc<dyn DiaryEventRepository>,
    revisions: Arc<RevisionService>,
}

impl DiaryEventService {
    pub fn new(repo: Arc<dyn DiaryEventRepository>, revisions: Arc<RevisionService>) -> Self {
        Self { repo, revisions }
    }

    /// Create a diary entry
    ///
    /// # Errors
    /// - `ValidationError` if the description is blank or the location is
    ///   too long
    pub async fn create(
        &self,
        input: CreateDiaryEventInput,
    ) -> Result<DiaryEvent, DiaryEventServiceError> {
        let mut entry = DiaryEvent::new(
            input.event_date,
            input.start_time,
            validate_description(&input.description)?,
        );
        entry.end_time = input.end_time;
        entry.location = validate_location(&input.location)?;
        entry.notes = input.notes;

        let created = self
            .repo
            .create(&entry)
            .await
            .context("Failed to create diary event")?;
        self.revisions
            .record(RevisionObject::DiaryEvent, created.id, RevisionAction::Created, &created)
            .await?;

        tracing::info!("Created diary event {} on {}", created.id, created.event_date);
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DiaryEvent>, DiaryEventServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get diary event")
            .map_err(Into::into)
    }

    pub async fn list(&self) -> Result<Vec<DiaryEvent>, DiaryEventServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list diary events")
            .map_err(Into::into)
    }

    /// Entries dated `from..=until`
    pub async fn list_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DiaryEvent>, DiaryEventServiceError> {
        if until < from {
            return Err(DiaryEventServiceError::ValidationError(format!(
                "Range end {} is before its start {}",
                until, from
            )));
        }
        self.repo
            .list_between(Some(from), Some(until))
            .await
            .context("Failed to list diary events in range")
            .map_err(Into::into)
    }

    /// Entries dated today or later
    pub async fn upcoming(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DiaryEvent>, DiaryEventServiceError> {
        self.repo
            .list_between(Some(today), None)
            .await
            .context("Failed to list upcoming diary events")
            .map_err(Into::into)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateDiaryEventInput,
    ) -> Result<DiaryEvent, DiaryEventServiceError> {
        let mut entry = self.require(id).await?;

        if let Some(event_date) = input.event_date {
            entry.event_date = event_date;
        }
        if let Some(description) = input.description {
            entry.description = validate_description(&description)?;
        }
        if let Some(start_time) = input.start_time {
            entry.start_time = start_time;
        }
        if let Some(end_time) = input.end_time {
            entry.end_time = end_time;
        }
        if let Some(location) = input.location {
            entry.location = validate_location(&location)?;
        }
        if let Some(notes) = input.notes {
            entry.notes = notes;
        }

        let updated = self
            .repo
            .update(&entry)
            .await
            .context("Failed to update diary event")?;
        self.revisions
            .record(RevisionObject::DiaryEvent, id, RevisionAction::Updated, &updated)
            .await?;

        tracing::info!("Updated diary event {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DiaryEventServiceError> {
        let entry = self.require(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete diary event")?;
        self.revisions
            .record(RevisionObject::DiaryEvent, id, RevisionAction::Deleted, &entry)
            .await?;

        tracing::info!("Deleted diary event {}", id);
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<DiaryEvent, DiaryEventServiceError> {
        self.get_by_id(id).await?.ok_or_else(|| {
            DiaryEventServiceError::NotFound(format!("Diary event with ID {} not found", id))
        })
    }
}

fn validate_description(description: &str) -> Result<String, DiaryEventServiceError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(DiaryEventServiceError::ValidationError(
            "Description cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_location(location: &str) -> Result<String, DiaryEventServiceError> {
    let trimmed = location.trim();
    if trimmed.chars().count() > MAX_LOCATION_LENGTH {
        return Err(DiaryEventServiceError::ValidationError(format!(
            "Location cannot exceed {} characters",
            MAX_LOCATION_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}
