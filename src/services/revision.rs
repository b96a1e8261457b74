//! Revision service
//!
//! Records a JSON snapshot of a record after each write and reads the
//! history back.

use crate::db::repositories::RevisionRepository;
use crate::models::{Revision, RevisionAction, RevisionObject};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

pub struct RevisionService {
    repo: Arc<dyn RevisionRepository>,
}

impl RevisionService {
    pub fn new(repo: Arc<dyn RevisionRepository>) -> Self {
        Self { repo }
    }

    /// Snapshot `record` and store it as one revision
    pub async fn record<T: Serialize>(
        &self,
        object_type: RevisionObject,
        object_id: i64,
        action: RevisionAction,
        record: &T,
    ) -> Result<Revision> {
        let snapshot = serde_json::to_value(record)
            .with_context(|| format!("Failed to snapshot {} {}", object_type, object_id))?;
        self.repo
            .create(object_type, object_id, action, &snapshot)
            .await
            .with_context(|| format!("Failed to record revision for {} {}", object_type, object_id))
    }

    /// All revisions of one record, newest first
    pub async fn history(
        &self,
        object_type: RevisionObject,
        object_id: i64,
    ) -> Result<Vec<Revision>> {
        self.repo
            .list_for(object_type, object_id)
            .await
            .context("Failed to load revision history")
    }

    pub async fn latest(
        &self,
        object_type: RevisionObject,
        object_id: i64,
    ) -> Result<Option<Revision>> {
        Ok(self.history(object_type, object_id).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxRevisionRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::EventStatus;

    async fn setup() -> RevisionService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        RevisionService::new(SqlxRevisionRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_record_snapshots_serialized_record() {
        let service = setup().await;
        let mut status = EventStatus::new("Confirmed".to_string(), true);
        status.id = 3;

        let revision = service
            .record(RevisionObject::EventStatus, status.id, RevisionAction::Created, &status)
            .await
            .unwrap();

        assert_eq!(revision.object_type, RevisionObject::EventStatus);
        assert_eq!(revision.object_id, 3);
        assert_eq!(revision.snapshot["description"], "Confirmed");
        assert_eq!(revision.snapshot["publish"], true);
    }

    #[tokio::test]
    async fn test_latest_is_newest() {
        let service = setup().await;
        let mut status = EventStatus::new("Provisional".to_string(), false);
        status.id = 1;
        service
            .record(RevisionObject::EventStatus, 1, RevisionAction::Created, &status)
            .await
            .unwrap();
        status.publish = true;
        service
            .record(RevisionObject::EventStatus, 1, RevisionAction::Updated, &status)
            .await
            .unwrap();

        let history = service.history(RevisionObject::EventStatus, 1).await.unwrap();
        assert_eq!(history.len(), 2);

        let latest = service.latest(RevisionObject::EventStatus, 1).await.unwrap().unwrap();
        assert_eq!(latest.action, RevisionAction::Updated);
        assert_eq!(latest.snapshot["publish"], true);
    }

    #[tokio::test]
    async fn test_latest_without_history() {
        let service = setup().await;
        assert!(service.latest(RevisionObject::Event, 42).await.unwrap().is_none());
    }
}
