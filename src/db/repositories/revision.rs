//! Revision repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Revision, RevisionAction, RevisionObject};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait RevisionRepository: Send + Sync {
    async fn create(
        &self,
        object_type: RevisionObject,
        object_id: i64,
        action: RevisionAction,
        snapshot: &serde_json::Value,
    ) -> Result<Revision>;
    /// Revisions of one record, newest first
    async fn list_for(&self, object_type: RevisionObject, object_id: i64) -> Result<Vec<Revision>>;
}

pub struct SqlxRevisionRepository {
    pool: DynDatabasePool,
}

impl SqlxRevisionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RevisionRepository> {
        Arc::new(Self::new(pool))
    }

    fn sqlite(&self) -> Result<&SqlitePool> {
        self.pool.as_sqlite().context("Expected a SQLite pool")
    }

    fn mysql(&self) -> Result<&MySqlPool> {
        self.pool.as_mysql().context("Expected a MySQL pool")
    }
}

#[async_trait]
impl RevisionRepository for SqlxRevisionRepository {
    async fn create(
        &self,
        object_type: RevisionObject,
        object_id: i64,
        action: RevisionAction,
        snapshot: &serde_json::Value,
    ) -> Result<Revision> {
        let now = Utc::now();
        let body = serde_json::to_string(snapshot).context("Failed to serialize revision snapshot")?;
        let sql = "INSERT INTO revisions (object_type, object_id, action, snapshot, created_at) VALUES (?, ?, ?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(object_type.to_string())
                .bind(object_id)
                .bind(action.to_string())
                .bind(&body)
                .bind(now)
                .execute(self.sqlite()?)
                .await
                .context("Failed to create revision")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(object_type.to_string())
                .bind(object_id)
                .bind(action.to_string())
                .bind(&body)
                .bind(now)
                .execute(self.mysql()?)
                .await
                .context("Failed to create revision")?
                .last_insert_id() as i64,
        };

        Ok(Revision {
            id,
            object_type,
            object_id,
            action,
            snapshot: snapshot.clone(),
            created_at: now,
        })
    }

    async fn list_for(&self, object_type: RevisionObject, object_id: i64) -> Result<Vec<Revision>> {
        let sql = "SELECT id, object_type, object_id, action, snapshot, created_at FROM revisions \
                   WHERE object_type = ? AND object_id = ? ORDER BY id DESC";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(sql)
                    .bind(object_type.to_string())
                    .bind(object_id)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list revisions")?;
                rows.iter().map(row_to_revision_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(sql)
                    .bind(object_type.to_string())
                    .bind(object_id)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list revisions")?;
                rows.iter().map(row_to_revision_mysql).collect()
            }
        }
    }
}

fn row_to_revision_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Revision> {
    let object_type: String = row.get("object_type");
    let action: String = row.get("action");
    let snapshot: String = row.get("snapshot");
    Ok(Revision {
        id: row.get("id"),
        object_type: object_type.parse()?,
        object_id: row.get("object_id"),
        action: action.parse()?,
        snapshot: serde_json::from_str(&snapshot).context("Corrupt revision snapshot")?,
        created_at: row.get("created_at"),
    })
}

fn row_to_revision_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Revision> {
    let object_type: String = row.get("object_type");
    let action: String = row.get("action");
    let snapshot: String = row.get("snapshot");
    Ok(Revision {
        id: row.get("id"),
        object_type: object_type.parse()?,
        object_id: row.get("object_id"),
        action: action.parse()?,
        snapshot: serde_json::from_str(&snapshot).context("Corrupt revision snapshot")?,
        created_at: row.get("created_at"),
    })
}
