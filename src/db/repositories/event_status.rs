//! Event status repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::EventStatus;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, description, publish, created_at, updated_at";

#[async_trait]
pub trait EventStatusRepository: Send + Sync {
    async fn create(&self, status: &EventStatus) -> Result<EventStatus>;
    async fn get_by_id(&self, id: i64) -> Result<Option<EventStatus>>;
    async fn list(&self) -> Result<Vec<EventStatus>>;
    async fn update(&self, status: &EventStatus) -> Result<EventStatus>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxEventStatusRepository {
    pool: DynDatabasePool,
}

impl SqlxEventStatusRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventStatusRepository> {
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
impl EventStatusRepository for SqlxEventStatusRepository {
    async fn create(&self, status: &EventStatus) -> Result<EventStatus> {
        let now = Utc::now();
        let sql = "INSERT INTO event_statuses (description, publish, created_at, updated_at) VALUES (?, ?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(&status.description)
                .bind(status.publish)
                .bind(now)
                .bind(now)
                .execute(self.sqlite()?)
                .await
                .context("Failed to create event status")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(&status.description)
                .bind(status.publish)
                .bind(now)
                .bind(now)
                .execute(self.mysql()?)
                .await
                .context("Failed to create event status")?
                .last_insert_id() as i64,
        };

        Ok(EventStatus {
            id,
            created_at: now,
            updated_at: now,
            ..status.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<EventStatus>> {
        let sql = format!("SELECT {} FROM event_statuses WHERE id = ?", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.sqlite()?)
                    .await
                    .context("Failed to get event status")?;
                Ok(row.map(|r| row_to_status_sqlite(&r)))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.mysql()?)
                    .await
                    .context("Failed to get event status")?;
                Ok(row.map(|r| row_to_status_mysql(&r)))
            }
        }
    }

    async fn list(&self) -> Result<Vec<EventStatus>> {
        let sql = format!("SELECT {} FROM event_statuses ORDER BY description, id", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list event statuses")?;
                Ok(rows.iter().map(row_to_status_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list event statuses")?;
                Ok(rows.iter().map(row_to_status_mysql).collect())
            }
        }
    }

    async fn update(&self, status: &EventStatus) -> Result<EventStatus> {
        let sql = "UPDATE event_statuses SET description = ?, publish = ?, updated_at = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(&status.description)
                    .bind(status.publish)
                    .bind(Utc::now())
                    .bind(status.id)
                    .execute(self.sqlite()?)
                    .await
                    .context("Failed to update event status")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(&status.description)
                    .bind(status.publish)
                    .bind(Utc::now())
                    .bind(status.id)
                    .execute(self.mysql()?)
                    .await
                    .context("Failed to update event status")?;
            }
        }
        self.get_by_id(status.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event status not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM event_statuses WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to delete event status")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to delete event status")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

fn row_to_status_sqlite(row: &sqlx::sqlite::SqliteRow) -> EventStatus {
    EventStatus {
        id: row.get("id"),
        description: row.get("description"),
        publish: row.get("publish"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_status_mysql(row: &sqlx::mysql::MySqlRow) -> EventStatus {
    EventStatus {
        id: row.get("id"),
        description: row.get("description"),
        publish: row.get("publish"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
