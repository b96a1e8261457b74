//! Event type repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::EventType;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, description, promote, routine, css_class_name, created_at, updated_at";

#[async_trait]
pub trait EventTypeRepository: Send + Sync {
    async fn create(&self, event_type: &EventType) -> Result<EventType>;
    async fn get_by_id(&self, id: i64) -> Result<Option<EventType>>;
    async fn list(&self) -> Result<Vec<EventType>>;
    async fn update(&self, event_type: &EventType) -> Result<EventType>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxEventTypeRepository {
    pool: DynDatabasePool,
}

impl SqlxEventTypeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventTypeRepository> {
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
impl EventTypeRepository for SqlxEventTypeRepository {
    async fn create(&self, event_type: &EventType) -> Result<EventType> {
        let now = Utc::now();
        let sql = "INSERT INTO event_types (description, promote, routine, css_class_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(&event_type.description)
                .bind(event_type.promote)
                .bind(event_type.routine)
                .bind(&event_type.css_class_name)
                .bind(now)
                .bind(now)
                .execute(self.sqlite()?)
                .await
                .context("Failed to create event type")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(&event_type.description)
                .bind(event_type.promote)
                .bind(event_type.routine)
                .bind(&event_type.css_class_name)
                .bind(now)
                .bind(now)
                .execute(self.mysql()?)
                .await
                .context("Failed to create event type")?
                .last_insert_id() as i64,
        };

        Ok(EventType {
            id,
            created_at: now,
            updated_at: now,
            ..event_type.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<EventType>> {
        let sql = format!("SELECT {} FROM event_types WHERE id = ?", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.sqlite()?)
                    .await
                    .context("Failed to get event type")?;
                Ok(row.map(|r| row_to_type_sqlite(&r)))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.mysql()?)
                    .await
                    .context("Failed to get event type")?;
                Ok(row.map(|r| row_to_type_mysql(&r)))
            }
        }
    }

    async fn list(&self) -> Result<Vec<EventType>> {
        let sql = format!("SELECT {} FROM event_types ORDER BY description, id", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list event types")?;
                Ok(rows.iter().map(row_to_type_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list event types")?;
                Ok(rows.iter().map(row_to_type_mysql).collect())
            }
        }
    }

    async fn update(&self, event_type: &EventType) -> Result<EventType> {
        let sql = "UPDATE event_types SET description = ?, promote = ?, routine = ?, css_class_name = ?, updated_at = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(&event_type.description)
                    .bind(event_type.promote)
                    .bind(event_type.routine)
                    .bind(&event_type.css_class_name)
                    .bind(Utc::now())
                    .bind(event_type.id)
                    .execute(self.sqlite()?)
                    .await
                    .context("Failed to update event type")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(&event_type.description)
                    .bind(event_type.promote)
                    .bind(event_type.routine)
                    .bind(&event_type.css_class_name)
                    .bind(Utc::now())
                    .bind(event_type.id)
                    .execute(self.mysql()?)
                    .await
                    .context("Failed to update event type")?;
            }
        }
        self.get_by_id(event_type.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event type not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM event_types WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to delete event type")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to delete event type")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

fn row_to_type_sqlite(row: &sqlx::sqlite::SqliteRow) -> EventType {
    EventType {
        id: row.get("id"),
        description: row.get("description"),
        promote: row.get("promote"),
        routine: row.get("routine"),
        css_class_name: row.get("css_class_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_type_mysql(row: &sqlx::mysql::MySqlRow) -> EventType {
    EventType {
        id: row.get("id"),
        description: row.get("description"),
        promote: row.get("promote"),
        routine: row.get("routine"),
        css_class_name: row.get("css_class_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
