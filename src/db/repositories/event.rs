//! Event repository
//!
//! Besides plain CRUD this repository answers the two public listings:
//! published events (publishing status, not deleted, start date inside an
//! inclusive range) and promoted events (additionally of a promoting type,
//! start date inside a half-open range).

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Event;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "e.id, e.event_type_id, e.description, e.start_date, e.start_time, e.end_date, e.end_time, \
    e.location_id, e.notes, e.status_id, e.deleted, e.created_at, e.updated_at";

const ORDERING: &str = "ORDER BY e.start_date, e.start_time, e.id";

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event>;
    /// Fetch by id, including soft-deleted events
    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;
    /// Every event that is not soft-deleted, in calendar order
    async fn list(&self) -> Result<Vec<Event>>;
    /// Publishing, non-deleted events with `from <= start_date <= until`
    async fn list_published(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Event>>;
    /// Publishing, non-deleted events of a promoting type with
    /// `after < start_date <= until`
    async fn list_promoted(&self, after: NaiveDate, until: NaiveDate) -> Result<Vec<Event>>;
    async fn update(&self, event: &Event) -> Result<Event>;
    /// Set the soft-delete flag; returns `false` when no row matched
    async fn set_deleted(&self, id: i64, deleted: bool) -> Result<bool>;
    /// Physically remove the row; returns `false` when no row matched
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxEventRepository {
    pool: DynDatabasePool,
}

impl SqlxEventRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventRepository> {
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
impl EventRepository for SqlxEventRepository {
    async fn create(&self, event: &Event) -> Result<Event> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.sqlite()?, event).await,
            DatabaseDriver::Mysql => create_mysql(self.mysql()?, event).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {} FROM events e WHERE e.id = ?", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.sqlite()?)
                    .await
                    .context("Failed to get event")?;
                Ok(row.map(|r| row_to_event_sqlite(&r)))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.mysql()?)
                    .await
                    .context("Failed to get event")?;
                Ok(row.map(|r| row_to_event_mysql(&r)))
            }
        }
    }

    async fn list(&self) -> Result<Vec<Event>> {
        let sql = format!("SELECT {} FROM events e WHERE e.deleted = 0 {}", COLUMNS, ORDERING);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list events")?;
                Ok(rows.iter().map(row_to_event_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list events")?;
                Ok(rows.iter().map(row_to_event_mysql).collect())
            }
        }
    }

    async fn list_published(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events e \
             INNER JOIN event_statuses s ON s.id = e.status_id \
             WHERE s.publish = 1 AND e.deleted = 0 \
             AND e.start_date >= ? AND e.start_date <= ? {}",
            COLUMNS, ORDERING
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(from)
                    .bind(until)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list published events")?;
                Ok(rows.iter().map(row_to_event_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(from)
                    .bind(until)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list published events")?;
                Ok(rows.iter().map(row_to_event_mysql).collect())
            }
        }
    }

    async fn list_promoted(&self, after: NaiveDate, until: NaiveDate) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events e \
             INNER JOIN event_statuses s ON s.id = e.status_id \
             INNER JOIN event_types t ON t.id = e.event_type_id \
             WHERE s.publish = 1 AND e.deleted = 0 AND t.promote = 1 \
             AND e.start_date > ? AND e.start_date <= ? {}",
            COLUMNS, ORDERING
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(after)
                    .bind(until)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list promoted events")?;
                Ok(rows.iter().map(row_to_event_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(after)
                    .bind(until)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list promoted events")?;
                Ok(rows.iter().map(row_to_event_mysql).collect())
            }
        }
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.sqlite()?, event).await?,
            DatabaseDriver::Mysql => update_mysql(self.mysql()?, event).await?,
        }
        self.get_by_id(event.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event not found after update"))
    }

    async fn set_deleted(&self, id: i64, deleted: bool) -> Result<bool> {
        let sql = "UPDATE events SET deleted = ?, updated_at = ? WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(deleted)
                .bind(Utc::now())
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to set event deleted flag")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(deleted)
                .bind(Utc::now())
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to set event deleted flag")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM events WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to delete event")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to delete event")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

const INSERT_SQL: &str = "INSERT INTO events (event_type_id, description, start_date, start_time, end_date, end_time, \
    location_id, notes, status_id, deleted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const UPDATE_SQL: &str = "UPDATE events SET event_type_id = ?, description = ?, start_date = ?, start_time = ?, \
    end_date = ?, end_time = ?, location_id = ?, notes = ?, status_id = ?, deleted = ?, updated_at = ? WHERE id = ?";

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, event: &Event) -> Result<Event> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_SQL)
        .bind(event.event_type_id)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.start_time)
        .bind(event.end_date)
        .bind(event.end_time)
        .bind(event.location_id)
        .bind(&event.notes)
        .bind(event.status_id)
        .bind(event.deleted)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create event")?;

    Ok(Event {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..event.clone()
    })
}

async fn update_sqlite(pool: &SqlitePool, event: &Event) -> Result<()> {
    sqlx::query(UPDATE_SQL)
        .bind(event.event_type_id)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.start_time)
        .bind(event.end_date)
        .bind(event.end_time)
        .bind(event.location_id)
        .bind(&event.notes)
        .bind(event.status_id)
        .bind(event.deleted)
        .bind(Utc::now())
        .bind(event.id)
        .execute(pool)
        .await
        .context("Failed to update event")?;
    Ok(())
}

fn row_to_event_sqlite(row: &sqlx::sqlite::SqliteRow) -> Event {
    Event {
        id: row.get("id"),
        event_type_id: row.get("event_type_id"),
        description: row.get("description"),
        start_date: row.get("start_date"),
        start_time: row.get("start_time"),
        end_date: row.get("end_date"),
        end_time: row.get("end_time"),
        location_id: row.get("location_id"),
        notes: row.get("notes"),
        status_id: row.get("status_id"),
        deleted: row.get("deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, event: &Event) -> Result<Event> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_SQL)
        .bind(event.event_type_id)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.start_time)
        .bind(event.end_date)
        .bind(event.end_time)
        .bind(event.location_id)
        .bind(&event.notes)
        .bind(event.status_id)
        .bind(event.deleted)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create event")?;

    Ok(Event {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..event.clone()
    })
}

async fn update_mysql(pool: &MySqlPool, event: &Event) -> Result<()> {
    sqlx::query(UPDATE_SQL)
        .bind(event.event_type_id)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.start_time)
        .bind(event.end_date)
        .bind(event.end_time)
        .bind(event.location_id)
        .bind(&event.notes)
        .bind(event.status_id)
        .bind(event.deleted)
        .bind(Utc::now())
        .bind(event.id)
        .execute(pool)
        .await
        .context("Failed to update event")?;
    Ok(())
}

fn row_to_event_mysql(row: &sqlx::mysql::MySqlRow) -> Event {
    Event {
        id: row.get("id"),
        event_type_id: row.get("event_type_id"),
        description: row.get("description"),
        start_date: row.get("start_date"),
        start_time: row.get("start_time"),
        end_date: row.get("end_date"),
        end_time: row.get("end_time"),
        location_id: row.get("location_id"),
        notes: row.get("notes"),
        status_id: row.get("status_id"),
        deleted: row.get("deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
