//! Event location repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::EventLocation;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, description, url, url_map, notes, created_at, updated_at";

#[async_trait]
pub trait EventLocationRepository: Send + Sync {
    async fn create(&self, location: &EventLocation) -> Result<EventLocation>;
    async fn get_by_id(&self, id: i64) -> Result<Option<EventLocation>>;
    /// All locations ordered by description
    async fn list(&self) -> Result<Vec<EventLocation>>;
    async fn update(&self, location: &EventLocation) -> Result<EventLocation>;
    /// Returns `false` when no row matched
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxEventLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxEventLocationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventLocationRepository> {
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
impl EventLocationRepository for SqlxEventLocationRepository {
    async fn create(&self, location: &EventLocation) -> Result<EventLocation> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.sqlite()?, location).await,
            DatabaseDriver::Mysql => create_mysql(self.mysql()?, location).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<EventLocation>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<EventLocation>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.mysql()?).await,
        }
    }

    async fn update(&self, location: &EventLocation) -> Result<EventLocation> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.sqlite()?, location).await,
            DatabaseDriver::Mysql => update_mysql(self.mysql()?, location).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM event_locations WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to delete event location")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to delete event location")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, location: &EventLocation) -> Result<EventLocation> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO event_locations (description, url, url_map, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&location.description)
    .bind(&location.url)
    .bind(&location.url_map)
    .bind(&location.notes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create event location")?;

    Ok(EventLocation {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..location.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<EventLocation>> {
    let row = sqlx::query(&format!("SELECT {} FROM event_locations WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get event location")?;
    Ok(row.map(|r| row_to_location_sqlite(&r)))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<EventLocation>> {
    let rows = sqlx::query(&format!("SELECT {} FROM event_locations ORDER BY description, id", COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list event locations")?;
    Ok(rows.iter().map(row_to_location_sqlite).collect())
}

async fn update_sqlite(pool: &SqlitePool, location: &EventLocation) -> Result<EventLocation> {
    sqlx::query("UPDATE event_locations SET description = ?, url = ?, url_map = ?, notes = ?, updated_at = ? WHERE id = ?")
        .bind(&location.description)
        .bind(&location.url)
        .bind(&location.url_map)
        .bind(&location.notes)
        .bind(Utc::now())
        .bind(location.id)
        .execute(pool)
        .await
        .context("Failed to update event location")?;
    get_by_id_sqlite(pool, location.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Event location not found after update"))
}

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> EventLocation {
    EventLocation {
        id: row.get("id"),
        description: row.get("description"),
        url: row.get("url"),
        url_map: row.get("url_map"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, location: &EventLocation) -> Result<EventLocation> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO event_locations (description, url, url_map, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&location.description)
    .bind(&location.url)
    .bind(&location.url_map)
    .bind(&location.notes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create event location")?;

    Ok(EventLocation {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..location.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<EventLocation>> {
    let row = sqlx::query(&format!("SELECT {} FROM event_locations WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get event location")?;
    Ok(row.map(|r| row_to_location_mysql(&r)))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<EventLocation>> {
    let rows = sqlx::query(&format!("SELECT {} FROM event_locations ORDER BY description, id", COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list event locations")?;
    Ok(rows.iter().map(row_to_location_mysql).collect())
}

async fn update_mysql(pool: &MySqlPool, location: &EventLocation) -> Result<EventLocation> {
    sqlx::query("UPDATE event_locations SET description = ?, url = ?, url_map = ?, notes = ?, updated_at = ? WHERE id = ?")
        .bind(&location.description)
        .bind(&location.url)
        .bind(&location.url_map)
        .bind(&location.notes)
        .bind(Utc::now())
        .bind(location.id)
        .execute(pool)
        .await
        .context("Failed to update event location")?;
    get_by_id_mysql(pool, location.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Event location not found after update"))
}

fn row_to_location_mysql(row: &sqlx::mysql::MySqlRow) -> EventLocation {
    EventLocation {
        id: row.get("id"),
        description: row.get("description"),
        url: row.get("url"),
        url_map: row.get("url_map"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
