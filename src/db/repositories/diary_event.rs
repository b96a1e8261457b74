//! Diary event repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::DiaryEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, event_date, description, start_time, end_time, location, notes, created_at, updated_at";

#[async_trait]
pub trait DiaryEventRepository: Send + Sync {
    async fn create(&self, event: &DiaryEvent) -> Result<DiaryEvent>;
    async fn get_by_id(&self, id: i64) -> Result<Option<DiaryEvent>>;
    /// All entries ordered by date then start time
    async fn list(&self) -> Result<Vec<DiaryEvent>>;
    /// Entries with `from <= event_date <= until`; either bound may be open
    async fn list_between(
        &self,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<DiaryEvent>>;
    async fn update(&self, event: &DiaryEvent) -> Result<DiaryEvent>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxDiaryEventRepository {
    pool: DynDatabasePool,
}

impl SqlxDiaryEventRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DiaryEventRepository> {
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
impl DiaryEventRepository for SqlxDiaryEventRepository {
    async fn create(&self, event: &DiaryEvent) -> Result<DiaryEvent> {
        let now = Utc::now();
        let sql = "INSERT INTO diary_events (event_date, description, start_time, end_time, location, notes, created_at, updated_at) \
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(event.event_date)
                .bind(&event.description)
                .bind(event.start_time)
                .bind(event.end_time)
                .bind(&event.location)
                .bind(&event.notes)
                .bind(now)
                .bind(now)
                .execute(self.sqlite()?)
                .await
                .context("Failed to create diary event")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(event.event_date)
                .bind(&event.description)
                .bind(event.start_time)
                .bind(event.end_time)
                .bind(&event.location)
                .bind(&event.notes)
                .bind(now)
                .bind(now)
                .execute(self.mysql()?)
                .await
                .context("Failed to create diary event")?
                .last_insert_id() as i64,
        };

        Ok(DiaryEvent {
            id,
            created_at: now,
            updated_at: now,
            ..event.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<DiaryEvent>> {
        let sql = format!("SELECT {} FROM diary_events WHERE id = ?", COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.sqlite()?)
                    .await
                    .context("Failed to get diary event")?;
                Ok(row.map(|r| row_to_diary_event_sqlite(&r)))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.mysql()?)
                    .await
                    .context("Failed to get diary event")?;
                Ok(row.map(|r| row_to_diary_event_mysql(&r)))
            }
        }
    }

    async fn list(&self) -> Result<Vec<DiaryEvent>> {
        self.list_between(None, None).await
    }

    async fn list_between(
        &self,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<DiaryEvent>> {
        // NULL bounds leave that side of the range open.
        let sql = format!(
            "SELECT {} FROM diary_events \
             WHERE (? IS NULL OR event_date >= ?) AND (? IS NULL OR event_date <= ?) \
             ORDER BY event_date, start_time, id",
            COLUMNS
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(from)
                    .bind(from)
                    .bind(until)
                    .bind(until)
                    .fetch_all(self.sqlite()?)
                    .await
                    .context("Failed to list diary events")?;
                Ok(rows.iter().map(row_to_diary_event_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(from)
                    .bind(from)
                    .bind(until)
                    .bind(until)
                    .fetch_all(self.mysql()?)
                    .await
                    .context("Failed to list diary events")?;
                Ok(rows.iter().map(row_to_diary_event_mysql).collect())
            }
        }
    }

    async fn update(&self, event: &DiaryEvent) -> Result<DiaryEvent> {
        let sql = "UPDATE diary_events SET event_date = ?, description = ?, start_time = ?, end_time = ?, \
                   location = ?, notes = ?, updated_at = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(event.event_date)
                    .bind(&event.description)
                    .bind(event.start_time)
                    .bind(event.end_time)
                    .bind(&event.location)
                    .bind(&event.notes)
                    .bind(Utc::now())
                    .bind(event.id)
                    .execute(self.sqlite()?)
                    .await
                    .context("Failed to update diary event")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(event.event_date)
                    .bind(&event.description)
                    .bind(event.start_time)
                    .bind(event.end_time)
                    .bind(&event.location)
                    .bind(&event.notes)
                    .bind(Utc::now())
                    .bind(event.id)
                    .execute(self.mysql()?)
                    .await
                    .context("Failed to update diary event")?;
            }
        }
        self.get_by_id(event.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Diary event not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM diary_events WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.sqlite()?)
                .await
                .context("Failed to delete diary event")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.mysql()?)
                .await
                .context("Failed to delete diary event")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

fn row_to_diary_event_sqlite(row: &sqlx::sqlite::SqliteRow) -> DiaryEvent {
    DiaryEvent {
        id: row.get("id"),
        event_date: row.get("event_date"),
        description: row.get("description"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_diary_event_mysql(row: &sqlx::mysql::MySqlRow) -> DiaryEvent {
    DiaryEvent {
        id: row.get("id"),
        event_date: row.get("event_date"),
        description: row.get("description"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
