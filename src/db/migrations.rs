//! Database migrations
//!
//! Migrations are embedded as SQL strings, one variant per backend, and
//! applied in version order. Applied versions are tracked in `_migrations`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_event_locations",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS event_locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description VARCHAR(200) NOT NULL,
                url VARCHAR(200),
                url_map VARCHAR(200),
                notes TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_event_locations_description ON event_locations(description);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS event_locations (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                description VARCHAR(200) NOT NULL,
                url VARCHAR(200) NULL,
                url_map VARCHAR(200) NULL,
                notes TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_event_locations_description ON event_locations(description);
        "#,
    },
    Migration {
        version: 2,
        name: "create_event_statuses",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS event_statuses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description VARCHAR(200) NOT NULL,
                publish BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS event_statuses (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                description VARCHAR(200) NOT NULL,
                publish BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 3,
        name: "create_event_types",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS event_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description VARCHAR(200) NOT NULL,
                promote BOOLEAN NOT NULL DEFAULT 0,
                routine BOOLEAN NOT NULL DEFAULT 1,
                css_class_name VARCHAR(100) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS event_types (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                description VARCHAR(200) NOT NULL,
                promote BOOLEAN NOT NULL DEFAULT FALSE,
                routine BOOLEAN NOT NULL DEFAULT TRUE,
                css_class_name VARCHAR(100) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 4,
        name: "create_events",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type_id INTEGER NOT NULL,
                description VARCHAR(200) NOT NULL DEFAULT '',
                start_date DATE NOT NULL,
                start_time TIME,
                end_date DATE,
                end_time TIME,
                location_id INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                status_id INTEGER NOT NULL,
                deleted BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (event_type_id) REFERENCES event_types(id) ON DELETE CASCADE,
                FOREIGN KEY (location_id) REFERENCES event_locations(id) ON DELETE CASCADE,
                FOREIGN KEY (status_id) REFERENCES event_statuses(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_date, start_time);
            CREATE INDEX IF NOT EXISTS idx_events_status_id ON events(status_id);
            CREATE INDEX IF NOT EXISTS idx_events_event_type_id ON events(event_type_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS events (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                event_type_id BIGINT NOT NULL,
                description VARCHAR(200) NOT NULL DEFAULT '',
                start_date DATE NOT NULL,
                start_time TIME NULL,
                end_date DATE NULL,
                end_time TIME NULL,
                location_id BIGINT NOT NULL,
                notes TEXT NOT NULL,
                status_id BIGINT NOT NULL,
                deleted BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (event_type_id) REFERENCES event_types(id) ON DELETE CASCADE,
                FOREIGN KEY (location_id) REFERENCES event_locations(id) ON DELETE CASCADE,
                FOREIGN KEY (status_id) REFERENCES event_statuses(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_events_start ON events(start_date, start_time);
            CREATE INDEX idx_events_status_id ON events(status_id);
            CREATE INDEX idx_events_event_type_id ON events(event_type_id);
        "#,
    },
    Migration {
        version: 5,
        name: "create_diary_events",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS diary_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_date DATE NOT NULL,
                description TEXT NOT NULL,
                start_time TIME NOT NULL,
                end_time TIME,
                location VARCHAR(200) NOT NULL DEFAULT '',
                notes TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_diary_events_date ON diary_events(event_date, start_time);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS diary_events (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                event_date DATE NOT NULL,
                description TEXT NOT NULL,
                start_time TIME NOT NULL,
                end_time TIME NULL,
                location VARCHAR(200) NOT NULL DEFAULT '',
                notes TEXT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_diary_events_date ON diary_events(event_date, start_time);
        "#,
    },
    Migration {
        version: 6,
        name: "create_revisions",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS revisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                object_type VARCHAR(50) NOT NULL,
                object_id INTEGER NOT NULL,
                action VARCHAR(20) NOT NULL,
                snapshot TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_revisions_object ON revisions(object_type, object_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS revisions (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                object_type VARCHAR(50) NOT NULL,
                object_id BIGINT NOT NULL,
                action VARCHAR(20) NOT NULL,
                snapshot TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_revisions_object ON revisions(object_type, object_id);
        "#,
    },
];

/// Run all pending migrations, returning how many were applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    if let Some(sqlite) = pool.as_sqlite() {
        return get_applied_migrations_sqlite(sqlite).await;
    }
    if let Some(mysql) = pool.as_mysql() {
        return get_applied_migrations_mysql(mysql).await;
    }
    anyhow::bail!("Unsupported database pool")
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| MigrationRecord {
            version: row.get::<i32, _>("version") as i64,
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    if let Some(sqlite) = pool.as_sqlite() {
        return apply_migration_sqlite(sqlite, migration).await;
    }
    if let Some(mysql) = pool.as_mysql() {
        return apply_migration_mysql(mysql, migration).await;
    }
    anyhow::bail!("Unsupported database pool")
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;
    for statement in split_sql_statements(migration.up_sqlite) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

// MySQL DDL commits implicitly, so statements run outside a transaction.
async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split SQL into individual statements, dropping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    Ok(pending_count(pool).await? == 0)
}

pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = get_applied_migrations(pool).await?;
    Ok(MIGRATIONS.len().saturating_sub(applied.len()))
}

pub fn get_migration(version: i32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}
