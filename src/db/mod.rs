//! Database layer
//!
//! SQLite (default, single file or in-memory) and MySQL are supported behind
//! the [`DatabasePool`] trait; the driver is chosen by configuration.
//!
//! ```ignore
//! use event_calendar::config::DatabaseConfig;
//! use event_calendar::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
