//! event-calendar - print the current event listings as JSON

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_calendar::{
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxDiaryEventRepository, SqlxEventLocationRepository, SqlxEventRepository,
            SqlxEventStatusRepository, SqlxEventTypeRepository, SqlxRevisionRepository,
        },
    },
    services::{self, DiaryEventService, EventService, RevisionService},
};

const USAGE: &str = "usage: event-calendar [published|promoted|diary|all]";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON listing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_calendar=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let listing = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    if !matches!(listing.as_str(), "published" | "promoted" | "diary" | "all") {
        bail!("Unknown listing '{}'\n{}", listing, USAGE);
    }

    let config_path = std::env::var("EVENTS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yml"));
    let config = Config::load_with_env(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path.display());

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let cache = create_cache(&config.cache);
    let revisions = Arc::new(RevisionService::new(SqlxRevisionRepository::boxed(pool.clone())));
    let events = EventService::new(
        SqlxEventRepository::boxed(pool.clone()),
        SqlxEventTypeRepository::boxed(pool.clone()),
        SqlxEventLocationRepository::boxed(pool.clone()),
        SqlxEventStatusRepository::boxed(pool.clone()),
        revisions.clone(),
        cache,
        config.calendar.clone(),
    );
    let diary = DiaryEventService::new(SqlxDiaryEventRepository::boxed(pool.clone()), revisions);

    let today = services::today();
    let output = match listing.as_str() {
        "published" => serde_json::to_value(events.published_on(today).await?)?,
        "promoted" => serde_json::to_value(events.promoted_on(today).await?)?,
        "diary" => serde_json::to_value(diary.upcoming(today).await?)?,
        _ => serde_json::json!({
            "today": today,
            "windows": events.windows_for(today),
            "published": events.published_on(today).await?,
            "promoted": events.promoted_on(today).await?,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    pool.close().await;
    Ok(())
}
