//! Configuration management
//!
//! Configuration is loaded from a YAML file, with environment variables
//! overriding file settings. Missing values are filled with defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Publish/promote window widths
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/events.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached listings
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_capacity() -> u64 {
    1_000
}

fn default_ttl() -> u64 {
    300
}

/// Width of the published and promoted windows, in calendar months
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Published window: `[today, today + published_months]`
    #[serde(default = "default_published_months")]
    pub published_months: u32,
    /// Promoted window: `(today + published_months, today + promoted_months]`
    #[serde(default = "default_promoted_months")]
    pub promoted_months: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            published_months: default_published_months(),
            promoted_months: default_promoted_months(),
        }
    }
}

fn default_published_months() -> u32 {
    2
}

fn default_promoted_months() -> u32 {
    8
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the default configuration.
    /// Invalid YAML is reported with its location.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the file without validating, so overrides can still fix it
    fn read(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Validation runs once, after the overrides are applied.
    ///
    /// Recognised variables:
    /// - EVENTS_DATABASE_DRIVER
    /// - EVENTS_DATABASE_URL
    /// - EVENTS_CACHE_TTL_SECONDS
    /// - EVENTS_PUBLISHED_MONTHS
    /// - EVENTS_PROMOTED_MONTHS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check that the calendar windows are well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        let calendar = &self.calendar;
        if calendar.published_months == 0 {
            return Err(ConfigError::ValidationError(
                "calendar.published_months must be at least 1".to_string(),
            ));
        }
        if calendar.promoted_months <= calendar.published_months {
            return Err(ConfigError::ValidationError(format!(
                "calendar.promoted_months ({}) must be greater than published_months ({})",
                calendar.promoted_months, calendar.published_months
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(driver) = std::env::var("EVENTS_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("EVENTS_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("EVENTS_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(months) = std::env::var("EVENTS_PUBLISHED_MONTHS") {
            if let Ok(months) = months.parse::<u32>() {
                self.calendar.published_months = months;
            }
        }
        if let Ok(months) = std::env::var("EVENTS_PROMOTED_MONTHS") {
            if let Ok(months) = months.parse::<u32>() {
                self.calendar.promoted_months = months;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches EVENTS_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_calendar_strategy() -> impl Strategy<Value = CalendarConfig> {
        (1u32..24, 1u32..24).prop_map(|(published, extra)| CalendarConfig {
            published_months: published,
            promoted_months: published + extra,
        })
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            prop_oneof![Just(DatabaseDriver::Sqlite), Just(DatabaseDriver::Mysql)],
            "[a-z]{1,10}\\.db",
            1u64..100_000,
            1u64..86_400,
            valid_calendar_strategy(),
        )
            .prop_map(|(driver, url, capacity, ttl_seconds, calendar)| Config {
                database: DatabaseConfig { driver, url },
                cache: CacheConfig {
                    capacity,
                    ttl_seconds,
                },
                calendar,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Serializing a valid config to YAML and loading it back preserves every field.
        #[test]
        fn config_yaml_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).unwrap();
            let mut file = tempfile::NamedTempFile::new().unwrap();
            std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();

            let loaded = Config::load(file.path()).unwrap();
            prop_assert_eq!(loaded.database.driver, config.database.driver);
            prop_assert_eq!(loaded.database.url, config.database.url);
            prop_assert_eq!(loaded.cache.capacity, config.cache.capacity);
            prop_assert_eq!(loaded.cache.ttl_seconds, config.cache.ttl_seconds);
            prop_assert_eq!(loaded.calendar, config.calendar);
        }
    }
}
