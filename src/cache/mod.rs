//! In-memory listing cache backed by moka
//!
//! Values are stored as JSON so any serializable listing can be cached.
//! Entries expire after the configured TTL and can be dropped in bulk by
//! key prefix when the underlying data changes.
//!
//! Every prefix invalidation bumps a generation counter. A reader that
//! loaded its value before an invalidation stores it with
//! [`Cache::set_if_current`], which refuses values from an older generation.

use anyhow::{Context, Result};
use moka::future::Cache as MokaCache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub struct Cache {
    inner: MokaCache<String, Arc<String>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("entry_count", &self.inner.entry_count())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Cache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self {
            inner,
            generation: AtomicU64::new(0),
        }
    }

    /// Number of prefix invalidations so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.inner.get(key).await {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .with_context(|| format!("Failed to deserialize cache entry '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        self.inner.insert(key.to_string(), Arc::new(json)).await;
        Ok(())
    }

    /// Store `value` only if no invalidation happened since `generation`
    /// was read; returns whether the value was kept.
    pub async fn set_if_current<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        generation: u64,
    ) -> Result<bool> {
        if self.generation() != generation {
            return Ok(false);
        }
        self.set(key, value).await?;
        // An invalidation between the check and the insert may have been
        // registered before the entry existed
        if self.generation() != generation {
            self.inner.invalidate(key).await;
            return Ok(false);
        }
        Ok(true)
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let prefix = prefix.to_string();
        self.inner
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Failed to invalidate cache entries: {}", e))
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<Cache> {
    Arc::new(Cache::new(
        config.capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}
