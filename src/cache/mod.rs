//! In-memory feed cache shared by every widget built from one
//! [`AppContext`](crate::app::AppContext).
//!
//! Entries never leave the map on their own: an expired entry reads as a miss
//! and stays until it is overwritten or the cache is cleared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sha2::{Digest, Sha256};

use crate::app::Clock;
use crate::config::Configuration;
use crate::domain::{CurrentPostContext, RawFeedResponse};

const KEY_LEN: usize = 32;

/// Deterministic key for (origin, labels, max posts). Label order does not
/// matter.
pub fn cache_key(origin: &str, labels: &[String], max_posts: usize) -> String {
    let mut labels = labels.to_vec();
    labels.sort();

    let mut hasher = Sha256::new();
    hasher.update(origin.as_bytes());
    hasher.update([0u8]);
    hasher.update(max_posts.to_string().as_bytes());
    for label in &labels {
        hasher.update([0u8]);
        hasher.update(label.as_bytes());
    }

    let mut key = hex::encode(hasher.finalize());
    key.truncate(KEY_LEN);
    key
}

pub fn cache_key_for(config: &Configuration, context: &CurrentPostContext) -> String {
    cache_key(config.blog_origin(), &context.labels, config.max_posts())
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: RawFeedResponse,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
        now - self.stored_at < max_age
    }
}

pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// The cached payload, if it was stored less than `max_age` ago.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<RawFeedResponse> {
        let now = self.clock.now();
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, max_age) => {
                tracing::debug!("Cache hit for {}", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                tracing::debug!("Cache entry for {} expired", key);
                None
            }
            None => {
                tracing::debug!("Cache miss for {}", key);
                None
            }
        }
    }

    pub fn set(&self, key: &str, payload: RawFeedResponse) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            stored_at: self.clock.now(),
        };
        self.lock().insert(key.to_string(), entry);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
