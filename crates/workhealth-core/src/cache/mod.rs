//! Insight cache: key derivation, entry validity and storage.
//!
//! An entry may be reused only while its key matches the freshly derived key
//! for the request and it is at most [`CACHE_TTL_HOURS`] old. Both checks run
//! on every read; there is no background expiry.

pub mod key;
pub mod store;

pub use key::InsightCacheKeyDeriver;
pub use store::{InsightCache, MemoryInsightCache, SqliteInsightCache};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::InsightSet;

/// Maximum age of a reusable entry.
pub const CACHE_TTL_HOURS: i64 = 4;

/// Entries kept per user before the oldest are evicted.
pub const DEFAULT_CAPACITY_PER_USER: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub cache_key: String,
    pub insights: InsightSet,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        cache_key: impl Into<String>,
        insights: InsightSet,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            cache_key: cache_key.into(),
            insights,
            timestamp,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// Within the TTL. Entries stamped in the future are not trusted.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = self.age(now);
        age >= Duration::zero() && age <= Duration::hours(CACHE_TTL_HOURS)
    }

    /// Key matches and entry is fresh.
    pub fn is_valid(&self, expected_key: &str, now: DateTime<Utc>) -> bool {
        self.cache_key == expected_key && self.is_fresh(now)
    }
}
