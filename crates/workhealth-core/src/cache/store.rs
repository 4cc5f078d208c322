//! Insight cache storage.
//!
//! Entries are addressed by `(user_id, tab, cache_key)`. Writing the same
//! address again replaces the entry (last write wins). Each user keeps at most
//! `capacity` entries; the oldest are evicted first.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{CacheEntry, DEFAULT_CAPACITY_PER_USER};
use crate::error::{CacheReadError, CoreError, Result};
use crate::insights::{InsightSet, TabType};
use crate::storage::data_dir;

/// Storage for generated insights.
pub trait InsightCache: Send + Sync {
    /// Entry stored under exactly this key, regardless of age.
    fn get(
        &self,
        user_id: &str,
        tab: TabType,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, CacheReadError>;

    /// Store an entry, replacing any entry with the same key.
    fn put(&self, user_id: &str, tab: TabType, entry: CacheEntry) -> Result<()>;

    /// All readable entries of a user, newest first.
    fn entries(&self, user_id: &str) -> Result<Vec<(TabType, CacheEntry)>, CacheReadError>;

    /// Remove all entries of a user. Returns how many were removed.
    fn clear(&self, user_id: &str) -> Result<usize>;

    /// Entry that is valid for `expected_key` at `now`, if any.
    fn lookup(
        &self,
        user_id: &str,
        tab: TabType,
        expected_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, CacheReadError> {
        let entry = self.get(user_id, tab, expected_key)?;
        Ok(entry.filter(|e| {
            let valid = e.is_valid(expected_key, now);
            if !valid {
                debug!(
                    user_id,
                    %tab,
                    age_minutes = e.age(now).num_minutes(),
                    "cached insights expired"
                );
            }
            valid
        }))
    }
}

type UserEntries = HashMap<(TabType, String), CacheEntry>;

/// Process-local cache.
#[derive(Debug)]
pub struct MemoryInsightCache {
    capacity: usize,
    users: Mutex<HashMap<String, UserEntries>>,
}

impl Default for MemoryInsightCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_PER_USER)
    }
}

impl MemoryInsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            users: Mutex::new(HashMap::new()),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserEntries>>, CacheReadError> {
        self.users
            .lock()
            .map_err(|_| CacheReadError::Storage("cache lock poisoned".to_string()))
    }
}

impl InsightCache for MemoryInsightCache {
    fn get(
        &self,
        user_id: &str,
        tab: TabType,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, CacheReadError> {
        let users = self.lock()?;
        Ok(users
            .get(user_id)
            .and_then(|entries| entries.get(&(tab, cache_key.to_string())))
            .cloned())
    }

    fn put(&self, user_id: &str, tab: TabType, entry: CacheEntry) -> Result<()> {
        let mut users = self.lock()?;
        let entries = users.entry(user_id.to_string()).or_default();
        entries.insert((tab, entry.cache_key.clone()), entry);

        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.timestamp)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
        Ok(())
    }

    fn entries(&self, user_id: &str) -> Result<Vec<(TabType, CacheEntry)>, CacheReadError> {
        let users = self.lock()?;
        let mut out: Vec<(TabType, CacheEntry)> = users
            .get(user_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|((tab, _), e)| (*tab, e.clone()))
                    .collect()
            })
            .unwrap_or_default();
        out.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        Ok(out)
    }

    fn clear(&self, user_id: &str) -> Result<usize> {
        let mut users = self.lock()?;
        Ok(users.remove(user_id).map(|e| e.len()).unwrap_or(0))
    }
}

/// SQLite-backed cache that survives restarts.
pub struct SqliteInsightCache {
    conn: Mutex<Connection>,
    capacity: usize,
}

impl SqliteInsightCache {
    /// Open the cache at `<data dir>/workhealth.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(capacity: usize) -> Result<Self> {
        let path = data_dir()?.join("workhealth.db");
        Self::open_at(&path, capacity)
    }

    /// Open (or create) the cache database at `path`.
    pub fn open_at(path: &Path, capacity: usize) -> Result<Self> {
        let conn = Connection::open(path).map_err(CacheReadError::from)?;
        Self::with_connection(conn, capacity)
    }

    /// Open an in-memory cache.
    pub fn open_memory(capacity: usize) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(CacheReadError::from)?;
        Self::with_connection(conn, capacity)
    }

    fn with_connection(conn: Connection, capacity: usize) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS insight_cache (
                user_id     TEXT NOT NULL,
                tab         TEXT NOT NULL,
                cache_key   TEXT NOT NULL,
                insights    TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, tab, cache_key)
            );
            CREATE INDEX IF NOT EXISTS idx_insight_cache_user_created
                ON insight_cache(user_id, created_at);",
        )
        .map_err(CacheReadError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
            capacity: capacity.max(1),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheReadError> {
        self.conn
            .lock()
            .map_err(|_| CacheReadError::Storage("cache lock poisoned".to_string()))
    }
}

fn write_err(err: rusqlite::Error) -> CoreError {
    CoreError::CacheWrite(err.to_string())
}

fn decode_row(
    user_id: &str,
    tab: &str,
    cache_key: String,
    insights: &str,
    created_at: &str,
) -> Result<CacheEntry, CacheReadError> {
    let corrupt = |message: String| CacheReadError::Corrupt {
        user_id: user_id.to_string(),
        tab: tab.to_string(),
        message,
    };
    let insights: InsightSet =
        serde_json::from_str(insights).map_err(|e| corrupt(e.to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| corrupt(format!("bad timestamp '{created_at}': {e}")))?
        .with_timezone(&Utc);
    Ok(CacheEntry {
        cache_key,
        insights,
        timestamp,
    })
}

impl InsightCache for SqliteInsightCache {
    fn get(
        &self,
        user_id: &str,
        tab: TabType,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, CacheReadError> {
        let conn = self.lock()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT insights, created_at FROM insight_cache
                 WHERE user_id = ?1 AND tab = ?2 AND cache_key = ?3",
                params![user_id, tab.as_str(), cache_key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(insights, created_at)| {
            decode_row(user_id, tab.as_str(), cache_key.to_string(), &insights, &created_at)
        })
        .transpose()
    }

    fn put(&self, user_id: &str, tab: TabType, entry: CacheEntry) -> Result<()> {
        let insights = serde_json::to_string(&entry.insights)?;
        let created_at = entry
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO insight_cache (user_id, tab, cache_key, insights, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, tab.as_str(), entry.cache_key, insights, created_at],
        )
        .map_err(write_err)?;

        let evicted = conn
            .execute(
                "DELETE FROM insight_cache
                 WHERE user_id = ?1 AND rowid NOT IN (
                     SELECT rowid FROM insight_cache
                     WHERE user_id = ?1
                     ORDER BY created_at DESC
                     LIMIT ?2
                 )",
                params![user_id, self.capacity as i64],
            )
            .map_err(write_err)?;
        if evicted > 0 {
            debug!(user_id, evicted, "evicted old cached insights");
        }
        Ok(())
    }

    fn entries(&self, user_id: &str) -> Result<Vec<(TabType, CacheEntry)>, CacheReadError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT tab, cache_key, insights, created_at FROM insight_cache
             WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (tab, cache_key, insights, created_at) = row?;
            // corrupt rows are logged and skipped
            let decoded = tab
                .parse::<TabType>()
                .map_err(|message| CacheReadError::Corrupt {
                    user_id: user_id.to_string(),
                    tab: tab.clone(),
                    message,
                })
                .and_then(|parsed| {
                    decode_row(user_id, &tab, cache_key, &insights, &created_at)
                        .map(|entry| (parsed, entry))
                });
            match decoded {
                Ok(item) => out.push(item),
                Err(e) => warn!(user_id, tab = %tab, "skipping corrupt cache row: {}", e),
            }
        }
        Ok(out)
    }

    fn clear(&self, user_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM insight_cache WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(write_err)
    }
}
