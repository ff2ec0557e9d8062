//! Local response cache for core movie records.
//!
//! Reads never fail: storage faults are logged and read as a miss. Entries
//! older than the TTL read as absent, and writes evict least recently used
//! entries once the table exceeds its capacity.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use cinelog_api::MovieId;
use rusqlite::Connection;

use crate::model::MovieDetailRecord;

/// Default entry lifetime in days.
pub const DEFAULT_TTL_DAYS: u32 = 7;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 500;

/// Key-value cache of core movie records.
pub trait DetailCache {
    /// Returns the fresh record for `id`, or `None` on miss, expiry or fault.
    fn get(&self, id: MovieId) -> Option<MovieDetailRecord>;

    /// Stores `record` under `id`, replacing any previous entry.
    fn put(&self, id: MovieId, record: &MovieDetailRecord);
}

/// Lifetime and size bounds of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum age of a readable entry.
    pub ttl: TimeDelta,
    /// Maximum number of entries kept after a write. At least 1.
    pub capacity: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_TTL_DAYS, DEFAULT_CAPACITY)
    }
}

impl CachePolicy {
    /// Creates a policy with a TTL in whole days. A zero `capacity` is
    /// raised to 1 so the entry just written always survives eviction.
    #[must_use]
    pub fn from_days(ttl_days: u32, capacity: usize) -> Self {
        Self {
            ttl: TimeDelta::days(i64::from(ttl_days)),
            capacity: capacity.max(1),
        }
    }

    /// Returns the earliest `cached_at` that is still fresh at `now`.
    fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.ttl.num_seconds())
    }
}

/// Entry counts reported by [`SqliteDetailCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// All entries.
    pub total: usize,
    /// Entries within the TTL.
    pub fresh: usize,
    /// Entries past the TTL, removable with [`SqliteDetailCache::prune`].
    pub stale: usize,
}

/// SQLite-backed [`DetailCache`].
#[derive(Debug)]
pub struct SqliteDetailCache {
    conn: Mutex<Connection>,
    policy: CachePolicy,
}

impl SqliteDetailCache {
    /// Wraps an open connection whose schema is already migrated.
    #[must_use]
    pub const fn new(conn: Connection, policy: CachePolicy) -> Self {
        Self {
            conn: Mutex::new(conn),
            policy,
        }
    }

    /// Opens `cinelog.db` in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&PathBuf>, policy: CachePolicy) -> Result<Self> {
        let conn = cinelog_db::open_db(dir).context("failed to open response cache")?;
        Ok(Self::new(conn, policy))
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("cache connection lock poisoned"))
    }

    fn read_at(&self, id: MovieId, now: i64) -> Result<Option<MovieDetailRecord>> {
        let conn = self.lock()?;
        let Some(row) = cinelog_db::load_movie(&conn, id.get())? else {
            return Ok(None);
        };
        if row.cached_at < self.policy.cutoff(now) {
            tracing::debug!(movie_id = %id, cached_at = row.cached_at, "cache entry expired");
            return Ok(None);
        }
        cinelog_db::touch_movie(&conn, id.get(), now)?;
        let record = MovieDetailRecord::try_from(row).context("corrupt cache row")?;
        Ok(Some(record))
    }

    fn write_at(&self, record: &MovieDetailRecord, now: i64) -> Result<usize> {
        let conn = self.lock()?;
        cinelog_db::upsert_movie(&conn, &record.to_cached(now))?;
        cinelog_db::evict_lru(&conn, self.policy.capacity, record.id.get())
    }

    pub(crate) fn get_at(&self, id: MovieId, now: i64) -> Option<MovieDetailRecord> {
        match self.read_at(id, now) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %format!("{e:#}"), "cache read failed");
                None
            }
        }
    }

    pub(crate) fn put_at(&self, id: MovieId, record: &MovieDetailRecord, now: i64) {
        match self.write_at(record, now) {
            Ok(0) => {}
            Ok(evicted) => {
                tracing::debug!(movie_id = %id, evicted, "cache evicted least recently used entries");
            }
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %format!("{e:#}"), "cache write failed");
            }
        }
    }

    /// Removes entries past the TTL. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune(&self) -> Result<usize> {
        let conn = self.lock()?;
        let cutoff = self.policy.cutoff(Utc::now().timestamp());
        cinelog_db::delete_stale_movies(&conn, cutoff)
    }

    /// Removes every entry. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        cinelog_db::clear_movies(&conn)
    }

    /// Counts entries by freshness.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;
        let cutoff = self.policy.cutoff(Utc::now().timestamp());
        let counts = cinelog_db::count_movies(&conn, cutoff)?;
        Ok(CacheStats {
            total: counts.total,
            fresh: counts.fresh,
            stale: counts.stale,
        })
    }
}

impl DetailCache for SqliteDetailCache {
    fn get(&self, id: MovieId) -> Option<MovieDetailRecord> {
        self.get_at(id, Utc::now().timestamp())
    }

    fn put(&self, id: MovieId, record: &MovieDetailRecord) {
        self.put_at(id, record, Utc::now().timestamp());
    }
}
