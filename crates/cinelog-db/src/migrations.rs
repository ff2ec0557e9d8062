//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 2;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }
    if version < 2 {
        migrate_v2(conn).context("migration to v2 failed")?;
    }

    if version < CURRENT_VERSION {
        tracing::info!(from = version, to = CURRENT_VERSION, "cache schema migrated");
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create the `movie_cache` table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS movie_cache (
            movie_id        INTEGER PRIMARY KEY,
            title           TEXT NOT NULL,
            overview        TEXT NOT NULL DEFAULT '',
            poster_path     TEXT,
            backdrop_path   TEXT,
            release_date    TEXT,
            vote_average    REAL NOT NULL DEFAULT 0,
            cached_at       INTEGER NOT NULL
        );",
    )
    .context("failed to create movie_cache table")?;

    Ok(())
}

/// Migration to v2: add `last_accessed` for LRU eviction and backfill it.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "ALTER TABLE movie_cache ADD COLUMN last_accessed INTEGER NOT NULL DEFAULT 0;
         UPDATE movie_cache SET last_accessed = cached_at;
         CREATE INDEX IF NOT EXISTS idx_movie_cache_last_accessed ON movie_cache(last_accessed);",
    )
    .context("failed to add last_accessed column")?;

    Ok(())
}
