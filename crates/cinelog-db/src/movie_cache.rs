//! Movie detail cache CRUD operations.
//!
//! Timestamps are unix seconds supplied by the caller, which keeps the
//! freshness policy out of the storage layer.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};

/// A cached movie detail payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMovie {
    /// TMDB movie ID (primary key).
    pub movie_id: u64,
    /// Title.
    pub title: String,
    /// Overview text.
    pub overview: String,
    /// Poster image path fragment (nullable).
    pub poster_path: Option<String>,
    /// Backdrop image path fragment (nullable).
    pub backdrop_path: Option<String>,
    /// Release date `YYYY-MM-DD` (nullable).
    pub release_date: Option<String>,
    /// Vote average (0-10).
    pub vote_average: f64,
    /// Capture timestamp (unix seconds).
    pub cached_at: i64,
    /// Last read or write (unix seconds).
    pub last_accessed: i64,
}

/// Entry counts split by freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheCounts {
    /// All rows.
    pub total: usize,
    /// Rows captured at or after the cutoff.
    pub fresh: usize,
    /// Rows captured before the cutoff.
    pub stale: usize,
}

const SELECT_COLUMNS: &str = "movie_id, title, overview, poster_path, backdrop_path,
     release_date, vote_average, cached_at, last_accessed";

fn map_row(row: &Row<'_>) -> rusqlite::Result<CachedMovie> {
    Ok(CachedMovie {
        movie_id: row.get(0)?,
        title: row.get(1)?,
        overview: row.get(2)?,
        poster_path: row.get(3)?,
        backdrop_path: row.get(4)?,
        release_date: row.get(5)?,
        vote_average: row.get(6)?,
        cached_at: row.get(7)?,
        last_accessed: row.get(8)?,
    })
}

/// Loads one cached movie regardless of age.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_movie(conn: &Connection, movie_id: u64) -> Result<Option<CachedMovie>> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM movie_cache WHERE movie_id = ?1"),
        [movie_id],
        map_row,
    )
    .optional()
    .with_context(|| format!("failed to load cached movie {movie_id}"))
}

/// Inserts or overwrites a cached movie.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn upsert_movie(conn: &Connection, movie: &CachedMovie) -> Result<()> {
    conn.execute(
        "INSERT INTO movie_cache (
            movie_id, title, overview, poster_path, backdrop_path,
            release_date, vote_average, cached_at, last_accessed
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(movie_id) DO UPDATE SET
            title = excluded.title,
            overview = excluded.overview,
            poster_path = excluded.poster_path,
            backdrop_path = excluded.backdrop_path,
            release_date = excluded.release_date,
            vote_average = excluded.vote_average,
            cached_at = excluded.cached_at,
            last_accessed = excluded.last_accessed",
        rusqlite::params![
            movie.movie_id,
            movie.title,
            movie.overview,
            movie.poster_path,
            movie.backdrop_path,
            movie.release_date,
            movie.vote_average,
            movie.cached_at,
            movie.last_accessed,
        ],
    )
    .with_context(|| format!("failed to upsert cached movie {}", movie.movie_id))?;
    Ok(())
}

/// Records a read access. Returns `false` if the row does not exist.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn touch_movie(conn: &Connection, movie_id: u64, at: i64) -> Result<bool> {
    let rows = conn
        .execute(
            "UPDATE movie_cache SET last_accessed = ?1 WHERE movie_id = ?2",
            rusqlite::params![at, movie_id],
        )
        .with_context(|| format!("failed to touch cached movie {movie_id}"))?;
    Ok(rows > 0)
}

/// Deletes the least recently accessed rows beyond `capacity`, never
/// `keep_id`. The kept row counts toward the capacity, so at least one row
/// survives even when `capacity` is 0. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn evict_lru(conn: &Connection, capacity: usize, keep_id: u64) -> Result<usize> {
    let others = i64::try_from(capacity.saturating_sub(1)).unwrap_or(i64::MAX);
    conn.execute(
        "DELETE FROM movie_cache WHERE movie_id IN (
            SELECT movie_id FROM movie_cache
            WHERE movie_id != ?2
            ORDER BY last_accessed DESC, movie_id DESC
            LIMIT -1 OFFSET ?1
        )",
        rusqlite::params![others, keep_id],
    )
    .context("failed to evict cached movies")
}

/// Deletes rows captured before `cutoff`. Returns the number removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_stale_movies(conn: &Connection, cutoff: i64) -> Result<usize> {
    conn.execute("DELETE FROM movie_cache WHERE cached_at < ?1", [cutoff])
        .context("failed to delete stale cached movies")
}

/// Counts rows, splitting them at `cutoff`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_movies(conn: &Connection, cutoff: i64) -> Result<CacheCounts> {
    let (total, fresh): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), COALESCE(SUM(cached_at >= ?1), 0) FROM movie_cache",
            [cutoff],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("failed to count cached movies")?;

    let total = usize::try_from(total).context("negative row count")?;
    let fresh = usize::try_from(fresh).context("negative row count")?;
    Ok(CacheCounts {
        total,
        fresh,
        stale: total.saturating_sub(fresh),
    })
}

/// Deletes every row. Returns the number removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn clear_movies(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM movie_cache", [])
        .context("failed to clear movie cache")
}
