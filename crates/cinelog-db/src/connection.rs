//! Database connection management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;
use super::user_dirs::UserDir;

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "cinelog.db";

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the data directory.
///
/// - If `dir` is `Some`, uses it verbatim.
/// - Otherwise uses [`UserDir::Data`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_data_dir(dir: Option<&PathBuf>) -> Result<PathBuf> {
    dir.map_or_else(|| UserDir::Data.resolve(), |d| Ok(d.clone()))
}

/// Opens (or creates) `cinelog.db` in the data directory and runs migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let data_dir = resolve_data_dir(dir)?;
    open_db_at(&data_dir.join(DB_FILE_NAME))
}

/// Opens (or creates) the database at an explicit path and runs migrations.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the database
/// cannot be opened, or migrations fail.
pub fn open_db_at(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    let journal_mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to enable WAL journal")?;

    run_migrations(&conn).context("database migration failed")?;

    tracing::debug!(path = %db_path.display(), journal_mode = %journal_mode, "cache database opened");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_open_db_in_temp_dir() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_path_buf();

        // Act
        let conn = open_db(Some(&dir_path)).unwrap();

        // Assert
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert!(version > 0);
        assert!(dir_path.join("cinelog.db").exists());
    }

    #[test]
    fn test_open_db_at_creates_parent_dirs() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        // Act
        open_db_at(&path).unwrap();

        // Assert
        assert!(path.exists());
    }

    #[test]
    fn test_resolve_data_dir_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/cinelog-data");

        // Act
        let path = resolve_data_dir(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/cinelog-data"));
    }
}
