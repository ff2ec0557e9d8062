//! Database module for the local response cache.
//!
//! Uses `rusqlite` (bundled `SQLite`) to persist movie detail payloads
//! fetched from the catalog so that they survive restarts.

mod connection;
mod migrations;
/// Movie detail cache CRUD operations.
pub mod movie_cache;
mod user_dirs;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, open_db_at, resolve_data_dir};
#[allow(clippy::module_name_repetitions)]
pub use movie_cache::{
    CacheCounts, CachedMovie, clear_movies, count_movies, delete_stale_movies, evict_lru,
    load_movie, touch_movie, upsert_movie,
};
pub use user_dirs::{APP_DIR_NAME, UserDir};
