//! Watchlist membership toggle.

use cinelog_api::MovieId;
use cinelog_api::store::{LocalWatchlistStore, NewWatchlistRecord, RecordId, WatchlistRecord};
use tracing::instrument;

use crate::error::WatchlistError;
use crate::model::MovieDetailRecord;

/// Whether a movie is on the watchlist.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchlistState {
    /// Saved as the given store record.
    Saved(WatchlistRecord),
    /// Not on the watchlist.
    NotSaved,
}

impl WatchlistState {
    /// Returns `true` when saved.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Builds the creation payload for a movie.
fn new_entry(movie: &MovieDetailRecord, user_id: Option<&RecordId>) -> NewWatchlistRecord {
    NewWatchlistRecord {
        movie_id: movie.id,
        title: movie.title.clone(),
        poster_path: movie.poster_path.clone(),
        release_date: movie.release_date_string(),
        vote_average: Some(movie.vote_average),
        user_id: user_id.cloned(),
    }
}

/// Reads the current state of `movie_id` in `owner`'s watchlist
/// (`None` for the guest list).
///
/// # Errors
///
/// Returns [`WatchlistError::StoreOperationFailed`] if the store request fails.
#[instrument(skip_all, fields(movie_id = %movie_id))]
pub async fn load_state(
    store: &(impl LocalWatchlistStore + Sync),
    movie_id: MovieId,
    owner: Option<&RecordId>,
) -> Result<WatchlistState, WatchlistError> {
    let found = store
        .find_watchlist(movie_id, owner)
        .await
        .map_err(WatchlistError::StoreOperationFailed)?;
    Ok(found.map_or(WatchlistState::NotSaved, WatchlistState::Saved))
}

/// Lists `owner`'s watchlist entries.
///
/// # Errors
///
/// Returns [`WatchlistError::StoreOperationFailed`] if the store request fails.
#[instrument(skip_all)]
pub async fn list(
    store: &(impl LocalWatchlistStore + Sync),
    owner: Option<&RecordId>,
) -> Result<Vec<WatchlistRecord>, WatchlistError> {
    store
        .list_watchlist(owner)
        .await
        .map_err(WatchlistError::StoreOperationFailed)
}

/// Flips the watchlist membership of `movie` and returns the new state.
///
/// `state` is only read; on error the caller keeps it unchanged. New entries
/// are stamped with `user_id`. Saving a movie that the same user already
/// holds adopts the existing record instead of creating a duplicate.
///
/// # Errors
///
/// Returns [`WatchlistError::StoreOperationFailed`] if any store request fails.
#[instrument(skip_all, fields(movie_id = %movie.id, saved = state.is_saved()))]
pub async fn toggle(
    store: &(impl LocalWatchlistStore + Sync),
    state: &WatchlistState,
    movie: &MovieDetailRecord,
    user_id: Option<&RecordId>,
) -> Result<WatchlistState, WatchlistError> {
    match state {
        WatchlistState::Saved(record) => {
            store
                .delete_watchlist(&record.id)
                .await
                .map_err(WatchlistError::StoreOperationFailed)?;
            tracing::info!(record_id = %record.id, "removed from watchlist");
            Ok(WatchlistState::NotSaved)
        }
        WatchlistState::NotSaved => {
            let existing = store
                .find_watchlist(movie.id, user_id)
                .await
                .map_err(WatchlistError::StoreOperationFailed)?;
            if let Some(record) = existing {
                tracing::info!(record_id = %record.id, "already on watchlist, adopting record");
                return Ok(WatchlistState::Saved(record));
            }

            let created = store
                .create_watchlist(&new_entry(movie, user_id))
                .await
                .map_err(WatchlistError::StoreOperationFailed)?;
            let canonical = store
                .find_watchlist(movie.id, user_id)
                .await
                .map_err(WatchlistError::StoreOperationFailed)?
                .unwrap_or(created);
            tracing::info!(record_id = %canonical.id, "added to watchlist");
            Ok(WatchlistState::Saved(canonical))
        }
    }
}
