//! Typed errors surfaced by core operations.

use cinelog_api::MovieId;

/// Failure of [`DetailAggregator::load_detail`](crate::DetailAggregator::load_detail).
#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    /// The core record could not be obtained from cache or catalog.
    #[error("details for movie {id} are unavailable")]
    DetailUnavailable {
        /// Requested movie.
        id: MovieId,
        /// Underlying catalog failure.
        #[source]
        source: anyhow::Error,
    },
    /// A load for the same movie is already running on this aggregator.
    #[error("movie {0} is already being loaded")]
    LoadInProgress(MovieId),
}

/// Reason a review draft was rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// Rating outside `1..=10`.
    #[error("rating must be between 1 and 10 (got {0})")]
    RatingOutOfRange(u8),
    /// Comment is empty after trimming.
    #[error("comment must not be empty")]
    EmptyComment,
}

/// Failure of a review board operation.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The draft failed local validation; no store call was made.
    #[error("invalid review: {0}")]
    ValidationFailed(#[from] ValidationIssue),
    /// The store rejected or failed the request.
    #[error("review store operation failed")]
    StoreOperationFailed(#[source] anyhow::Error),
}

/// Failure of a watchlist operation.
#[derive(Debug, thiserror::Error)]
pub enum WatchlistError {
    /// The store rejected or failed the request.
    #[error("watchlist store operation failed")]
    StoreOperationFailed(#[source] anyhow::Error),
}

/// Failure of a login or registration.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No user matches the email and password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Registration with an email that is already in use.
    #[error("email {0} is already registered")]
    EmailTaken(String),
    /// The store rejected or failed the request.
    #[error("user store operation failed")]
    StoreOperationFailed(#[source] anyhow::Error),
}
