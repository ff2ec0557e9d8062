//! Store trait definitions.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{NewReview, NewUser, NewWatchlistRecord, RecordId, Review, User, WatchlistRecord};
use crate::MovieId;

/// Review resource operations.
///
/// The store is the source of truth for review identifiers.
#[trait_variant::make(ReviewStore: Send)]
pub trait LocalReviewStore {
    /// Lists reviews of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn list_reviews(&self, movie_id: MovieId) -> Result<Vec<Review>>;

    /// Creates a review and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn create_review(&self, review: &NewReview) -> Result<Review>;

    /// Deletes a review by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn delete_review(&self, id: &RecordId) -> Result<()>;
}

/// Watchlist resource operations.
///
/// Entries belong to the user recorded in `userId`. `owner = None` addresses
/// the guest list, i.e. entries without a user.
#[trait_variant::make(WatchlistStore: Send)]
pub trait LocalWatchlistStore {
    /// Finds the owner's watchlist entry of a movie, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn find_watchlist(
        &self,
        movie_id: MovieId,
        owner: Option<&RecordId>,
    ) -> Result<Option<WatchlistRecord>>;

    /// Lists the owner's watchlist entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn list_watchlist(&self, owner: Option<&RecordId>) -> Result<Vec<WatchlistRecord>>;

    /// Creates a watchlist entry and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn create_watchlist(&self, record: &NewWatchlistRecord) -> Result<WatchlistRecord>;

    /// Deletes a watchlist entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn delete_watchlist(&self, id: &RecordId) -> Result<()>;
}

/// User resource operations backing the login session.
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Finds the user matching both email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn find_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>>;

    /// Returns whether a user with this email is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Registers a user and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn create_user(&self, user: &NewUser) -> Result<User>;
}
