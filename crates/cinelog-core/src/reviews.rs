//! Review drafts and the per-movie review board.

use chrono::{DateTime, TimeZone, Utc};
use cinelog_api::MovieId;
use cinelog_api::store::{LocalReviewStore, NewReview, RecordId, Review};
use tracing::instrument;

use crate::error::{ReviewError, ValidationIssue};

/// Author name used when nobody is logged in.
pub const DEFAULT_AUTHOR: &str = "Guest";

/// Accepted rating range.
const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Returns today's UTC date as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    date_stamp(&Utc::now())
}

/// Formats the UTC calendar date of `at`.
fn date_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc).date_naive().format("%Y-%m-%d").to_string()
}

/// Unsubmitted review input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Star rating, valid in `1..=10`.
    pub rating: u8,
    /// Free text, must be non-blank.
    pub comment: String,
}

impl ReviewDraft {
    /// Creates a draft.
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }

    /// Checks the rating range and that the comment is not blank.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationIssue`] found.
    pub fn validate(&self) -> Result<(), ValidationIssue> {
        if !RATING_RANGE.contains(&self.rating) {
            return Err(ValidationIssue::RatingOutOfRange(self.rating));
        }
        if self.comment.trim().is_empty() {
            return Err(ValidationIssue::EmptyComment);
        }
        Ok(())
    }
}

/// Reviews of one movie, updated only after the store confirms a change.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewBoard {
    movie_id: MovieId,
    reviews: Vec<Review>,
}

impl ReviewBoard {
    /// Creates an empty board.
    #[must_use]
    pub const fn new(movie_id: MovieId) -> Self {
        Self {
            movie_id,
            reviews: Vec::new(),
        }
    }

    /// Loads the reviews of `movie_id` from the store.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::StoreOperationFailed`] if the store request fails.
    #[instrument(skip_all, fields(movie_id = %movie_id))]
    pub async fn load(
        store: &(impl LocalReviewStore + Sync),
        movie_id: MovieId,
    ) -> Result<Self, ReviewError> {
        let reviews = store
            .list_reviews(movie_id)
            .await
            .map_err(ReviewError::StoreOperationFailed)?;
        tracing::debug!(count = reviews.len(), "reviews loaded");
        Ok(Self { movie_id, reviews })
    }

    /// Returns the movie this board belongs to.
    #[must_use]
    pub const fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    /// Returns the reviews in store order.
    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Returns the mean rating, or `None` without reviews.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        let count = u32::try_from(self.reviews.len()).ok()?;
        Some(f64::from(sum) / f64::from(count))
    }

    /// Validates `draft`, stores it and appends the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::ValidationFailed`] without contacting the store
    /// if the draft is invalid, or [`ReviewError::StoreOperationFailed`] if
    /// the store rejects it. The board is unchanged on error.
    #[instrument(skip_all, fields(movie_id = %self.movie_id, rating = draft.rating))]
    pub async fn submit(
        &mut self,
        store: &(impl LocalReviewStore + Sync),
        draft: &ReviewDraft,
        author: &str,
        date: &str,
    ) -> Result<Review, ReviewError> {
        draft.validate()?;

        let payload = NewReview {
            movie_id: self.movie_id,
            rating: draft.rating,
            comment: draft.comment.trim().to_owned(),
            user: String::from(author),
            date: String::from(date),
        };
        let stored = store
            .create_review(&payload)
            .await
            .map_err(ReviewError::StoreOperationFailed)?;

        tracing::info!(review_id = %stored.id, "review submitted");
        self.reviews.push(stored.clone());
        Ok(stored)
    }

    /// Deletes a review from the store, then from the board.
    ///
    /// An id not present on the board leaves the list as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::StoreOperationFailed`] if the store request
    /// fails. The board is unchanged on error.
    #[instrument(skip_all, fields(movie_id = %self.movie_id, review_id = %review_id))]
    pub async fn delete(
        &mut self,
        store: &(impl LocalReviewStore + Sync),
        review_id: &RecordId,
    ) -> Result<(), ReviewError> {
        store
            .delete_review(review_id)
            .await
            .map_err(ReviewError::StoreOperationFailed)?;

        let before = self.reviews.len();
        self.reviews.retain(|r| &r.id != review_id);
        tracing::info!(
            removed = before.saturating_sub(self.reviews.len()),
            "review deleted"
        );
        Ok(())
    }
}
