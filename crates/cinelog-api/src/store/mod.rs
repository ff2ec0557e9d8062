//! Local REST store client module.
//!
//! Talks to the json-server mock backend that owns reviews, watchlist
//! entries and user accounts.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{
    LocalReviewStore, LocalUserStore, LocalWatchlistStore, ReviewStore, UserStore, WatchlistStore,
};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, StoreClient, StoreClientBuilder};
pub use types::{NewReview, NewUser, NewWatchlistRecord, RecordId, Review, User, WatchlistRecord};
