//! Movie detail aggregation, local response cache, watchlist toggle,
//! review board and login session.
//!
//! Remote collaborators are injected through the `Local*` traits of
//! `cinelog-api`, so every operation here can run against mocks.

pub mod cache;
pub mod detail;
pub mod error;
pub mod model;
pub mod reviews;
pub mod session;
pub mod watchlist;

pub use cache::{CachePolicy, CacheStats, DetailCache, SqliteDetailCache};
pub use detail::{CAST_LIMIT, DetailAggregator, select_trailer};
pub use error::{AuthError, DetailError, ReviewError, ValidationIssue, WatchlistError};
pub use model::{
    CastEntry, EnrichmentCategory, EnrichmentFailure, MovieDetailRecord, MovieDetailView,
    SimilarTitleSummary, TrailerReference,
};
pub use reviews::{DEFAULT_AUTHOR, ReviewBoard, ReviewDraft, today};
pub use session::{Session, SessionFile, login, register};
pub use watchlist::WatchlistState;
