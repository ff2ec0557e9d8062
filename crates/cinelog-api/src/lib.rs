//! API client library for cinelog.
//!
//! Provides the TMDB catalog client and the client for the local
//! json-server store that holds reviews, watchlist entries and users.

mod movie_id;
mod rate_limiter;

/// Local REST store client.
pub mod store;

/// TMDB catalog client.
pub mod tmdb;

pub use movie_id::{InvalidMovieId, MovieId};
