//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{TmdbCredits, TmdbMovieDetails, TmdbSimilarResponse, TmdbVideosResponse};
use crate::MovieId;

/// Read-only movie catalog operations.
///
/// Abstracts the remote catalog so the detail aggregator can be tested
/// against a mock. Uses `trait_variant::make` to generate a `Send`-bound
/// async trait.
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches the core detail record of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_details(&self, id: MovieId, language: &str) -> Result<TmdbMovieDetails>;

    /// Fetches cast and crew of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_credits(&self, id: MovieId, language: &str) -> Result<TmdbCredits>;

    /// Fetches titles similar to a movie (first page).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_similar(&self, id: MovieId, language: &str) -> Result<TmdbSimilarResponse>;

    /// Fetches videos (trailers, teasers, clips) attached to a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_videos(&self, id: MovieId, language: &str) -> Result<TmdbVideosResponse>;
}
