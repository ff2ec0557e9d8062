//! TMDB catalog client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints (details,
//! credits, similar titles, videos) and composes image URLs.

mod api;
mod client;
mod image;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, TmdbClient, TmdbClientBuilder};
pub use image::{DEFAULT_IMAGE_BASE_URL, ImageSize, image_url};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    TmdbCastMember, TmdbCredits, TmdbErrorResponse, TmdbGenre, TmdbMovieDetails,
    TmdbMovieSummary, TmdbSimilarResponse, TmdbVideo, TmdbVideosResponse,
};
