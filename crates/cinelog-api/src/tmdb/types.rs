//! TMDB API response types for the movie endpoints.

use serde::Deserialize;

// --- Movie details ---

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Overview text (may be empty).
    #[serde(default)]
    pub overview: Option<String>,
    /// Tagline (may be empty).
    #[serde(default)]
    pub tagline: Option<String>,
    /// Poster image path fragment.
    pub poster_path: Option<String>,
    /// Backdrop image path fragment.
    pub backdrop_path: Option<String>,
    /// Release date (`YYYY-MM-DD`, empty string, or null).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Vote average (0-10).
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

/// A genre entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Credits ---

/// Response from `movie/{movie_id}/credits` endpoint.
///
/// Crew data is not deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    /// TMDB movie ID.
    pub id: u64,
    /// Cast in billing order.
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

/// A single cast member.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    /// TMDB person ID.
    pub id: u64,
    /// Actor display name.
    pub name: String,
    /// Character name.
    #[serde(default)]
    pub character: Option<String>,
    /// Profile image path fragment.
    #[serde(default)]
    pub profile_path: Option<String>,
    /// Billing order.
    #[serde(default)]
    pub order: Option<u32>,
}

// --- Similar ---

/// Response from `movie/{movie_id}/similar` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSimilarResponse {
    /// Current page number.
    pub page: u32,
    /// Similar titles.
    pub results: Vec<TmdbMovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// Condensed movie entry used in list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
}

// --- Videos ---

/// Response from `movie/{movie_id}/videos` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideosResponse {
    /// TMDB movie ID.
    pub id: u64,
    /// Videos in the order returned by the API.
    pub results: Vec<TmdbVideo>,
}

/// A single video entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    /// Site-specific video key (YouTube ID for `site == "YouTube"`).
    pub key: String,
    /// Hosting site (`"YouTube"`, `"Vimeo"`, ...).
    pub site: String,
    /// Video type (`"Trailer"`, `"Teaser"`, `"Clip"`, ...).
    #[serde(rename = "type")]
    pub video_type: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Official flag.
    #[serde(default)]
    pub official: Option<bool>,
}

// --- Errors ---

/// Error body returned by TMDB on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB status code.
    pub status_code: u32,
    /// Human-readable message.
    pub status_message: String,
    /// Always `false` for errors.
    #[serde(default)]
    pub success: bool,
}
