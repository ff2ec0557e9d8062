//! Record types of the local REST store.
//!
//! Field names follow the store's wire format: camelCase for store-owned
//! fields (`movieId`, `userId`), snake_case for fields copied verbatim from
//! TMDB payloads (`poster_path`, `release_date`, `vote_average`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::MovieId;

/// Store-assigned record identifier.
///
/// json-server emits either numbers or strings depending on its version;
/// both are accepted and normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from its textual form.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

// --- Reviews ---

/// A stored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Store-assigned ID.
    pub id: RecordId,
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Star rating (1-10).
    pub rating: u8,
    /// Review text.
    pub comment: String,
    /// Author display name.
    #[serde(default)]
    pub user: String,
    /// Submission date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: String,
}

/// Review payload sent on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Star rating (1-10).
    pub rating: u8,
    /// Review text.
    pub comment: String,
    /// Author display name.
    pub user: String,
    /// Submission date (`YYYY-MM-DD`).
    pub date: String,
}

// --- Watchlist ---

/// A stored watchlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRecord {
    /// Store-assigned ID.
    pub id: RecordId,
    /// Saved movie.
    pub movie_id: MovieId,
    /// Movie title at the time of saving.
    pub title: String,
    /// Poster image path fragment.
    #[serde(default, rename = "poster_path")]
    pub poster_path: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default, rename = "release_date")]
    pub release_date: Option<String>,
    /// Vote average at the time of saving.
    #[serde(default, rename = "vote_average")]
    pub vote_average: Option<f64>,
    /// Owning user, if the entry was saved while logged in.
    #[serde(default)]
    pub user_id: Option<RecordId>,
}

/// Watchlist payload sent on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistRecord {
    /// Saved movie.
    pub movie_id: MovieId,
    /// Movie title.
    pub title: String,
    /// Poster image path fragment.
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(rename = "release_date")]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(rename = "vote_average")]
    pub vote_average: Option<f64>,
    /// Owning user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
}

// --- Users ---

/// A registered user, as returned by the store.
///
/// The password field of the store record is never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned ID.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain password (the mock backend compares it verbatim).
    pub password: String,
}
