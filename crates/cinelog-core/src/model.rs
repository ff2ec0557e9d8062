//! Domain records assembled from catalog responses.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use cinelog_api::tmdb::{TmdbCastMember, TmdbMovieDetails, TmdbMovieSummary};
use cinelog_api::{InvalidMovieId, MovieId};
use cinelog_db::CachedMovie;

/// Date format used by TMDB and the store.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a TMDB release date, treating empty or malformed values as unknown.
fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Core record of a movie. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetailRecord {
    /// Catalog identifier.
    pub id: MovieId,
    /// Localized title.
    pub title: String,
    /// Overview text (may be empty).
    pub overview: String,
    /// Poster image path fragment.
    pub poster_path: Option<String>,
    /// Backdrop image path fragment.
    pub backdrop_path: Option<String>,
    /// Release date, if known.
    pub release_date: Option<NaiveDate>,
    /// Vote average (0-10).
    pub vote_average: f64,
}

impl MovieDetailRecord {
    /// Returns the release date as `YYYY-MM-DD`.
    #[must_use]
    pub fn release_date_string(&self) -> Option<String> {
        self.release_date.map(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Converts the record into a cache row stamped at `now`.
    #[must_use]
    pub fn to_cached(&self, now: i64) -> CachedMovie {
        CachedMovie {
            movie_id: self.id.get(),
            title: self.title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date_string(),
            vote_average: self.vote_average,
            cached_at: now,
            last_accessed: now,
        }
    }
}

impl TryFrom<TmdbMovieDetails> for MovieDetailRecord {
    type Error = InvalidMovieId;

    fn try_from(details: TmdbMovieDetails) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MovieId::try_from(details.id)?,
            release_date: parse_release_date(details.release_date.as_deref()),
            title: details.title,
            overview: details.overview.unwrap_or_default(),
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            vote_average: details.vote_average,
        })
    }
}

impl TryFrom<CachedMovie> for MovieDetailRecord {
    type Error = InvalidMovieId;

    fn try_from(row: CachedMovie) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MovieId::try_from(row.movie_id)?,
            release_date: parse_release_date(row.release_date.as_deref()),
            title: row.title,
            overview: row.overview,
            poster_path: row.poster_path,
            backdrop_path: row.backdrop_path,
            vote_average: row.vote_average,
        })
    }
}

/// A credited cast member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastEntry {
    /// TMDB person ID.
    pub id: u64,
    /// Actor name.
    pub name: String,
    /// Character played.
    pub character: Option<String>,
    /// Profile image path fragment.
    pub profile_path: Option<String>,
}

impl From<TmdbCastMember> for CastEntry {
    fn from(member: TmdbCastMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            character: member.character.filter(|c| !c.is_empty()),
            profile_path: member.profile_path,
        }
    }
}

/// A title listed as similar to the requested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarTitleSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path fragment.
    pub poster_path: Option<String>,
}

impl From<TmdbMovieSummary> for SimilarTitleSummary {
    fn from(summary: TmdbMovieSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            poster_path: summary.poster_path,
        }
    }
}

/// The primary trailer of a movie, hosted on YouTube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerReference {
    /// YouTube video ID.
    pub key: String,
}

impl TrailerReference {
    /// Returns the watch page URL.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }

    /// Returns the embeddable player URL with autoplay enabled.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.key)
    }
}

/// Enrichment request that may fail without failing the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentCategory {
    /// `movie/{id}/similar`.
    Similar,
    /// `movie/{id}/credits`.
    Credits,
    /// `movie/{id}/videos`.
    Videos,
}

impl fmt::Display for EnrichmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Similar => "similar",
            Self::Credits => "credits",
            Self::Videos => "videos",
        })
    }
}

/// A soft failure recorded while enriching a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFailure {
    /// Which enrichment failed.
    pub category: EnrichmentCategory,
    /// Error chain rendered as text.
    pub message: String,
}

impl fmt::Display for EnrichmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Composite view of a movie: core record plus enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetailView {
    /// Core record.
    pub record: MovieDetailRecord,
    /// Leading cast in billing order.
    pub cast: Vec<CastEntry>,
    /// Similar titles in catalog order.
    pub similar: Vec<SimilarTitleSummary>,
    /// Primary trailer, if any.
    pub trailer: Option<TrailerReference>,
    /// Enrichment requests that failed; their fields are left empty.
    pub enrichment_failures: Vec<EnrichmentFailure>,
}

impl MovieDetailView {
    /// Returns the release year, if the release date is known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.record.release_date.map(|d| d.year())
    }

    /// Returns the vote average with one decimal place.
    #[must_use]
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.record.vote_average)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]

    use super::*;

    fn fixture_details() -> TmdbMovieDetails {
        serde_json::from_str(include_str!("../../../fixtures/tmdb/movie_details_550.json")).unwrap()
    }

    #[test]
    fn test_record_from_catalog_details() {
        // Arrange
        let details = fixture_details();

        // Act
        let record = MovieDetailRecord::try_from(details).unwrap();

        // Assert
        assert_eq!(record.id.get(), 550);
        assert_eq!(record.title, "Fight Club");
        assert_eq!(record.release_date, NaiveDate::from_ymd_opt(1999, 10, 15));
        assert_eq!(
            record.poster_path.as_deref(),
            Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg")
        );
    }

    #[test]
    fn test_empty_release_date_is_unknown() {
        // Arrange
        let mut details = fixture_details();
        details.release_date = Some(String::new());

        // Act
        let record = MovieDetailRecord::try_from(details).unwrap();

        // Assert
        assert!(record.release_date.is_none());
        assert!(record.release_date_string().is_none());
    }

    #[test]
    fn test_zero_id_is_rejected() {
        // Arrange
        let mut details = fixture_details();
        details.id = 0;

        // Act
        let result = MovieDetailRecord::try_from(details);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_cached_row_conversion_preserves_fields() {
        // Arrange
        let record = MovieDetailRecord::try_from(fixture_details()).unwrap();

        // Act
        let row = record.to_cached(1_700_000_000);
        let restored = MovieDetailRecord::try_from(row.clone()).unwrap();

        // Assert
        assert_eq!(row.release_date.as_deref(), Some("1999-10-15"));
        assert_eq!(row.cached_at, 1_700_000_000);
        assert_eq!(row.last_accessed, 1_700_000_000);
        assert_eq!(restored, record);
    }

    #[test]
    fn test_trailer_urls() {
        // Arrange
        let trailer = TrailerReference {
            key: String::from("SUXWAEX2jlg"),
        };

        // Act & Assert
        assert_eq!(
            trailer.watch_url(),
            "https://www.youtube.com/watch?v=SUXWAEX2jlg"
        );
        assert_eq!(
            trailer.embed_url(),
            "https://www.youtube.com/embed/SUXWAEX2jlg?autoplay=1"
        );
    }

    #[test]
    fn test_view_display_helpers() {
        // Arrange
        let mut record = MovieDetailRecord::try_from(fixture_details()).unwrap();
        record.vote_average = 8.433;
        let view = MovieDetailView {
            record,
            cast: vec![],
            similar: vec![],
            trailer: None,
            enrichment_failures: vec![],
        };

        // Act & Assert
        assert_eq!(view.release_year(), Some(1999));
        assert_eq!(view.rating_label(), "8.4");
    }

    #[test]
    fn test_enrichment_failure_display() {
        // Arrange
        let failure = EnrichmentFailure {
            category: EnrichmentCategory::Videos,
            message: String::from("HTTP 500"),
        };

        // Act & Assert
        assert_eq!(failure.to_string(), "videos: HTTP 500");
    }
}
