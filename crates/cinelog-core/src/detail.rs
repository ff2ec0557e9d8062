//! Movie detail aggregation.
//!
//! Resolves a movie id into a [`MovieDetailView`] in two phases:
//!
//! 1. Core record: cache first, catalog on miss (written back once).
//! 2. Enrichment: similar titles, credits and videos fetched concurrently
//!    and never cached. Each failure is recorded and leaves its field empty.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use cinelog_api::MovieId;
use cinelog_api::tmdb::{LocalCatalogApi, TmdbVideo};
use tracing::instrument;

use crate::cache::DetailCache;
use crate::error::DetailError;
use crate::model::{
    CastEntry, EnrichmentCategory, EnrichmentFailure, MovieDetailRecord, MovieDetailView,
    SimilarTitleSummary, TrailerReference,
};

/// Maximum number of cast entries kept in a view.
pub const CAST_LIMIT: usize = 12;

/// Video type accepted as a trailer.
const TRAILER_TYPE: &str = "Trailer";

/// Hosting site accepted for trailers.
const TRAILER_SITE: &str = "YouTube";

/// Picks the first YouTube trailer, scanning in the given order.
#[must_use]
pub fn select_trailer(videos: &[TmdbVideo]) -> Option<TrailerReference> {
    videos
        .iter()
        .find(|v| v.video_type == TRAILER_TYPE && v.site == TRAILER_SITE)
        .map(|v| TrailerReference { key: v.key.clone() })
}

/// Set of movie ids with a load currently running.
type InFlight = Mutex<HashSet<MovieId>>;

/// Marks a movie id as loading until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    id: MovieId,
}

impl<'a> InFlightGuard<'a> {
    /// Claims `id`, or returns `None` if it is already claimed.
    fn acquire(in_flight: &'a InFlight, id: MovieId) -> Option<Self> {
        let claimed = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        claimed.then_some(Self { in_flight, id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Builds detail views from a catalog and a response cache.
#[derive(Debug)]
pub struct DetailAggregator<'a, C, K> {
    catalog: &'a C,
    cache: &'a K,
    language: String,
    in_flight: InFlight,
}

impl<'a, C, K> DetailAggregator<'a, C, K>
where
    C: LocalCatalogApi + Sync,
    K: DetailCache + Sync,
{
    /// Creates an aggregator requesting catalog data in `language`.
    pub fn new(catalog: &'a C, cache: &'a K, language: impl Into<String>) -> Self {
        Self {
            catalog,
            cache,
            language: language.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Loads the composite view of a movie.
    ///
    /// Dropping the returned future abandons the load and releases `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::LoadInProgress`] if `id` is already loading on
    /// this aggregator, or [`DetailError::DetailUnavailable`] if the core
    /// record is neither cached nor fetchable. Enrichment failures are not
    /// errors; they are listed in [`MovieDetailView::enrichment_failures`].
    #[instrument(skip_all, fields(movie_id = %id))]
    pub async fn load_detail(&self, id: MovieId) -> Result<MovieDetailView, DetailError> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight, id).ok_or(DetailError::LoadInProgress(id))?;

        let record = self.resolve_record(id).await?;
        Ok(self.enrich(record).await)
    }

    /// Resolves only the core record, skipping enrichment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_detail`], minus enrichment.
    #[instrument(skip_all, fields(movie_id = %id))]
    pub async fn load_record(&self, id: MovieId) -> Result<MovieDetailRecord, DetailError> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight, id).ok_or(DetailError::LoadInProgress(id))?;

        self.resolve_record(id).await
    }

    /// Phase 1: cache lookup, then catalog fetch on miss.
    async fn resolve_record(&self, id: MovieId) -> Result<MovieDetailRecord, DetailError> {
        if let Some(record) = self.cache.get(id) {
            tracing::debug!("cache hit");
            return Ok(record);
        }

        tracing::debug!("cache miss, fetching details");
        let record = self
            .catalog
            .movie_details(id, &self.language)
            .await
            .and_then(|details| {
                MovieDetailRecord::try_from(details).context("catalog returned an invalid movie id")
            })
            .map_err(|source| DetailError::DetailUnavailable { id, source })?;

        self.cache.put(id, &record);
        Ok(record)
    }

    /// Phase 2: concurrent enrichment requests.
    async fn enrich(&self, record: MovieDetailRecord) -> MovieDetailView {
        let id = record.id;
        let (similar, credits, videos) = futures::join!(
            self.catalog.movie_similar(id, &self.language),
            self.catalog.movie_credits(id, &self.language),
            self.catalog.movie_videos(id, &self.language),
        );

        let mut failures = Vec::new();

        let similar: Vec<SimilarTitleSummary> =
            soften(EnrichmentCategory::Similar, similar, &mut failures)
                .map(|page| {
                    page.results
                        .into_iter()
                        .map(SimilarTitleSummary::from)
                        .collect()
                })
                .unwrap_or_default();

        let cast: Vec<CastEntry> = soften(EnrichmentCategory::Credits, credits, &mut failures)
            .map(|credits| {
                credits
                    .cast
                    .into_iter()
                    .take(CAST_LIMIT)
                    .map(CastEntry::from)
                    .collect()
            })
            .unwrap_or_default();

        let trailer = soften(EnrichmentCategory::Videos, videos, &mut failures)
            .and_then(|videos| select_trailer(&videos.results));

        tracing::info!(
            cast = cast.len(),
            similar = similar.len(),
            trailer = trailer.is_some(),
            failures = failures.len(),
            "detail view assembled"
        );

        MovieDetailView {
            record,
            cast,
            similar,
            trailer,
            enrichment_failures: failures,
        }
    }
}

/// Turns an enrichment error into a recorded soft failure.
fn soften<T>(
    category: EnrichmentCategory,
    result: anyhow::Result<T>,
    failures: &mut Vec<EnrichmentFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            let message = format!("{e:#}");
            tracing::warn!(%category, error = %message, "enrichment request failed");
            failures.push(EnrichmentFailure { category, message });
            None
        }
    }
}
