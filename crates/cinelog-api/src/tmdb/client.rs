//! `TmdbClient` - TMDB catalog client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Response, StatusCode};
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalCatalogApi;
use super::types::{
    TmdbCredits, TmdbErrorResponse, TmdbMovieDetails, TmdbSimilarResponse, TmdbVideosResponse,
};
use crate::MovieId;
use crate::rate_limiter::{CATALOG_MIN_INTERVAL, RequestPacer};

/// Default base URL for TMDB API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Maximum number of retries for HTTP 429 responses.
const MAX_RETRIES: u32 = 3;

/// Backoff unit between retries (multiplied by the retry count).
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// TMDB catalog client.
#[derive(Debug)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Request pacer shared by concurrent calls.
    pacer: Arc<Mutex<RequestPacer>>,
}

/// Builder for `TmdbClient`.
#[derive(Debug, Default)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Overrides the base URL (wiremock in tests, proxies in production).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 25ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set or blank.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_token = self
            .api_token
            .filter(|t| !t.trim().is_empty())
            .context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?,
        };

        let pacer = RequestPacer::new(self.min_interval.unwrap_or(CATALOG_MIN_INTERVAL));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            pacer: Arc::new(Mutex::new(pacer)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::default()
    }

    /// Sends a paced, bearer-authenticated GET and decodes the JSON body.
    ///
    /// HTTP 429 is retried up to `MAX_RETRIES` times with linear backoff.
    #[instrument(skip_all, fields(path = path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut attempt = 0u32;
        let response = loop {
            self.pacer.lock().await.wait().await;

            tracing::debug!(url = %url, attempt, "TMDB API request");

            let response = self
                .http_client
                .get(url.clone())
                .bearer_auth(&self.api_token)
                .query(query)
                .send()
                .await
                .with_context(|| format!("request failed: {path}"))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                break response;
            }

            attempt = attempt.saturating_add(1);
            if attempt > MAX_RETRIES {
                bail!("TMDB API rate limit exceeded after {MAX_RETRIES} retries: {path}");
            }
            tracing::warn!(
                retry = attempt,
                max_retries = MAX_RETRIES,
                "TMDB API rate limited (429), backing off"
            );
            tokio::time::sleep(RETRY_BACKOFF.saturating_mul(attempt)).await;
        };

        decode_response(response, path).await
    }
}

/// Turns a final (non-429) response into `T` or a descriptive error.
async fn decode_response<T: serde::de::DeserializeOwned>(
    response: Response,
    path: &str,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed to read response body: {path}"))?;

    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<TmdbErrorResponse>(&body) {
            bail!(
                "TMDB API error (HTTP {status}): code={}, message={}",
                err.status_code,
                err.status_message,
            );
        }
        bail!("TMDB API error (HTTP {status}): {body}");
    }

    serde_json::from_str(&body).with_context(|| format!("failed to decode JSON response: {path}"))
}

impl LocalCatalogApi for TmdbClient {
    #[instrument(skip_all, fields(movie_id = %id))]
    async fn movie_details(&self, id: MovieId, language: &str) -> Result<TmdbMovieDetails> {
        let query = [("language", String::from(language))];
        self.get_json(&format!("movie/{id}"), &query).await
    }

    #[instrument(skip_all, fields(movie_id = %id))]
    async fn movie_credits(&self, id: MovieId, language: &str) -> Result<TmdbCredits> {
        let query = [("language", String::from(language))];
        self.get_json(&format!("movie/{id}/credits"), &query).await
    }

    #[instrument(skip_all, fields(movie_id = %id))]
    async fn movie_similar(&self, id: MovieId, language: &str) -> Result<TmdbSimilarResponse> {
        let query = [
            ("language", String::from(language)),
            ("page", String::from("1")),
        ];
        self.get_json(&format!("movie/{id}/similar"), &query).await
    }

    #[instrument(skip_all, fields(movie_id = %id))]
    async fn movie_videos(&self, id: MovieId, language: &str) -> Result<TmdbVideosResponse> {
        let query = [("language", String::from(language))];
        self.get_json(&format!("movie/{id}/videos"), &query).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn fight_club() -> MovieId {
        MovieId::new(550).unwrap()
    }

    fn client_for(server: &wiremock::MockServer) -> TmdbClient {
        let base_url = format!("{}/3/", server.uri());
        TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("api_token is required")
        );
    }

    #[test]
    fn test_builder_rejects_blank_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder()
            .api_token("   ")
            .user_agent("test/0.0.0")
            .build();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = TmdbClient::builder().api_token("test-token").build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_defaults_base_url() {
        // Arrange & Act
        let client = TmdbClient::builder()
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_movie_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_550.json");

        // Act
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(details.id, 550);
        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.release_date.as_deref(), Some("1999-10-15"));
        assert_eq!(details.genres.len(), 2);
    }

    #[test]
    fn test_parse_credits_fixture_ignores_crew() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_credits_550.json");

        // Act
        let credits: TmdbCredits = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(credits.cast.len(), 14);
        assert_eq!(credits.cast[0].name, "Edward Norton");
        assert!(credits.cast[11].profile_path.is_none());
    }

    #[test]
    fn test_parse_videos_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_videos_550.json");

        // Act
        let videos: TmdbVideosResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(videos.results.len(), 4);
        assert_eq!(videos.results[0].video_type, "Teaser");
        assert_eq!(videos.results[1].site, "Vimeo");
    }

    #[tokio::test]
    async fn test_movie_details_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_details_550.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/movie/550"))
            .and(wiremock::matchers::query_param("language", "en-US"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let details = client.movie_details(fight_club(), "en-US").await.unwrap();

        // Assert
        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.runtime, Some(139));
    }

    #[tokio::test]
    async fn test_enrichment_endpoints_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let routes = [
            (
                "/3/movie/550/credits",
                include_str!("../../../../fixtures/tmdb/movie_credits_550.json"),
            ),
            (
                "/3/movie/550/similar",
                include_str!("../../../../fixtures/tmdb/movie_similar_550.json"),
            ),
            (
                "/3/movie/550/videos",
                include_str!("../../../../fixtures/tmdb/movie_videos_550.json"),
            ),
        ];
        for (route, body) in routes {
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .and(wiremock::matchers::path(route))
                .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
                .mount(&mock_server)
                .await;
        }

        let client = client_for(&mock_server);

        // Act
        let credits = client.movie_credits(fight_club(), "en-US").await.unwrap();
        let similar = client.movie_similar(fight_club(), "en-US").await.unwrap();
        let videos = client.movie_videos(fight_club(), "en-US").await.unwrap();

        // Assert
        assert_eq!(credits.cast.len(), 14);
        assert_eq!(similar.results.len(), 4);
        assert_eq!(similar.results[0].title, "Se7en");
        assert_eq!(videos.results.len(), 4);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_videos_empty.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header(
                "Authorization",
                "Bearer test-token",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act & Assert (mock expect(1) verifies Authorization header)
        client.movie_videos(fight_club(), "en-US").await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_returns_tmdb_message() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let error_body = r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.movie_details(fight_club(), "en-US").await;

        // Assert
        let message = result.unwrap_err().to_string();
        assert!(message.contains("code=34"));
        assert!(message.contains("could not be found"));
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_succeeds() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_details_550.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let details = client.movie_details(fight_club(), "en-US").await.unwrap();

        // Assert
        assert_eq!(details.id, 550);
    }
}
