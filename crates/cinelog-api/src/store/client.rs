//! `StoreClient` - json-server REST client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::{LocalReviewStore, LocalUserStore, LocalWatchlistStore};
use super::types::{NewReview, NewUser, NewWatchlistRecord, RecordId, Review, User, WatchlistRecord};
use crate::MovieId;
use crate::rate_limiter::{RequestPacer, STORE_MIN_INTERVAL};

/// Default base URL of the local mock backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the json-server backend holding reviews, watchlist and users.
#[derive(Debug)]
pub struct StoreClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL (must end with `/`).
    base_url: Url,
    /// Request pacer.
    pacer: Arc<Mutex<RequestPacer>>,
}

/// Builder for `StoreClient`.
#[derive(Debug, Default)]
pub struct StoreClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl StoreClientBuilder {
    /// Overrides the base URL (default: `http://localhost:3000/`).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: none).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Sets the per-request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<StoreClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?,
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("failed to build HTTP client")?;

        Ok(StoreClient {
            http_client,
            base_url,
            pacer: Arc::new(Mutex::new(RequestPacer::new(
                self.min_interval.unwrap_or(STORE_MIN_INTERVAL),
            ))),
        })
    }
}

impl StoreClient {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> StoreClientBuilder {
        StoreClientBuilder::default()
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String> {
        self.pacer.lock().await.wait().await;

        let response = request
            .send()
            .await
            .with_context(|| format!("store request failed: {what}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read store response body: {what}"))?;

        if !status.is_success() {
            bail!("store error (HTTP {status}) on {what}: {body}");
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, ?query, "store GET");
        let body = self
            .send(self.http_client.get(url).query(query), &format!("GET {path}"))
            .await?;
        serde_json::from_str(&body).with_context(|| format!("failed to decode JSON response: {path}"))
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "store POST");
        let body = self
            .send(self.http_client.post(url).json(payload), &format!("POST {path}"))
            .await?;
        serde_json::from_str(&body).with_context(|| format!("failed to decode JSON response: {path}"))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "store DELETE");
        self.send(self.http_client.delete(url), &format!("DELETE {path}"))
            .await?;
        Ok(())
    }
}

impl LocalReviewStore for StoreClient {
    #[instrument(skip_all, fields(movie_id = %movie_id))]
    async fn list_reviews(&self, movie_id: MovieId) -> Result<Vec<Review>> {
        self.get_json("reviews", &[("movieId", movie_id.to_string())])
            .await
    }

    #[instrument(skip_all, fields(movie_id = %review.movie_id))]
    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.post_json("reviews", review).await
    }

    #[instrument(skip_all, fields(review_id = %id))]
    async fn delete_review(&self, id: &RecordId) -> Result<()> {
        self.delete(&format!("reviews/{id}")).await
    }
}

/// Query filtering the watchlist by owner.
fn owner_query(owner: Option<&RecordId>) -> Vec<(&'static str, String)> {
    owner
        .map(|o| ("userId", o.to_string()))
        .into_iter()
        .collect()
}

/// Drops entries of other owners. json-server cannot filter on a missing
/// field, so guest lookups are narrowed here.
fn owned_by(records: Vec<WatchlistRecord>, owner: Option<&RecordId>) -> Vec<WatchlistRecord> {
    records
        .into_iter()
        .filter(|r| r.user_id.as_ref() == owner)
        .collect()
}

impl LocalWatchlistStore for StoreClient {
    #[instrument(skip_all, fields(movie_id = %movie_id, owner = ?owner.map(RecordId::as_str)))]
    async fn find_watchlist(
        &self,
        movie_id: MovieId,
        owner: Option<&RecordId>,
    ) -> Result<Option<WatchlistRecord>> {
        let mut query = owner_query(owner);
        query.push(("movieId", movie_id.to_string()));
        let records = owned_by(self.get_json("watchlist", &query).await?, owner);
        if records.len() > 1 {
            tracing::warn!(
                count = records.len(),
                "multiple watchlist records for one movie, using the first"
            );
        }
        Ok(records.into_iter().next())
    }

    #[instrument(skip_all, fields(owner = ?owner.map(RecordId::as_str)))]
    async fn list_watchlist(&self, owner: Option<&RecordId>) -> Result<Vec<WatchlistRecord>> {
        let records = self.get_json("watchlist", &owner_query(owner)).await?;
        Ok(owned_by(records, owner))
    }

    #[instrument(skip_all, fields(movie_id = %record.movie_id))]
    async fn create_watchlist(&self, record: &NewWatchlistRecord) -> Result<WatchlistRecord> {
        self.post_json("watchlist", record).await
    }

    #[instrument(skip_all, fields(record_id = %id))]
    async fn delete_watchlist(&self, id: &RecordId) -> Result<()> {
        self.delete(&format!("watchlist/{id}")).await
    }
}

impl LocalUserStore for StoreClient {
    #[instrument(skip_all)]
    async fn find_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let users: Vec<User> = self
            .get_json(
                "users",
                &[
                    ("email", String::from(email)),
                    ("password", String::from(password)),
                ],
            )
            .await?;
        Ok(users.into_iter().next())
    }

    #[instrument(skip_all)]
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let users: Vec<User> = self
            .get_json("users", &[("email", String::from(email))])
            .await?;
        Ok(!users.is_empty())
    }

    #[instrument(skip_all)]
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.post_json("users", user).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn client_for(server: &wiremock::MockServer) -> StoreClient {
        let base_url = format!("{}/", server.uri());
        StoreClient::builder()
            .base_url(base_url.parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    fn fight_club() -> MovieId {
        MovieId::new(550).unwrap()
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = StoreClient::builder().build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_defaults_to_localhost() {
        // Arrange & Act
        let client = StoreClient::builder().user_agent("test/0.0.0").build().unwrap();

        // Assert
        assert_eq!(client.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_list_reviews_filters_by_movie() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let body = include_str!("../../../../fixtures/store/reviews_550.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/reviews"))
            .and(wiremock::matchers::query_param("movieId", "550"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let reviews = client.list_reviews(fight_club()).await.unwrap();

        // Assert
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, RecordId::new("1"));
        assert_eq!(reviews[1].id, RecordId::new("7f3a"));
    }

    #[tokio::test]
    async fn test_create_review_posts_camel_case() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/reviews"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "movieId": 550,
                "rating": 8,
                "comment": "Sharp.",
            })))
            .respond_with(wiremock::ResponseTemplate::new(201).set_body_string(
                r#"{"id":"9","movieId":550,"rating":8,"comment":"Sharp.","user":"Guest","date":"2024-05-01"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let review = NewReview {
            movie_id: fight_club(),
            rating: 8,
            comment: String::from("Sharp."),
            user: String::from("Guest"),
            date: String::from("2024-05-01"),
        };

        // Act
        let created = client.create_review(&review).await.unwrap();

        // Assert
        assert_eq!(created.id, RecordId::new("9"));
    }

    #[tokio::test]
    async fn test_delete_review_by_id() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("DELETE"))
            .and(wiremock::matchers::path("/reviews/9"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act & Assert (mock expect(1) verifies the path)
        client.delete_review(&RecordId::new("9")).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_watchlist_empty_is_none() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/watchlist"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let found = client.find_watchlist(fight_club(), None).await.unwrap();

        // Assert
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_watchlist_returns_record() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let body = include_str!("../../../../fixtures/store/watchlist_550.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/watchlist"))
            .and(wiremock::matchers::query_param("movieId", "550"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let found = client
            .find_watchlist(fight_club(), None)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(found.id, RecordId::new("4"));
        assert_eq!(found.title, "Fight Club");
    }

    #[tokio::test]
    async fn test_find_watchlist_scoped_to_owner() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let body = r#"[
            {"id": 4, "movieId": 550, "title": "Fight Club", "userId": "3"},
            {"id": 5, "movieId": 550, "title": "Fight Club", "userId": "7"}
        ]"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/watchlist"))
            .and(wiremock::matchers::query_param("movieId", "550"))
            .and(wiremock::matchers::query_param("userId", "7"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let owner = RecordId::new("7");

        // Act
        let found = client
            .find_watchlist(fight_club(), Some(&owner))
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(found.id, RecordId::new("5"));
        assert_eq!(found.user_id, Some(owner));
    }

    #[tokio::test]
    async fn test_guest_watchlist_skips_user_entries() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let body = r#"[
            {"id": 4, "movieId": 550, "title": "Fight Club", "userId": "3"},
            {"id": 6, "movieId": 13, "title": "Forrest Gump"}
        ]"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/watchlist"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let guest = client.list_watchlist(None).await.unwrap();
        let found = client.find_watchlist(fight_club(), None).await.unwrap();

        // Assert
        assert_eq!(guest.len(), 1);
        assert_eq!(guest[0].title, "Forrest Gump");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_store_error_status_is_reported() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("DELETE"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.delete_watchlist(&RecordId::new("404")).await;

        // Assert
        let message = result.unwrap_err().to_string();
        assert!(message.contains("404"));
        assert!(message.contains("DELETE watchlist/404"));
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/users"))
            .and(wiremock::matchers::query_param("email", "ada@example.com"))
            .and(wiremock::matchers::query_param("password", "pw"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"[{"id":1,"name":"Ada","email":"ada@example.com","password":"pw"}]"#,
            ))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let user = client
            .find_by_credentials("ada@example.com", "pw")
            .await
            .unwrap();

        // Assert
        assert_eq!(user.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_email_exists() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/users"))
            .and(wiremock::matchers::query_param("email", "new@example.com"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let exists = client.email_exists("new@example.com").await.unwrap();

        // Assert
        assert!(!exists);
    }
}
