//! Spreaker API client.
//!
//! The loader talks to three read-only endpoints:
//!
//! 1. `GET /shows/{show_id}` for the show's last-update timestamp
//! 2. `GET /shows/{show_id}/episodes` to list episodes and filter by cutoff
//! 3. `GET /episodes/{episode_id}/statistics` (bearer-authenticated) for the
//!    per-episode counts
//!
//! Every response is decoded into the typed models immediately on receipt.
//! There is no retry: a non-success status or transport failure surfaces as
//! [`Error::UpstreamRequest`](crate::error::Error::UpstreamRequest) and
//! aborts the run.
//!
//! The base URL is injectable so tests can point the client at a mock
//! server.

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::Result;
use crate::models::{EpisodeStatistics, EpisodesEnvelope, ShowEnvelope, StatisticsEnvelope};

/// Production Spreaker API root.
pub const DEFAULT_BASE_URL: &str = "https://api.spreaker.com/v2";

/// How many statistics fetches may be in flight at once. Responses are
/// yielded in listing order regardless.
const STATISTICS_FETCH_WIDTH: usize = 4;

/// HTTP client for the Spreaker API.
#[derive(Debug, Clone)]
pub struct SpreakerClient {
    http: reqwest::Client,
    base: Url,
}

impl SpreakerClient {
    /// Create a client against the production API.
    pub fn new() -> Self {
        Self::with_base_url(Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"))
    }

    /// Create a client against an arbitrary API root.
    pub fn with_base_url(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Fetch the show's upstream-reported last episode timestamp.
    ///
    /// # Errors
    ///
    /// Any non-success HTTP status or transport failure.
    #[instrument(level = "info", skip(self))]
    pub async fn last_update(&self, show_id: u64) -> Result<String> {
        let url = self.endpoint(&format!("shows/{show_id}"));
        let envelope: ShowEnvelope = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let last_episode_at = envelope.response.show.last_episode_at;
        debug!(show_id, %last_episode_at, "Fetched show");
        Ok(last_episode_at)
    }

    /// List the IDs of episodes published strictly after `cutoff_date`.
    ///
    /// The cutoff comparison is strict: an episode published exactly on the
    /// cutoff is excluded. Upstream timestamps are lexically chronological,
    /// so the filter compares the raw strings. Upstream ordering is
    /// preserved.
    ///
    /// # Errors
    ///
    /// Any non-success HTTP status or transport failure.
    #[instrument(level = "info", skip(self))]
    pub async fn list_new_episodes(&self, show_id: u64, cutoff_date: &str) -> Result<Vec<u64>> {
        let url = self.endpoint(&format!("shows/{show_id}/episodes"));
        let envelope: EpisodesEnvelope = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let episode_ids: Vec<u64> = envelope
            .response
            .items
            .iter()
            .filter(|item| item.published_at.as_str() > cutoff_date)
            .map(|item| item.episode_id)
            .collect();

        info!(
            show_id,
            cutoff_date,
            total = envelope.response.items.len(),
            count = episode_ids.len(),
            "Listed new episodes"
        );
        Ok(episode_ids)
    }

    /// Fetch and validate the statistics record for one episode.
    ///
    /// The bearer token is presented as `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Non-success HTTP status (including invalid or expired tokens and
    /// unknown episodes), or a payload failing validation.
    #[instrument(level = "info", skip(self, token))]
    pub async fn fetch_statistics(&self, episode_id: u64, token: &str) -> Result<EpisodeStatistics> {
        let url = self.endpoint(&format!("episodes/{episode_id}/statistics"));
        let envelope: StatisticsEnvelope = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let stats = envelope.response.statistics.validate(episode_id)?;
        debug!(episode_id = stats.episode_id, title = %stats.title, "Fetched episode statistics");
        Ok(stats)
    }

    /// Fetch statistics for every listed episode, in listing order.
    ///
    /// A few requests run concurrently, but the output order matches
    /// `episode_ids` and the first failure aborts the whole batch.
    #[instrument(level = "info", skip(self, token), fields(count = episode_ids.len()))]
    pub async fn fetch_all_statistics(
        &self,
        episode_ids: &[u64],
        token: &str,
    ) -> Result<Vec<EpisodeStatistics>> {
        stream::iter(episode_ids.iter().map(|&id| self.fetch_statistics(id, token)))
            .buffered(STATISTICS_FETCH_WIDTH)
            .try_collect()
            .await
    }
}

impl Default for SpreakerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SpreakerClient {
        SpreakerClient::with_base_url(Url::parse(&server.uri()).unwrap())
    }

    fn statistics_body(title: &str, plays: i64) -> serde_json::Value {
        json!({
            "response": {
                "statistics": {
                    "plays_count": plays,
                    "plays_ondemand_count": plays,
                    "plays_live_count": 0,
                    "chapters_count": 0,
                    "messages_count": 1,
                    "likes_count": 2,
                    "downloads_count": 3,
                    "episode": {
                        "title": title,
                        "published_at": "2020-06-01 14:30:00"
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn last_update_returns_show_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"show": {"last_episode_at": "2020-06-01 14:30:00"}}
            })))
            .mount(&server)
            .await;

        let last = client_for(&server).last_update(77).await.unwrap();
        assert_eq!(last, "2020-06-01 14:30:00");
    }

    #[tokio::test]
    async fn listing_applies_strict_cutoff_and_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows/77/episodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {
                    "items": [
                        {"episode_id": 1, "published_at": "2020-01-01"},
                        {"episode_id": 2, "published_at": "2020-01-02"},
                        {"episode_id": 3, "published_at": "2020-06-01"}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let ids = client_for(&server)
            .list_new_episodes(77, "2020-01-01")
            .await
            .unwrap();

        // The episode published exactly on the cutoff date is excluded.
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn listing_failure_surfaces_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows/77/episodes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_new_episodes(77, "2020-01-01")
            .await
            .unwrap_err();

        match err {
            Error::UpstreamRequest(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn statistics_fetch_presents_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/episodes/9/statistics"))
            .and(header("Authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(statistics_body("Episode Nine", 10)))
            .mount(&server)
            .await;

        let stats = client_for(&server)
            .fetch_statistics(9, "sekrit")
            .await
            .unwrap();

        assert_eq!(stats.episode_id, 9);
        assert_eq!(stats.title, "Episode Nine");
        assert_eq!(stats.plays_count, 10);
    }

    #[tokio::test]
    async fn empty_statistics_payload_names_first_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/episodes/9/statistics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": {"statistics": {}}})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_statistics(9, "sekrit")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MissingField {
                episode_id: 9,
                field: "plays_count",
            }
        ));
    }

    #[tokio::test]
    async fn expired_token_surfaces_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/episodes/9/statistics"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_statistics(9, "stale")
            .await
            .unwrap_err();

        match err {
            Error::UpstreamRequest(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_fetch_preserves_listing_order() {
        let server = MockServer::start().await;
        for (id, title) in [(5, "Five"), (6, "Six"), (7, "Seven")] {
            Mock::given(method("GET"))
                .and(path(format!("/episodes/{id}/statistics")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(statistics_body(title, id as i64)),
                )
                .mount(&server)
                .await;
        }

        let stats = client_for(&server)
            .fetch_all_statistics(&[5, 6, 7], "sekrit")
            .await
            .unwrap();

        let titles: Vec<&str> = stats.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Five", "Six", "Seven"]);
    }

    #[tokio::test]
    async fn batch_fetch_aborts_on_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/episodes/5/statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(statistics_body("Five", 5)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/episodes/6/statistics"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch_all_statistics(&[5, 6, 7], "sekrit")
            .await;

        assert!(matches!(result, Err(Error::UpstreamRequest(_))));
    }
}
