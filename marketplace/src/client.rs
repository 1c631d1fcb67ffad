//! HTTP client for the marketplace REST API.

use crate::error::MarketplaceError;
use crate::metrics_defs;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff applied to HTTP 429 when the response carries no Retry-After.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Result-page size for the active-projects search.
const SEARCH_LIMIT: u32 = 10;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const PROJECT_TIMEOUT: Duration = Duration::from_secs(10);
const USERS_TIMEOUT: Duration = Duration::from_secs(15);
const SELF_TIMEOUT: Duration = Duration::from_secs(30);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Filters accepted by the active-projects search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub project_type: Option<String>,
}

/// Payload for an external bid submission.
#[derive(Debug, Clone)]
pub struct BidSubmission {
    pub project_id: u64,
    pub bidder_id: Option<u64>,
    pub amount: f64,
    pub period: i64,
    pub description: String,
}

/// What happened to an external bid submission.
///
/// Submission must never fail the surrounding flow, so failure is a value
/// here rather than an error.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The marketplace accepted the bid.
    Sent { response: JsonValue },
    /// The marketplace rejected the bid, or the request never completed.
    Error { response: Option<JsonValue> },
    /// Submission was not attempted (disabled by configuration).
    StoredLocally,
}

/// Client for the marketplace REST API.
///
/// Cheap to clone; the inner `reqwest::Client` is an Arc-backed handle.
#[derive(Clone)]
pub struct MarketplaceClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl MarketplaceClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        MarketplaceClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Search active projects with the given filters.
    ///
    /// # Errors
    /// Returns `MarketplaceError` on transport failure, a non-2xx status, or
    /// a non-success response envelope.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<JsonValue>, MarketplaceError> {
        let mut params: Vec<(String, String)> = vec![
            ("compact".into(), String::new()),
            ("limit".into(), SEARCH_LIMIT.to_string()),
            ("full_description".into(), "true".into()),
        ];
        if let Some(query) = &filters.query {
            params.push(("query".into(), query.clone()));
        }
        if let Some(min_price) = filters.min_price {
            params.push(("min_avg_price".into(), min_price.to_string()));
        }
        if let Some(max_price) = filters.max_price {
            params.push(("max_avg_price".into(), max_price.to_string()));
        }
        if let Some(project_type) = &filters.project_type {
            params.push(("project_types[]".into(), project_type.clone()));
        }

        let response = self
            .client
            .get(format!("{}/api/projects/0.1/projects/active/", self.base_url))
            .query(&params)
            .header("Freelancer-OAuth-V1", &self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: JsonValue = response.json().await?;
        ensure_success_envelope(&body)?;

        Ok(body
            .pointer("/result/projects")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Fetch one project's detail record.
    ///
    /// On HTTP 429 the request is re-issued after the server-specified
    /// backoff; every other failure mode (non-2xx, malformed body, transport
    /// error) means "no usable project at this ID" and yields `None`.
    pub async fn fetch_project(&self, project_id: u64) -> Option<JsonValue> {
        let url = format!("{}/api/projects/0.1/projects/{project_id}/", self.base_url);

        loop {
            let response = match self
                .client
                .get(&url)
                .header("Freelancer-OAuth-V1", &self.token)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .timeout(PROJECT_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(project_id, error = %e, "project fetch failed");
                    return None;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after(response.headers());
                tracing::debug!(project_id, wait_secs = wait.as_secs(), "rate limited");
                metrics::counter!(metrics_defs::FETCH_RATE_LIMITED).increment(1);
                sleep(wait).await;
                continue;
            }

            if !response.status().is_success() {
                tracing::debug!(project_id, status = %response.status(), "no usable project");
                return None;
            }

            let body: JsonValue = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(project_id, error = %e, "malformed project response");
                    return None;
                }
            };

            if body.get("status").and_then(JsonValue::as_str) != Some("success") {
                return None;
            }

            return match body.get("result") {
                Some(result) if !result.is_null() => Some(result.clone()),
                _ => None,
            };
        }
    }

    /// Bulk user lookup with employer reputation, keyed by owner id as a
    /// string (the marketplace's own response keying).
    ///
    /// On HTTP 429 the request is retried exactly once after the
    /// server-specified backoff.
    ///
    /// # Errors
    /// Returns `MarketplaceError` on transport failure, a non-2xx status, or
    /// a non-success response envelope.
    pub async fn lookup_users(
        &self,
        owner_ids: &[u64],
    ) -> Result<HashMap<String, JsonValue>, MarketplaceError> {
        let mut params: Vec<(String, String)> = owner_ids
            .iter()
            .map(|id| ("users[]".to_string(), id.to_string()))
            .collect();
        params.push(("employer_reputation".into(), "true".into()));
        params.push(("jobs".into(), "true".into()));

        let url = format!("{}/api/users/0.1/users/", self.base_url);
        let mut retried = false;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&params)
                .header("Freelancer-OAuth-V1", &self.token)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .timeout(USERS_TIMEOUT)
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && !retried {
                retried = true;
                let wait = retry_after(response.headers());
                tracing::debug!(wait_secs = wait.as_secs(), "user lookup rate limited");
                sleep(wait).await;
                continue;
            }

            let response = response.error_for_status()?;
            let body: JsonValue = response.json().await?;
            ensure_success_envelope(&body)?;

            return Ok(body
                .pointer("/result/users")
                .and_then(JsonValue::as_object)
                .map(|users| users.clone().into_iter().collect())
                .unwrap_or_default());
        }
    }

    /// The account id behind the configured credential. Best-effort: any
    /// failure yields `None`.
    pub async fn current_user_id(&self) -> Option<u64> {
        let result = self
            .client
            .get(format!("{}/api/users/0.1/self/", self.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.token),
            )
            .timeout(SELF_TIMEOUT)
            .send()
            .await;

        let response = match result.and_then(reqwest::Response::error_for_status) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "self lookup failed");
                return None;
            }
        };

        let body: JsonValue = response.json().await.ok()?;
        body.pointer("/result/id").and_then(JsonValue::as_u64)
    }

    /// Submit a bid to the marketplace.
    ///
    /// Never fails the caller: rejection and unreachability both come back
    /// as [`SubmissionOutcome::Error`].
    pub async fn submit_bid(&self, submission: &BidSubmission) -> SubmissionOutcome {
        let payload = json!({
            "project_id": submission.project_id,
            "bidder_id": submission.bidder_id,
            "amount": submission.amount,
            "period": submission.period,
            "milestone_percentage": 100,
            "description": submission.description,
        });

        let result = self
            .client
            .post(format!("{}/api/projects/0.1/bids/", self.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.token),
            )
            .json(&payload)
            .timeout(SUBMIT_TIMEOUT)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(project_id = submission.project_id, error = %e, "bid submission failed");
                metrics::counter!(metrics_defs::SUBMIT_FAILURES).increment(1);
                return SubmissionOutcome::Error { response: None };
            }
        };

        let accepted = response.status().is_success();
        let body = response.json::<JsonValue>().await.ok();

        if accepted {
            metrics::counter!(metrics_defs::SUBMIT_ACCEPTED).increment(1);
            SubmissionOutcome::Sent {
                response: body.unwrap_or(JsonValue::Null),
            }
        } else {
            metrics::counter!(metrics_defs::SUBMIT_FAILURES).increment(1);
            SubmissionOutcome::Error { response: body }
        }
    }
}

/// Read the Retry-After backoff from a 429 response, in whole seconds.
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}

fn ensure_success_envelope(body: &JsonValue) -> Result<(), MarketplaceError> {
    if body.get("status").and_then(JsonValue::as_str) == Some("success") {
        return Ok(());
    }

    let message = body
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or("unknown marketplace error");
    Err(MarketplaceError::Envelope(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn project_envelope(id: u64) -> JsonValue {
        json!({
            "status": "success",
            "result": {"id": id, "title": "Build a site", "owner_id": 55}
        })
    }

    #[tokio::test]
    async fn fetch_project_returns_result_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1000/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_envelope(1000)))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let project = client.fetch_project(1000).await.expect("project");
        assert_eq!(project["id"], 1000);
        assert_eq!(project["owner_id"], 55);
    }

    #[tokio::test]
    async fn fetch_project_misses_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        // Success status but a failure envelope.
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/2/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "gone"})),
            )
            .mount(&server)
            .await;
        // Success envelope with a null result.
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/3/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "result": null})),
            )
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        assert!(client.fetch_project(1).await.is_none());
        assert!(client.fetch_project(2).await.is_none());
        assert!(client.fetch_project(3).await.is_none());
    }

    #[tokio::test]
    async fn fetch_project_unreachable_is_none() {
        let client = MarketplaceClient::new("http://127.0.0.1:1", "test-token");
        assert!(client.fetch_project(1).await.is_none());
    }

    #[tokio::test]
    async fn fetch_project_backs_off_on_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1000/"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1000/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_envelope(1000)))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let started = Instant::now();
        let project = client.fetch_project(1000).await;

        assert!(project.is_some());
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn search_shapes_query_and_unwraps_projects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/active/"))
            .and(query_param("limit", "10"))
            .and(query_param("full_description", "true"))
            .and(query_param("query", "logo"))
            .and(query_param("min_avg_price", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"projects": [{"id": 7, "title": "Logo"}]}
            })))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let filters = SearchFilters {
            query: Some("logo".to_string()),
            min_price: Some(10.0),
            ..SearchFilters::default()
        };
        let projects = client.search(&filters).await.expect("search");

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["id"], 7);
    }

    #[tokio::test]
    async fn search_surfaces_failure_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/active/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "bad token"})),
            )
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let result = client.search(&SearchFilters::default()).await;

        match result {
            Err(MarketplaceError::Envelope(message)) => assert_eq!(message, "bad token"),
            other => panic!("expected envelope error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_users_retries_rate_limit_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/users/"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/users/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"users": {"55": {"id": 55, "username": "acme"}}}
            })))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let users = client.lookup_users(&[55]).await.expect("lookup");

        assert_eq!(users.len(), 1);
        assert_eq!(users["55"]["username"], "acme");
    }

    #[tokio::test]
    async fn lookup_users_gives_up_after_second_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/users/"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        assert!(client.lookup_users(&[55]).await.is_err());
    }

    #[tokio::test]
    async fn submit_bid_maps_status_to_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/0.1/bids/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 900})))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let submission = BidSubmission {
            project_id: 1000,
            bidder_id: Some(42),
            amount: 50.0,
            period: 7,
            description: "We can do this.".to_string(),
        };

        match client.submit_bid(&submission).await {
            SubmissionOutcome::Sent { response } => assert_eq!(response["id"], 900),
            other => panic!("expected Sent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_bid_rejection_carries_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/0.1/bids/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "insufficient funds"})),
            )
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        let submission = BidSubmission {
            project_id: 1000,
            bidder_id: None,
            amount: 50.0,
            period: 7,
            description: "We can do this.".to_string(),
        };

        match client.submit_bid(&submission).await {
            SubmissionOutcome::Error { response } => {
                assert_eq!(response.expect("body")["error"], "insufficient funds");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_bid_unreachable_is_error_without_response() {
        let client = MarketplaceClient::new("http://127.0.0.1:1", "test-token");
        let submission = BidSubmission {
            project_id: 1000,
            bidder_id: None,
            amount: 50.0,
            period: 7,
            description: "We can do this.".to_string(),
        };

        match client.submit_bid(&submission).await {
            SubmissionOutcome::Error { response } => assert!(response.is_none()),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn current_user_id_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/self/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"id": 42}
            })))
            .mount(&server)
            .await;

        let client = MarketplaceClient::new(&server.uri(), "test-token");
        assert_eq!(client.current_user_id().await, Some(42));

        let dead = MarketplaceClient::new("http://127.0.0.1:1", "test-token");
        assert_eq!(dead.current_user_id().await, None);
    }

    #[test]
    fn retry_after_parses_header_with_default() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);

        headers.insert(RETRY_AFTER, "2".parse().expect("header value"));
        assert_eq!(retry_after(&headers), Duration::from_secs(2));

        headers.insert(RETRY_AFTER, "soon".parse().expect("header value"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);
    }
}
