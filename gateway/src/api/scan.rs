use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::{GatewayError, Result};
use crate::metrics_defs;
use axum::Json;
use axum::extract::State;
use marketplace::FormattedProject;
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Serialize)]
pub struct ScanResponse {
    pub projects: Vec<FormattedProject>,
    pub start_id: u64,
    pub end_id: u64,
    pub total_found: usize,
    pub checked_ids: Vec<u64>,
}

/// Walk project IDs upward from the requested starting point and return
/// whatever valid projects the scan budget allows.
pub async fn scan(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<JsonValue>,
) -> Result<Json<ScanResponse>> {
    // Validated before any scanning starts; everything past this point is
    // best-effort rather than an input error.
    let start_id = body
        .get("start_id")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| {
            GatewayError::BadRequest("start_id must be a positive integer".to_string())
        })?;

    tracing::info!(user = %user.email, start_id, "scan started");
    metrics::counter!(metrics_defs::SCANS_STARTED).increment(1);

    let outcome = marketplace::scan(&state.marketplace, start_id, &state.scanner).await;

    if outcome.collected.is_empty() {
        metrics::counter!(metrics_defs::SCANS_EMPTY).increment(1);
        return Err(GatewayError::NoProjects {
            checked_ids: outcome.checked_ids,
        });
    }

    let clients = marketplace::enrich(&state.marketplace, &outcome.collected).await;
    let projects = marketplace::shape(&outcome.collected, &clients);

    Ok(Json(ScanResponse {
        total_found: projects.len(),
        projects,
        start_id,
        end_id: outcome.last_id,
        checked_ids: outcome.checked_ids,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testutils::{bearer, spawn, test_state};
    use marketplace::ScannerConfig;
    use serde_json::{Value as JsonValue, json};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn small_scanner(max_attempts: usize) -> ScannerConfig {
        ScannerConfig {
            max_attempts,
            politeness_delay: Duration::ZERO,
            ..ScannerConfig::default()
        }
    }

    #[tokio::test]
    async fn scan_rejects_missing_or_non_integer_start_id() {
        let state = test_state("http://unused", "http://unused", "http://unused").await;
        let base = spawn(state).await;
        let client = reqwest::Client::new();

        for body in [json!({}), json!({"start_id": "soon"}), json!({"start_id": 1.5})] {
            let response = client
                .post(format!("{base}/scan"))
                .header("Authorization", bearer("alice@example.com"))
                .json(&body)
                .send()
                .await
                .expect("request");

            assert_eq!(response.status(), 400);
            let body: JsonValue = response.json().await.expect("body");
            assert_eq!(body["error"], "start_id must be a positive integer");
        }
    }

    #[tokio::test]
    async fn scan_exhaustion_is_not_found_with_checked_ids() {
        let marketplace = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&marketplace)
            .await;

        let mut state = test_state("http://unused", &marketplace.uri(), "http://unused").await;
        state.scanner = small_scanner(5);
        let base = spawn(state).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/scan"))
            .header("Authorization", bearer("alice@example.com"))
            .json(&json!({"start_id": 1000}))
            .send()
            .await
            .expect("request");

        assert_eq!(response.status(), 404);
        let body: JsonValue = response.json().await.expect("body");
        assert_eq!(
            body["checked_ids"],
            json!([1000, 1001, 1002, 1003, 1004])
        );
    }

    #[tokio::test]
    async fn scan_collects_past_a_gap_and_enriches_owners() {
        let marketplace = MockServer::start().await;
        // IDs 1000..=1004 are a gap; 1005 is a valid project owned by 55.
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1005/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"id": 1005, "title": "Build a site", "owner_id": 55}
            })))
            .mount(&marketplace)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/users/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"users": {"55": {
                    "username": "acme",
                    "employer_reputation": {"entire_history": {"overall": 4.8}}
                }}}
            })))
            .mount(&marketplace)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&marketplace)
            .await;

        let mut state = test_state("http://unused", &marketplace.uri(), "http://unused").await;
        state.scanner = small_scanner(10);
        let base = spawn(state).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/scan"))
            .header("Authorization", bearer("alice@example.com"))
            .json(&json!({"start_id": 1000}))
            .send()
            .await
            .expect("request");

        assert_eq!(response.status(), 200);
        let body: JsonValue = response.json().await.expect("body");
        assert_eq!(body["total_found"], 1);
        assert_eq!(body["start_id"], 1000);
        assert_eq!(body["end_id"], 1009);
        assert_eq!(body["checked_ids"].as_array().expect("ids").len(), 10);
        assert_eq!(body["projects"][0]["id"], 1005);
        assert_eq!(body["projects"][0]["client"]["rating"]["overall"], 4.8);
    }

    #[tokio::test]
    async fn scan_survives_enrichment_failure() {
        let marketplace = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/0.1/projects/1000/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "result": {"id": 1000, "title": "Build a site", "owner_id": 55}
            })))
            .mount(&marketplace)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/0.1/users/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&marketplace)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&marketplace)
            .await;

        let mut state = test_state("http://unused", &marketplace.uri(), "http://unused").await;
        state.scanner = small_scanner(3);
        let base = spawn(state).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/scan"))
            .header("Authorization", bearer("alice@example.com"))
            .json(&json!({"start_id": 1000}))
            .send()
            .await
            .expect("request");

        assert_eq!(response.status(), 200);
        let body: JsonValue = response.json().await.expect("body");
        // Client data degrades to placeholders, never failing the scan.
        assert_eq!(body["projects"][0]["client"]["username"], "N/A");
        assert_eq!(
            body["projects"][0]["client"]["rating"]["overall"],
            JsonValue::Null
        );
    }
}
