use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::{GatewayError, Result};
use crate::metrics_defs;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use marketplace::{BidSubmission, SubmissionOutcome};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use store::{BidStatus, NewBid};

#[derive(Deserialize)]
pub struct PlaceBidRequest {
    project_id: Option<u64>,
    bid: Option<String>,
    amount: Option<f64>,
    period: Option<i64>,
    #[serde(alias = "title")]
    project_title: Option<String>,
    #[serde(alias = "link")]
    project_url: Option<String>,
}

/// Submit a bid to the marketplace (best-effort) and always store it
/// locally, with duplicate prevention per user and project link.
pub async fn place_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PlaceBidRequest>,
) -> Result<(StatusCode, Json<JsonValue>)> {
    let bid_text = request.bid.unwrap_or_default();
    let Some(project_id) = request.project_id else {
        return Err(GatewayError::BadRequest(
            "project ID and bid text required".to_string(),
        ));
    };
    if bid_text.is_empty() {
        return Err(GatewayError::BadRequest(
            "project ID and bid text required".to_string(),
        ));
    }

    let amount = request.amount.unwrap_or(50.0);
    let period = request.period.unwrap_or(7);
    let title = request.project_title.unwrap_or_else(|| "Untitled".to_string());
    let link = request.project_url.unwrap_or_else(|| "#".to_string());

    if store::bids::has_bid_on(&state.pool, &user.email, &link).await? {
        return Err(GatewayError::DuplicateBid);
    }

    let outcome = if state.submit_bids {
        // The bidder id is best-effort; submission proceeds without it.
        let bidder_id = state.marketplace.current_user_id().await;

        state
            .marketplace
            .submit_bid(&BidSubmission {
                project_id,
                bidder_id,
                amount,
                period,
                description: bid_text.clone(),
            })
            .await
    } else {
        SubmissionOutcome::StoredLocally
    };

    let status = match &outcome {
        SubmissionOutcome::Sent { .. } => BidStatus::Sent,
        SubmissionOutcome::Error { .. } => BidStatus::Error,
        SubmissionOutcome::StoredLocally => BidStatus::StoredLocally,
    };

    store::bids::create(
        &state.pool,
        NewBid {
            user_email: user.email.clone(),
            title,
            link,
            amount,
            period,
            bid_text,
            status,
        },
    )
    .await?;

    metrics::counter!(metrics_defs::BIDS_PLACED).increment(1);
    tracing::info!(user = %user.email, project_id, status = %status, "bid placed");

    let (http_status, body) = match outcome {
        SubmissionOutcome::Sent { response } => (
            StatusCode::OK,
            json!({
                "success": true,
                "message": "bid sent successfully",
                "external": response,
            }),
        ),
        SubmissionOutcome::Error { response } => (
            StatusCode::ACCEPTED,
            json!({
                "success": true,
                "message": "bid stored locally (marketplace submission failed)",
                "external": response,
            }),
        ),
        SubmissionOutcome::StoredLocally => (
            StatusCode::ACCEPTED,
            json!({
                "success": true,
                "message": "bid saved locally (submission disabled)",
            }),
        ),
    };

    Ok((http_status, Json(body)))
}
