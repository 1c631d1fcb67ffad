use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::{GatewayError, Result};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use store::{BidPatch, BidStatus, NewBid};

#[derive(Deserialize)]
pub struct AddBidRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    period: i64,
    #[serde(default)]
    bid_text: String,
    status: Option<BidStatus>,
}

/// Store a bid directly, without going through the submission flow.
pub async fn add_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddBidRequest>,
) -> Result<(StatusCode, Json<JsonValue>)> {
    let bid = store::bids::create(
        &state.pool,
        NewBid {
            user_email: user.email,
            title: request.title,
            link: request.link,
            amount: request.amount,
            period: request.period,
            bid_text: request.bid_text,
            status: request.status.unwrap_or(BidStatus::StoredLocally),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "bid stored successfully",
            "bid_id": bid.id,
        })),
    ))
}

/// The caller's own bids, newest first.
pub async fn my_bids(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JsonValue>> {
    let bids = store::bids::list_for_user(&state.pool, &user.email).await?;
    Ok(Json(json!({"success": true, "bids": bids})))
}

/// Every stored bid, newest first.
pub async fn all_bids(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<JsonValue>> {
    let bids = store::bids::list_all(&state.pool).await?;
    Ok(Json(json!({"success": true, "bids": bids})))
}

/// Patch a stored bid.
pub async fn edit_bid(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(bid_id): Path<String>,
    Json(patch): Json<BidPatch>,
) -> Result<Json<JsonValue>> {
    if patch.is_empty() {
        return Err(GatewayError::BadRequest(
            "no valid fields provided".to_string(),
        ));
    }

    if !store::bids::update(&state.pool, &bid_id, &patch).await? {
        return Err(GatewayError::NotFound("bid not found".to_string()));
    }

    Ok(Json(json!({"success": true, "message": "bid updated successfully"})))
}

/// Delete a stored bid.
pub async fn remove_bid(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(bid_id): Path<String>,
) -> Result<Json<JsonValue>> {
    if !store::bids::delete(&state.pool, &bid_id).await? {
        return Err(GatewayError::NotFound("bid not found".to_string()));
    }

    Ok(Json(json!({"success": true, "message": "bid deleted successfully"})))
}
