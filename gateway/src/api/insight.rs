use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::Result;
use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

/// The reporting superuser sees every user's bids.
const ADMIN_EMAIL: &str = "admin";

#[derive(Deserialize, Default)]
pub struct InsightParams {
    month: Option<String>,
}

/// Monthly bid report grouped by user and day. Defaults to the current
/// UTC month; non-admin callers only see their own bids.
pub async fn bid_insight(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<InsightParams>,
) -> Result<Json<JsonValue>> {
    let month = params
        .month
        .unwrap_or_else(|| Utc::now().format("%Y-%m").to_string());

    let scope = if user.email == ADMIN_EMAIL {
        None
    } else {
        Some(user.email.as_str())
    };

    let data = store::bids::monthly_insight(&state.pool, &month, scope).await?;

    Ok(Json(json!({"month": month, "data": data})))
}
