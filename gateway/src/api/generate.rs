use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use composer::{graphics_proposal, proposal_prompt};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

#[derive(Deserialize, Default)]
pub struct GenerateRequest {
    #[serde(default)]
    project: JsonValue,
}

/// Generate a proposal for the given project through the language model.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<JsonValue>> {
    let prompt = proposal_prompt(&request.project, &state.agency);
    let bid = state.composer.generate(&prompt).await?;

    tracing::info!(user = %user.email, chars = bid.len(), "proposal generated");

    Ok(Json(json!({"bid": bid})))
}

/// Static proposal for graphics projects; no model round-trip.
pub async fn generate_graphics(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<GenerateRequest>,
) -> Json<JsonValue> {
    let bid = graphics_proposal(&request.project, &state.agency);
    Json(json!({"bid": bid}))
}
