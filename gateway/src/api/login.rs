use crate::AppState;
use crate::auth::AuthServiceError;
use crate::errors::{GatewayError, Result};
use crate::metrics_defs;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Authenticate against the external auth service and relay its token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<JsonValue>> {
    let email = request.email.trim();
    let password = request.password.trim();

    if email.is_empty() || password.is_empty() {
        return Err(GatewayError::BadRequest(
            "email and password required".to_string(),
        ));
    }

    let success = state.auth.login(email, password).await.map_err(|e| {
        metrics::counter!(metrics_defs::LOGIN_FAILURES).increment(1);
        match e {
            AuthServiceError::RateLimited => GatewayError::RateLimited(e.to_string()),
            AuthServiceError::MissingToken => GatewayError::Unauthorized(e.to_string()),
            AuthServiceError::Unavailable(_) => GatewayError::Upstream(e.to_string()),
        }
    })?;

    tracing::info!(email, "login succeeded");

    Ok(Json(json!({
        "success": true,
        "token": success.token,
        "user": success.user,
    })))
}
