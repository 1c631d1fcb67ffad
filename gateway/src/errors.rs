//! Gateway error taxonomy and its mapping onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for gateway handlers.
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Errors a handler can surface to the caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request body or query failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// A scan exhausted its budget without collecting anything.
    #[error("no projects found")]
    NoProjects { checked_ids: Vec<u64> },

    /// A referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The user already has a bid stored for this project link.
    #[error("already bid")]
    DuplicateBid,

    /// An upstream rate limit that is passed through to the caller.
    #[error("{0}")]
    RateLimited(String),

    /// An upstream collaborator failed or answered garbage.
    #[error("{0}")]
    Upstream(String),

    #[error("internal error")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::NoProjects { .. } | GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::DuplicateBid => StatusCode::CONFLICT,
            GatewayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let GatewayError::Internal(detail) = &self {
            tracing::error!(%detail, "internal error");
        }

        let body = match &self {
            GatewayError::NoProjects { checked_ids } => json!({
                "error": self.to_string(),
                "checked_ids": checked_ids,
            }),
            _ => json!({"error": self.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

impl From<marketplace::MarketplaceError> for GatewayError {
    fn from(e: marketplace::MarketplaceError) -> Self {
        GatewayError::Upstream(e.to_string())
    }
}

impl From<composer::ComposerError> for GatewayError {
    fn from(e: composer::ComposerError) -> Self {
        GatewayError::Upstream(e.to_string())
    }
}

impl From<store::StoreError> for GatewayError {
    fn from(e: store::StoreError) -> Self {
        match e {
            store::StoreError::InvalidMonth(month) => {
                GatewayError::BadRequest(format!("invalid month: {month}"))
            }
            other => GatewayError::Internal(other.to_string()),
        }
    }
}
