//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs issued by the external auth service and verified
//! here by signature only; the shared secret comes from configuration. The
//! login endpoint proxies credentials to that service and relays its token.

use crate::AppState;
use crate::errors::GatewayError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Claims carried by an auth-service token.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub email: String,
    /// Expiry as seconds since the epoch; tokens without one never expire.
    pub exp: Option<u64>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("invalid token")]
    Malformed,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("invalid token signature")]
    BadSignature,

    #[error("session expired, please log in again")]
    Expired,
}

/// Verify an HS256 JWT and return its claims.
///
/// # Errors
/// Returns `TokenError` for anything other than a well-formed, correctly
/// signed, unexpired token.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut segments = token.split('.');
    let (header_b64, payload_b64, signature_b64) = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(signature), None) => (header, payload, signature),
        _ => return Err(TokenError::Malformed),
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| TokenError::Malformed)?;
    let header: JsonValue =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if header.get("alg").and_then(JsonValue::as_str) != Some("HS256") {
        return Err(TokenError::UnsupportedAlgorithm);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if let Some(exp) = claims.exp {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if exp <= now {
            return Err(TokenError::Expired);
        }
    }

    Ok(claims)
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                GatewayError::Unauthorized("unauthorized, please log in".to_string())
            })?;

        let claims = verify_token(token, &state.jwt_secret)
            .map_err(|e| GatewayError::Unauthorized(e.to_string()))?;

        Ok(AuthUser {
            email: claims.email,
        })
    }
}

/// What came back from the external auth service on success.
#[derive(Debug)]
pub struct LoginSuccess {
    pub token: String,
    pub user: JsonValue,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthServiceError {
    #[error("too many requests, please wait a minute and try again")]
    RateLimited,

    #[error("auth service did not provide a token")]
    MissingToken,

    #[error("auth service error: {0}")]
    Unavailable(String),
}

/// Client for the external auth service's login endpoint.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    url: String,
}

impl AuthClient {
    pub fn new(url: &str) -> Self {
        AuthClient {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Forward credentials to the auth service and relay its token.
    ///
    /// # Errors
    /// `RateLimited` passes the service's 429 through; `MissingToken` covers
    /// a 2xx response without a token; everything else is `Unavailable`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSuccess, AuthServiceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({"email": email, "password": password}))
            .timeout(LOGIN_TIMEOUT)
            .send()
            .await
            .map_err(|e| AuthServiceError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthServiceError::RateLimited);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AuthServiceError::Unavailable(e.to_string()))?;

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| AuthServiceError::Unavailable(e.to_string()))?;

        let token = body
            .get("token")
            .and_then(JsonValue::as_str)
            .ok_or(AuthServiceError::MissingToken)?
            .to_string();

        Ok(LoginSuccess {
            token,
            user: body.get("user").cloned().unwrap_or(JsonValue::Null),
        })
    }
}

#[cfg(test)]
pub(crate) fn issue_token(email: &str, exp: Option<u64>, secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = match exp {
        Some(exp) => json!({"email": email, "exp": exp}),
        None => json!({"email": email}),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{header}.{payload}.{signature}")
}
