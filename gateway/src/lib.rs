//! Inbound HTTP surface for bidflow.
//!
//! Validates JSON request bodies, enforces the bearer-token auth guard, and
//! forwards to the marketplace, composer, and store crates. Every error maps
//! to a JSON body with the HTTP status the caller expects.

use axum::Router;
use axum::routing::{get, post, put};
use marketplace::{MarketplaceClient, ScannerConfig};
use sqlx::{Pool, Sqlite};
use tokio::net::TcpListener;

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod metrics_defs;

#[cfg(test)]
pub mod testutils;

use auth::AuthClient;
use composer::ComposerClient;

/// Shared state behind every handler. Cheap to clone; the clients are
/// Arc-backed handles and the pool is itself a handle.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub marketplace: MarketplaceClient,
    pub composer: ComposerClient,
    pub pool: Pool<Sqlite>,
    pub jwt_secret: String,
    pub agency: String,
    pub submit_bids: bool,
    pub scanner: ScannerConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health))
        .route("/login", post(api::login::login))
        .route("/search", post(api::search::search))
        .route("/scan", post(api::scan::scan))
        .route("/generate", post(api::generate::generate))
        .route("/generate_graphics", post(api::generate::generate_graphics))
        .route("/place_bid", post(api::place_bid::place_bid))
        .route("/api/bids", post(api::bids::add_bid))
        .route("/api/bids/mine", get(api::bids::my_bids))
        .route("/api/bids/all", get(api::bids::all_bids))
        .route(
            "/api/bids/{bid_id}",
            put(api::bids::edit_bid).delete(api::bids::remove_bid),
        )
        .route("/api/bid_insight", get(api::insight::bid_insight))
        .with_state(state)
}

/// Bind the configured listener and serve until the process exits.
///
/// # Errors
/// Returns `ServeError` if the listener cannot be bound.
pub async fn serve(listener: &config::Listener, state: AppState) -> Result<(), ServeError> {
    let app = router(state);
    let addr = format!("{}:{}", listener.host, listener.port);

    tracing::info!(addr = %addr, "gateway listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
