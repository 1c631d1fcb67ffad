use crate::auth::{AuthClient, issue_token};
use crate::{AppState, router};
use composer::ComposerClient;
use marketplace::{MarketplaceClient, ScannerConfig};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const TEST_SECRET: &str = "test-secret";

/// Application state wired against test upstreams and an in-memory store.
pub async fn test_state(auth_url: &str, marketplace_url: &str, composer_url: &str) -> AppState {
    AppState {
        auth: AuthClient::new(auth_url),
        marketplace: MarketplaceClient::new(marketplace_url, "test-token"),
        composer: ComposerClient::new(composer_url, "test-model", "secret"),
        pool: store::open_in_memory().await.expect("open in-memory store"),
        jwt_secret: TEST_SECRET.to_string(),
        agency: "Northline Digital".to_string(),
        submit_bids: true,
        scanner: ScannerConfig {
            politeness_delay: Duration::ZERO,
            ..ScannerConfig::default()
        },
    }
}

/// Serve the app on an ephemeral port and return its base URL.
pub async fn spawn(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("serve test app");
    });

    format!("http://{addr}")
}

/// A valid bearer token for `email`, expiring an hour from now.
pub fn bearer(email: &str) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_secs()
        + 3600;
    format!("Bearer {}", issue_token(email, Some(exp), TEST_SECRET))
}
