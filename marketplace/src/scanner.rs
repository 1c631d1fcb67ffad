//! Incremental project scanner.
//!
//! Walks the marketplace's numeric project-ID space from a caller-supplied
//! starting point, fetching each ID's detail record until enough valid
//! projects are collected or the attempt budget runs out. IDs with no usable
//! project are skipped, not errors; an ID gap larger than the budget yields
//! an incomplete result.

use crate::client::MarketplaceClient;
use crate::metrics_defs;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::sleep;

/// Budget and pacing for one scan invocation.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Stop after collecting this many valid projects.
    pub target_count: usize,
    /// Stop after examining this many IDs, collected or not.
    pub max_attempts: usize,
    /// Unconditional delay between consecutive IDs.
    pub politeness_delay: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            target_count: 20,
            max_attempts: 50,
            politeness_delay: Duration::from_millis(300),
        }
    }
}

/// Result of one scan invocation.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Valid project records, in the order their IDs were visited.
    pub collected: Vec<JsonValue>,
    /// Every ID examined, consecutive from the starting ID.
    pub checked_ids: Vec<u64>,
    /// The last ID examined.
    pub last_id: u64,
}

/// Walk project IDs upward from `start_id`.
///
/// The cursor advances by one per attempt; a 429 on a given ID is retried
/// in place by the fetcher and consumes only the one attempt its final
/// verdict settles. An empty `collected` is a normal outcome.
pub async fn scan(
    client: &MarketplaceClient,
    start_id: u64,
    config: &ScannerConfig,
) -> ScanOutcome {
    let mut cursor = start_id;
    let mut attempts = 0usize;
    let mut collected = Vec::new();
    let mut checked_ids = Vec::new();

    while collected.len() < config.target_count && attempts < config.max_attempts {
        checked_ids.push(cursor);
        metrics::counter!(metrics_defs::SCAN_ATTEMPTS).increment(1);

        if let Some(project) = client.fetch_project(cursor).await {
            metrics::counter!(metrics_defs::SCAN_COLLECTED).increment(1);
            collected.push(project);
        }

        // Politeness delay, applied regardless of the fetch outcome.
        if !config.politeness_delay.is_zero() {
            sleep(config.politeness_delay).await;
        }

        cursor += 1;
        attempts += 1;
    }

    let last_id = checked_ids.last().copied().unwrap_or(start_id);

    tracing::info!(
        start_id,
        last_id,
        collected = collected.len(),
        attempts,
        "scan finished"
    );

    ScanOutcome {
        collected,
        checked_ids,
        last_id,
    }
}
