//! Metric names emitted by the marketplace client.

/// IDs examined by the incremental scanner.
pub const SCAN_ATTEMPTS: &str = "marketplace.scan.attempts";

/// Valid projects collected by the incremental scanner.
pub const SCAN_COLLECTED: &str = "marketplace.scan.collected";

/// 429 responses absorbed by the project-detail fetcher.
pub const FETCH_RATE_LIMITED: &str = "marketplace.fetch.rate_limited";

/// External bid submissions the marketplace accepted.
pub const SUBMIT_ACCEPTED: &str = "marketplace.submit.accepted";

/// External bid submissions that failed or were rejected.
pub const SUBMIT_FAILURES: &str = "marketplace.submit.failures";

/// Bulk user lookups that degraded to an empty client map.
pub const ENRICH_FAILURES: &str = "marketplace.enrich.failures";
