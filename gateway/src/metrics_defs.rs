//! Metric names emitted by the gateway.

/// Login attempts rejected by the auth service.
pub const LOGIN_FAILURES: &str = "gateway.login.failures";

/// Incremental scans started.
pub const SCANS_STARTED: &str = "gateway.scans.started";

/// Scans that exhausted their budget without collecting anything.
pub const SCANS_EMPTY: &str = "gateway.scans.empty";

/// Bids placed through the gateway (any submission outcome).
pub const BIDS_PLACED: &str = "gateway.bids.placed";
