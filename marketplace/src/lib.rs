//! Client for the freelance marketplace's REST API.
//!
//! Everything outbound to the marketplace lives here: the search proxy, the
//! rate-limited project-detail fetcher and the incremental scanner built on
//! it, bulk client-reputation lookups, and bid submission. The gateway crate
//! turns these into HTTP endpoints.

pub mod client;
pub mod enrich;
pub mod error;
pub mod metrics_defs;
pub mod scanner;
pub mod shape;

pub use client::{BidSubmission, MarketplaceClient, SearchFilters, SubmissionOutcome};
pub use enrich::{ClientSummary, enrich};
pub use error::MarketplaceError;
pub use scanner::{ScanOutcome, ScannerConfig, scan};
pub use shape::{FormattedProject, shape};
