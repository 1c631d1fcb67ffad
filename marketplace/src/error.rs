use thiserror::Error;

/// Errors from marketplace API calls that are surfaced to the caller.
///
/// Best-effort paths (enrichment, self lookup, bid submission) do not use
/// this type; their failures are ordinary return values.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("marketplace error: {0}")]
    Envelope(String),
}
