use thiserror::Error;

/// Errors from the generative-language API call.
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("model returned no content")]
    NoContent,
}
