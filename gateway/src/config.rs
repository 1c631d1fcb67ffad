//! Application configuration.
//!
//! One YAML document configures the whole service; each section feeds one
//! component at construction time, so nothing reads process-wide state.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("port cannot be 0")]
    InvalidPort,

    #[error("auth.jwt_secret must not be empty")]
    EmptyJwtSecret,

    #[error("auth.url must not be empty")]
    EmptyAuthUrl,

    #[error("marketplace.token must not be empty")]
    EmptyMarketplaceToken,

    #[error("composer.api_key must not be empty")]
    EmptyComposerKey,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8600,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Login endpoint of the external auth service.
    pub url: String,
    /// Shared HS256 secret the auth service signs tokens with.
    pub jwt_secret: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub token: String,
    /// When false, bids are stored locally and never submitted upstream.
    #[serde(default = "default_true")]
    pub submit_bids: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ComposerConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Agency name interpolated into proposal templates.
    #[serde(default = "default_agency")]
    pub agency: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub path: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub auth: AuthConfig,
    pub marketplace: MarketplaceConfig,
    pub composer: ComposerConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Validate the configuration before anything is constructed from it.
    ///
    /// # Errors
    /// Returns the first `ValidationError` encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.auth.url.is_empty() {
            return Err(ValidationError::EmptyAuthUrl);
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ValidationError::EmptyJwtSecret);
        }
        if self.marketplace.token.is_empty() {
            return Err(ValidationError::EmptyMarketplaceToken);
        }
        if self.composer.api_key.is_empty() {
            return Err(ValidationError::EmptyComposerKey);
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_agency() -> String {
    "our team".to_string()
}
