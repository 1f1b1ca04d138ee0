//! Process configuration.
//!
//! Loads configuration from environment variables.

use std::env;

use thiserror::Error;

use crate::github::ClientSettings;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `PORT` is set but is not a valid port number.
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

/// Configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Listen port (`PORT`, default 8080).
    pub port: u16,

    /// Webhook secret (`GH_SECRET`). `None` disables signature checks.
    pub webhook_secret: Option<String>,

    /// API bearer token (`GH_AUTH`).
    pub github_token: Option<String>,

    /// API base URI (`GH_API_URL`), for GitHub Enterprise.
    pub github_api_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("github_api_url", &self.github_api_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            webhook_secret: var("GH_SECRET"),
            github_token: var("GH_AUTH"),
            github_api_url: var("GH_API_URL"),
        })
    }

    /// The webhook secret as bytes, if signature checks are enabled.
    pub fn secret_bytes(&self) -> Option<Vec<u8>> {
        self.webhook_secret.as_ref().map(|s| s.as_bytes().to_vec())
    }

    /// Settings for the outbound API client.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            token: self.github_token.clone(),
            base_uri: self.github_api_url.clone(),
        }
    }
}
