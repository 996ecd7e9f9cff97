//! Backend endpoint configuration.

use crate::error::{ConnectError, Result};

/// Environment variable holding the backend project base URL.
pub const API_URL_ENV: &str = "FINTRACK_API_URL";
/// Environment variable holding the project's publishable API key.
pub const PUBLISHABLE_KEY_ENV: &str = "FINTRACK_PUBLISHABLE_KEY";

/// Base URL and publishable key identifying the backend project instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    /// Build a config from explicit values. The base URL is normalized by
    /// trimming whitespace and any trailing `/`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    /// Read the config from `FINTRACK_API_URL` and `FINTRACK_PUBLISHABLE_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = required_env(API_URL_ENV)?;
        let api_key = required_env(PUBLISHABLE_KEY_ENV)?;
        Ok(Self::new(&base_url, &api_key))
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConnectError::invalid_request(format!("{} not configured", name)))
}
