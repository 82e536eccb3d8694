// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000/api/users";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8001";
const DEFAULT_STORE_PATH: &str = ".cpdash/store.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Auth/account backend (register, login, profile, link, refresh, unlink)
    pub api_url: String,
    /// Platform profile and hint-generation backend
    pub api_base_url: String,
    /// Where the local session/link cache is persisted
    pub store_path: PathBuf,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default matching a local development backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: base_url_var("API_URL", DEFAULT_API_URL)?,
            api_base_url: base_url_var("API_BASE_URL", DEFAULT_API_BASE_URL)?,
            store_path: env::var("CPDASH_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Config for tests, pointing both backends at the given base URL.
    pub fn test_default(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_url: format!("{}/api/users", base),
            api_base_url: base.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            http_timeout: Duration::from_secs(5),
        }
    }
}

/// Read a base URL, stripping any trailing slash so paths can be appended.
fn base_url_var(name: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    let value = value.trim().trim_end_matches('/').to_string();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::Invalid(name, value));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: '{1}'")]
    Invalid(&'static str, String),
}
