//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FM_API_BASE` - Backend API base URL (default: `http://localhost:3000/api`)
//! - `FM_ASSET_BASE` - Base URL for relative product image paths (default: `http://localhost:3000`)
//! - `FM_DATA_DIR` - Directory holding the persisted cart and session (default: `.farmers-market`)
//! - `FM_REQUEST_TIMEOUT_SECS` - Backend request timeout in seconds (default: 10)
//! - `FM_CURRENCY_SYMBOL` - Symbol printed before prices (default: `₹`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
const DEFAULT_ASSET_BASE: &str = "http://localhost:3000";
const DEFAULT_DATA_DIR: &str = ".farmers-market";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API base URL (no trailing slash)
    pub api_base: Url,
    /// Base URL that relative image paths are resolved against
    pub asset_base: Url,
    /// Directory for the file-backed key-value storage
    pub data_dir: PathBuf,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
    /// Currency symbol used when rendering prices
    pub currency_symbol: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = parse_url(
            "FM_API_BASE",
            &get_env_or_default(&lookup, "FM_API_BASE", DEFAULT_API_BASE),
        )?;
        let asset_base = parse_url(
            "FM_ASSET_BASE",
            &get_env_or_default(&lookup, "FM_ASSET_BASE", DEFAULT_ASSET_BASE),
        )?;
        let data_dir = PathBuf::from(get_env_or_default(&lookup, "FM_DATA_DIR", DEFAULT_DATA_DIR));
        let timeout_secs =
            get_env_or_default(&lookup, "FM_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("FM_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FM_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let currency_symbol = get_optional_env(&lookup, "FM_CURRENCY_SYMBOL")
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Self {
            api_base,
            asset_base,
            data_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            currency_symbol,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse a base URL, dropping any trailing slash from its path.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base.as_str(), "http://localhost:3000/api");
        assert_eq!(config.data_dir, PathBuf::from(".farmers-market"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.currency_symbol, "₹");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("FM_API_BASE", "https://market.example/api/")]))
                .unwrap();
        assert_eq!(config.api_base.as_str(), "https://market.example/api");
    }

    #[test]
    fn test_invalid_url() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[("FM_API_BASE", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "FM_API_BASE"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("FM_REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(result.is_err());

        let result = StorefrontConfig::from_lookup(lookup_from(&[("FM_REQUEST_TIMEOUT_SECS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("FM_CURRENCY_SYMBOL", "  "),
            ("FM_DATA_DIR", "/tmp/fm"),
        ]))
        .unwrap();
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fm"));
    }
}
