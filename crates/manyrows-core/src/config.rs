//! Configuration structures for ManyRows clients.
//!
//! This module provides the configuration type for connecting to the
//! ManyRows API, including endpoint, credentials, compression and timeouts.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::{Validate, ValidationError};

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default connect (and TLS handshake) timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a ManyRows client instance.
///
/// The base URL may be left empty when every request supplies its own
/// override; otherwise it must be an absolute URL.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ManyRowsConfig {
    /// API base URL, without the version segment
    #[validate(custom(function = "validate_base_url"))]
    #[serde(default)]
    pub base_url: String,

    /// API key sent as the auth token header
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Whether to request gzip-compressed responses
    #[serde(default)]
    pub accept_gzip: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn validate_base_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Url::parse(value).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Trims surrounding whitespace and trailing slashes from a base URL.
#[must_use]
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

impl ManyRowsConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API base URL (e.g., "https://api.manyrows.com"), may be empty
    /// * `api_key` - The API key, may be empty
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: normalize_base_url(base_url.as_ref()),
            api_key: api_key.into(),
            ..Self::default()
        };

        config.ensure_valid()?;
        Ok(config)
    }

    /// Load a configuration from a JSON document, applying defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or validation fails.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration document: {e}")))?;
        config.base_url = normalize_base_url(&config.base_url);

        config.ensure_valid()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every failed constraint.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Enable or disable gzip-compressed responses.
    #[must_use]
    pub const fn with_accept_gzip(mut self, enabled: bool) -> Self {
        self.accept_gzip = enabled;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set connect timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl fmt::Debug for ManyRowsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyRowsConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &(!self.api_key.is_empty()).then_some("[REDACTED]"),
            )
            .field("accept_gzip", &self.accept_gzip)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for ManyRowsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            accept_gzip: false,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_trims_base_url() {
        let config = ManyRowsConfig::new(" https://someurl.com ", "abcd").unwrap();
        assert_eq!(config.base_url, "https://someurl.com");
        assert_eq!(config.api_key, "abcd");
        assert!(!config.accept_gzip);
    }

    #[test]
    fn test_config_new_strips_trailing_slash() {
        let config = ManyRowsConfig::new("https://someurl.com/api/", "").unwrap();
        assert_eq!(config.base_url, "https://someurl.com/api");
    }

    #[test]
    fn test_config_new_blank_params() {
        let config = ManyRowsConfig::new("", "").unwrap();
        assert_eq!(config.base_url, "");
        assert_eq!(config.api_key, "");
        assert!(!config.accept_gzip);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_invalid_url() {
        let result = ManyRowsConfig::new("not-a-url", "key");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = ManyRowsConfig::new("https://api.example.com", "key")
            .unwrap()
            .with_accept_gzip(true)
            .with_timeout(60)
            .with_connect_timeout(5);

        assert!(config.accept_gzip);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_from_json_applies_defaults() {
        let config =
            ManyRowsConfig::from_json(r#"{"base_url": "https://api.example.com/ "}"#).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert!(config.api_key.is_empty());
        assert!(!config.accept_gzip);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_config_from_json_rejects_out_of_range_timeout() {
        let result = ManyRowsConfig::from_json(
            r#"{"base_url": "https://api.example.com", "request_timeout_secs": 0}"#,
        );
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_from_json_rejects_malformed_document() {
        let result = ManyRowsConfig::from_json("{base_url");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_serialization_skips_empty_api_key() {
        let config = ManyRowsConfig::new("https://api.example.com", "").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("api_key"));

        let config = ManyRowsConfig::new("https://api.example.com", "secret").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ManyRowsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.api_key, "secret");
        assert_eq!(deserialized.base_url, config.base_url);
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = ManyRowsConfig::new("https://api.example.com", "super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("https://api.example.com"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ManyRowsConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());

        config.connect_timeout_secs = 61;
        assert!(config.validate().is_err());
    }
}
