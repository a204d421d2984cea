//! Error types for ManyRows operations.
//!
//! This module provides the error type shared by every ManyRows crate,
//! together with [`ErrorInfo`], the structured error body the API returns
//! for rejected requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for ManyRows operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The API could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The API rejected the request with a 4xx status
    #[error("Client error: {0}")]
    ClientError(ErrorInfo),

    /// The API answered with a 5xx or otherwise unexpected status
    #[error("Unexpected server error: {0}")]
    ServerError(ErrorInfo),

    /// Failed to parse a response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Failed to serialize a request body
    #[error("Failed to serialize request: {0}")]
    SerializeError(String),

    /// Failed to decompress a gzip response body
    #[error("Failed to decompress response: {0}")]
    DecompressError(String),

    /// Invalid UUID format
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// An expected response header was absent
    #[error("Missing response header: {0}")]
    MissingHeader(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for ManyRows operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error detail returned by the API.
///
/// Populated only for 4xx and 5xx responses. For 5xx responses only
/// [`ErrorInfo::http_code`] is set since the body is never decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Attribute the error relates to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Free-form additional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status code of the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    /// Machine-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ErrorInfo {
    /// Create an error detail carrying only the HTTP status code.
    #[must_use]
    pub fn from_status(http_code: u16) -> Self {
        Self {
            http_code: Some(http_code),
            ..Self::default()
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_code {
            Some(code) => write!(f, "status code was {code}")?,
            None => write!(f, "unknown status code")?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field `{field}`)")?;
        }
        Ok(())
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ClientError(_) => "CLIENT_ERROR",
            Self::ServerError(_) => "SERVER_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::SerializeError(_) => "SERIALIZE_ERROR",
            Self::DecompressError(_) => "DECOMPRESS_ERROR",
            Self::InvalidUuid(_) => "INVALID_UUID",
            Self::MissingHeader(_) => "MISSING_HEADER",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns the structured API error detail, if the API answered with an
    /// error status.
    #[must_use]
    pub const fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            Self::ClientError(info) | Self::ServerError(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the HTTP status code of the failed response, if any.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        self.error_info().and_then(|info| info.http_code)
    }

    /// Returns true if the API answered with `404 Not Found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClientError(_)) && self.http_status() == Some(404)
    }

    /// Returns true if the request never produced an HTTP response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::HttpError(_) | Self::Timeout(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::DecompressError(err.to_string())
    }
}
