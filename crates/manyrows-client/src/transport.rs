//! HTTP transport used by [`ManyRowsClient`](crate::ManyRowsClient).
//!
//! Requests and responses cross the transport as plain data so the dispatch
//! and status classification logic can run against any backend. The default
//! backend is a blocking [`reqwest`] client.

use crate::Result;
use manyrows_core::{Error, ManyRowsConfig};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("manyrows-client/", env!("CARGO_PKG_VERSION"));

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create a response with no headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Executes HTTP requests on behalf of the client.
///
/// Implementations only report failures to obtain a response; every HTTP
/// status, including errors, is returned as a [`TransportResponse`].
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport: Send + Sync {
    /// Execute a request and return the complete response.
    ///
    /// # Errors
    ///
    /// Returns an error when no response could be obtained.
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

/// [`HttpTransport`] backed by a blocking [`reqwest`] client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Wrap an existing client, which may be shared with other callers.
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }

    /// Build the default client for a configuration.
    ///
    /// Transparent gzip decoding is only enabled when the configuration
    /// accepts gzip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ManyRowsConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        if !config.accept_gzip {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build ManyRows HTTP client: {err}"))
        })?;

        Ok(Self { http })
    }

    /// Access the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &Client {
        &self.http
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        debug!(status = status.as_u16(), bytes = body.len(), "Received ManyRows response");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
