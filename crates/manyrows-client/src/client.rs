//! Blocking ManyRows client implementation.

use crate::models::{
    CreateCollectionItemRequest, CreateEntityRequest, CreateEntityResponse,
    DeleteCollectionItemsRequest, DeleteOneRequest, DeleteProjectRequest, DeleteRequest, Entity,
    GetOneRequest, MoveCollectionItemRequest, QueryRequest, QueryResponse, RequestOptions,
    UpdateRequest,
};
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
use crate::Result;
use flate2::read::GzDecoder;
use manyrows_core::config::normalize_base_url;
use manyrows_core::uuid::{CollectionUuid, EntityUuid};
use manyrows_core::{Error, ErrorInfo, ManyRowsConfig};
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, LOCATION,
};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const API_VERSION: &str = "v1";
const AUTH_TOKEN_HEADER: &str = "manyrowsauthtoken";
const ENTITY_ID_HEADER: &str = "entityid";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Builder for [`ManyRowsClient`].
#[derive(Clone)]
pub struct ManyRowsClientBuilder {
    config: ManyRowsConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    http: Option<Client>,
}

impl ManyRowsClientBuilder {
    /// Create a builder for the specified base URL and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is neither empty nor a valid URL.
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::from_config(ManyRowsConfig::new(base_url, api_key)?))
    }

    /// Create a builder from an existing configuration.
    #[must_use]
    pub fn from_config(config: ManyRowsConfig) -> Self {
        Self {
            config,
            transport: None,
            http: None,
        }
    }

    /// Request gzip-compressed responses and decode them transparently.
    #[must_use]
    pub fn with_accept_gzip(mut self) -> Self {
        self.config.accept_gzip = true;
        self
    }

    /// Override the request timeout of the default HTTP client.
    ///
    /// The timeout has whole-second granularity; fractional seconds are
    /// rounded up, so 1500 ms becomes 2 s.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout
            .as_secs()
            .saturating_add(u64::from(timeout.subsec_nanos() > 0));
        self
    }

    /// Use an existing blocking HTTP client instead of building one.
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.transport = Some(Arc::new(ReqwestTransport::new(http.clone())));
        self.http = Some(http);
        self
    }

    /// Use a custom transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self.http = None;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the default HTTP
    /// client cannot be built.
    pub fn build(self) -> Result<ManyRowsClient> {
        let mut config = self.config;
        config.base_url = normalize_base_url(&config.base_url);
        config.ensure_valid()?;

        let (transport, http): (Arc<dyn HttpTransport>, Option<Client>) = match self.transport {
            Some(transport) => (transport, self.http),
            None => {
                let transport = ReqwestTransport::from_config(&config)?;
                let http = transport.http_client().clone();
                (Arc::new(transport), Some(http))
            }
        };

        Ok(ManyRowsClient {
            transport,
            http,
            base_url: config.base_url,
            api_key: Arc::new(SecretString::from(config.api_key)),
            accept_gzip: config.accept_gzip,
        })
    }
}

/// Base URL and API key in effect for a single call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions<'a> {
    /// Base URL the request is sent to.
    pub base_url: &'a str,
    /// API key sent with the request.
    pub api_key: &'a str,
}

impl ResolvedOptions<'_> {
    /// Join a path onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the result is not an absolute URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        Url::parse(&raw)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid ManyRows URL `{raw}`: {err}")))
    }
}

impl fmt::Debug for ResolvedOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Blocking client for the ManyRows API.
#[derive(Clone)]
pub struct ManyRowsClient {
    transport: Arc<dyn HttpTransport>,
    http: Option<Client>,
    base_url: String,
    api_key: Arc<SecretString>,
    accept_gzip: bool,
}

impl fmt::Debug for ManyRowsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyRowsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("accept_gzip", &self.accept_gzip)
            .finish_non_exhaustive()
    }
}

impl ManyRowsClient {
    /// Construct a client with the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is neither empty nor a valid URL.
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        ManyRowsClientBuilder::new(base_url, api_key)?.build()
    }

    /// Start a builder for the given base URL and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is neither empty nor a valid URL.
    pub fn builder(
        base_url: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> Result<ManyRowsClientBuilder> {
        ManyRowsClientBuilder::new(base_url, api_key)
    }

    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &ManyRowsConfig) -> Result<Self> {
        ManyRowsClientBuilder::from_config(config.clone()).build()
    }

    /// Return the client-level base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if gzip-compressed responses are requested.
    #[must_use]
    pub const fn accepts_gzip(&self) -> bool {
        self.accept_gzip
    }

    /// Access the transport executing requests.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Access the underlying blocking HTTP client.
    ///
    /// Returns `None` when requests go through a custom [`HttpTransport`].
    #[must_use]
    pub const fn http_client(&self) -> Option<&Client> {
        self.http.as_ref()
    }

    /// Merge per-call overrides with the client defaults.
    ///
    /// Non-empty overrides win; empty or absent ones fall back to the
    /// client-level base URL and API key.
    #[must_use]
    pub fn resolve_options<'a>(&'a self, overrides: &'a RequestOptions) -> ResolvedOptions<'a> {
        let base_url = overrides
            .base_url
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.base_url);
        let api_key = overrides
            .api_key
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.api_key.expose_secret());

        ResolvedOptions { base_url, api_key }
    }

    /// Query entities of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn query(&self, project: &str, kind: &str, request: &QueryRequest) -> Result<QueryResponse> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!("{API_VERSION}/{project}/entities/{kind}/query"))?;
        self.send_json(Method::POST, url, Some(request), options.api_key)
    }

    /// Fetch a single entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientError`] with status 404 if the entity does not exist.
    pub fn get_one(&self, project: &str, kind: &str, request: &GetOneRequest) -> Result<Entity> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/entities/{kind}/{}",
            request.id
        ))?;
        self.send_json::<(), _>(Method::GET, url, None, options.api_key)
    }

    /// Create an entity and return its identity from the response headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response lacks a valid `EntityID` header.
    pub fn create(
        &self,
        project: &str,
        kind: &str,
        request: &CreateEntityRequest,
    ) -> Result<CreateEntityResponse> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!("{API_VERSION}/{project}/entities/{kind}"))?;
        let response = self.send(Method::POST, url, Some(request), options.api_key)?;

        let location = response
            .header(LOCATION.as_str())
            .unwrap_or_default()
            .to_string();
        let entity_id = response
            .header(ENTITY_ID_HEADER)
            .ok_or_else(|| Error::MissingHeader("EntityID".to_string()))?;
        let id = EntityUuid::parse_str(entity_id)?;

        debug!(%id, %location, "Created ManyRows entity");
        Ok(CreateEntityResponse { id, location })
    }

    /// Replace the attributes and status of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientError`] carrying the API's [`ErrorInfo`] when
    /// the update is rejected.
    pub fn update(
        &self,
        project: &str,
        kind: &str,
        entity_id: EntityUuid,
        request: &UpdateRequest,
    ) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/entities/{kind}/{entity_id}"
        ))?;
        self.send(Method::POST, url, Some(request), options.api_key)
            .map(|_| ())
    }

    /// Delete a single entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn delete_one(&self, project: &str, kind: &str, request: &DeleteOneRequest) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/entities/{kind}/{}",
            request.id
        ))?;
        self.send::<()>(Method::DELETE, url, None, options.api_key)
            .map(|_| ())
    }

    /// Delete several entities of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn delete_entities(&self, project: &str, kind: &str, request: &DeleteRequest) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!("{API_VERSION}/{project}/entities/{kind}/delete"))?;
        self.send(Method::POST, url, Some(request), options.api_key)
            .map(|_| ())
    }

    /// Query the items of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn query_collection(
        &self,
        project: &str,
        collection: CollectionUuid,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/collections/{collection}/query"
        ))?;
        self.send_json(Method::POST, url, Some(request), options.api_key)
    }

    /// Add an item linking two entities to a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn create_collection_item(
        &self,
        project: &str,
        collection: CollectionUuid,
        request: &CreateCollectionItemRequest,
    ) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/collections/{collection}"
        ))?;
        self.send(Method::POST, url, Some(request), options.api_key)
            .map(|_| ())
    }

    /// Move a collection item to a new position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn move_collection_item(
        &self,
        project: &str,
        collection: CollectionUuid,
        request: &MoveCollectionItemRequest,
    ) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/collections/{collection}/move"
        ))?;
        self.send(Method::POST, url, Some(request), options.api_key)
            .map(|_| ())
    }

    /// Remove items from a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn delete_collection_items(
        &self,
        project: &str,
        collection: CollectionUuid,
        request: &DeleteCollectionItemsRequest,
    ) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!(
            "{API_VERSION}/{project}/collections/{collection}/remove"
        ))?;
        self.send(Method::POST, url, Some(request), options.api_key)
            .map(|_| ())
    }

    /// Delete a project and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub fn delete_project(&self, request: &DeleteProjectRequest) -> Result<()> {
        let options = self.resolve_options(&request.options);
        let url = options.endpoint(&format!("s/projects/{}", request.id))?;
        self.send::<()>(Method::DELETE, url, None, options.api_key)
            .map(|_| ())
    }

    fn send_json<B, R>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        api_key: &str,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(method, url, body, api_key)?;
        decode_json(&response.body, self.accept_gzip)
    }

    fn send<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        api_key: &str,
    ) -> Result<TransportResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|err| Error::SerializeError(err.to_string()))?;
        self.dispatch(method, url, body, api_key)
    }

    fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        api_key: &str,
    ) -> Result<TransportResponse> {
        let request = TransportRequest {
            headers: self.request_headers(api_key)?,
            method,
            url,
            body,
        };

        debug!(method = %request.method, url = %request.url, "Sending ManyRows request");

        let response = self.transport.execute(&request).map_err(|err| {
            warn!(method = %request.method, url = %request.url, error = %err, "ManyRows request failed");
            err
        })?;

        classify_response(response, self.accept_gzip).map_err(|err| {
            warn!(
                method = %request.method,
                url = %request.url,
                status = err.http_status(),
                "ManyRows request returned an error status"
            );
            err
        })
    }

    fn request_headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(api_key)
            .map_err(|err| Error::ConfigError(format!("Invalid ManyRows API key: {err}")))?;
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.accept_gzip {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        }
        Ok(headers)
    }
}

/// Sorts a response into success, client error (4xx) or server error.
///
/// Only 4xx bodies are decoded, as [`ErrorInfo`]. Anything outside 2xx and
/// 4xx is reported with its status code alone.
fn classify_response(response: TransportResponse, accept_gzip: bool) -> Result<TransportResponse> {
    let status = response.status;

    if status.is_success() {
        return Ok(response);
    }

    if status.is_client_error() {
        let mut info = decode_json::<ErrorInfo>(&response.body, accept_gzip).unwrap_or_else(|_| {
            let text = String::from_utf8_lossy(&response.body).trim().to_string();
            ErrorInfo {
                message: (!text.is_empty()).then_some(text),
                ..ErrorInfo::default()
            }
        });
        info.http_code = Some(status.as_u16());
        return Err(Error::ClientError(info));
    }

    Err(Error::ServerError(ErrorInfo::from_status(status.as_u16())))
}

/// Decodes a JSON body, gunzipping it first when gzip was accepted and the
/// transport left the body compressed.
fn decode_json<T>(body: &[u8], accept_gzip: bool) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = if accept_gzip && body.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(body).read_to_end(&mut decoded)?;
        Cow::Owned(decoded)
    } else {
        Cow::Borrowed(body)
    };

    serde_json::from_slice(&body)
        .map_err(|err| Error::ParseError(format!("Failed to parse ManyRows response: {err}")))
}
