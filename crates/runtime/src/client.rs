//! Transport abstraction and the default reqwest-backed implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClientError, TransportError};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// One API call, before URL assembly.
#[derive(Debug, Clone)]
pub struct ClientRequest {
    /// Operation name, used for logs and error context.
    pub operation: String,
    pub method: Method,
    /// Path template such as `/Destiny2/{membershipType}/Profile/`.
    pub path: String,
    pub path_params: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
    /// Overrides the client's configured base URL.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientRequest {
    pub fn new(operation: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            method,
            path: path.into(),
            path_params: BTreeMap::new(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            base_url: None,
            timeout: None,
        }
    }

    pub fn get(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let encoded = serde_json::to_vec(body).map_err(|source| ClientError::Encode {
            operation: self.operation.clone(),
            source,
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    /// Absolute URL of this request against `base`.
    ///
    /// Each `{name}` segment of the path template is replaced by its
    /// parameter, percent-encoded as a single path segment. Query pairs are
    /// sorted by name.
    pub fn url(&self, base: &str) -> Result<Url, TransportError> {
        let invalid = |source| TransportError::InvalidUrl {
            url: base.to_string(),
            source,
        };
        let mut url = Url::parse(base).map_err(invalid)?;
        url.path_segments_mut()
            .map_err(|()| invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(self.path.trim_start_matches('/').split('/').map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|name| name.strip_suffix('}'))
                    .and_then(|name| self.path_params.get(name))
                    .map_or(segment, String::as_str)
            }));
        if !self.query.is_empty() {
            let mut pairs: Vec<&(String, String)> = self.query.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

/// Status and full body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and returns the raw exchange.
///
/// Implementations return `Ok` for any status the server answered with;
/// only failures to obtain a response are errors.
#[async_trait]
pub trait Client: Send + Sync + fmt::Debug {
    async fn execute(&self, request: ClientRequest) -> Result<RawResponse, TransportError>;
}

/// A reqwest client carrying the configured user agent and deadline.
///
/// Shared by everything that talks to the API or its content host.
pub fn http_client(config: &ApiConfig) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(|err| {
        warn!(error = %err, "Failed to build HTTP client.");
        TransportError::Connection(err)
    })
}

/// Sends requests with reqwest, adding the API key header to each.
#[derive(Debug, Clone)]
pub struct DefaultClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DefaultClient {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: http_client(config)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn build_url(&self, request: &ClientRequest) -> Result<Url, TransportError> {
        request.url(request.base_url.as_deref().unwrap_or(&self.base_url))
    }

    fn build_headers(&self, request: &ClientRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, API_KEY_HEADER, &self.api_key)?;
        if request.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &request.headers {
            insert_header(&mut headers, name, value)?;
        }
        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), TransportError> {
    let invalid = || TransportError::InvalidHeader {
        name: name.to_string(),
    };
    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    headers.insert(name, value);
    Ok(())
}

#[async_trait]
impl Client for DefaultClient {
    async fn execute(&self, request: ClientRequest) -> Result<RawResponse, TransportError> {
        let url = self.build_url(&request)?;
        let headers = self.build_headers(&request)?;
        debug!(operation = %request.operation, method = %request.method, %url, "Sending API request.");

        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(operation = %request.operation, error = %err, "API request failed.");
            TransportError::Connection(err)
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(operation = %request.operation, status, bytes = body.len(), "Received API response.");
        Ok(RawResponse { status, body })
    }
}
