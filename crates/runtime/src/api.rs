//! Entry point for generated operations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use tracing::debug;

use crate::client::{Client, ClientRequest, DefaultClient, RawResponse};
use crate::config::ApiConfig;
use crate::error::{ClientError, DefinitionError, TransportError};
use crate::interceptor::{AddHeaderClient, BaseUrlClient};
use crate::types::{DefinitionSource, Envelope};

pub const MANIFEST_PATH: &str = "/Destiny2/Manifest/";
pub const ENTITY_DEFINITION_PATH: &str = "/Destiny2/Manifest/{entityType}/{hashIdentifier}/";

/// Holds the client chain that generated operations send through.
///
/// Cloning is cheap; derived handles share the underlying connection pool.
#[derive(Clone)]
pub struct Api {
    client: Arc<dyn Client>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").field("client", &self.client).finish()
    }
}

impl Api {
    pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::from_config(&ApiConfig::new(api_key))
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        Ok(Self::with_client(Arc::new(DefaultClient::new(config)?)))
    }

    pub fn with_client(client: Arc<dyn Client>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    /// Returns a handle whose client is `wrap(current)`.
    #[must_use]
    pub fn with_interceptor<F>(&self, wrap: F) -> Self
    where
        F: FnOnce(Arc<dyn Client>) -> Arc<dyn Client>,
    {
        Self::with_client(wrap(Arc::clone(&self.client)))
    }

    /// Authenticates requests with an OAuth bearer token.
    #[must_use]
    pub fn with_auth_token(&self, token: &str) -> Self {
        let value = format!("Bearer {token}");
        self.with_interceptor(|inner| Arc::new(AddHeaderClient::new(inner, "Authorization", value)))
    }

    #[must_use]
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.with_interceptor(|inner| Arc::new(BaseUrlClient::new(inner, base_url)))
    }

    /// Executes `request` and decodes the response envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: ClientRequest,
    ) -> Result<Envelope<T>, ClientError> {
        let operation = request.operation.clone();
        let raw = self.client.execute(request).await?;
        decode_envelope(&operation, raw)
    }

    /// Fetches the content manifest, decoded into the caller's manifest type.
    pub async fn manifest<M: DeserializeOwned>(&self) -> Result<Envelope<M>, ClientError> {
        self.call(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
    }

    /// Fetches a single definition record through the entity endpoint.
    pub async fn entity_definition(
        &self,
        entity_type: &str,
        hash: u32,
    ) -> Result<Option<Box<RawValue>>, ClientError> {
        let request = ClientRequest::get("GetDestinyEntityDefinition", ENTITY_DEFINITION_PATH)
            .path_param("entityType", entity_type)
            .path_param("hashIdentifier", hash);
        Ok(self.call::<Box<RawValue>>(request).await?.into_response())
    }
}

/// Classifies a raw exchange.
///
/// An undecodable body on a failing status is a transport error carrying the
/// status and the bytes as received. A decodable envelope with a non-success
/// code is an API error.
pub fn decode_envelope<T: DeserializeOwned>(
    operation: &str,
    raw: RawResponse,
) -> Result<Envelope<T>, ClientError> {
    let mut envelope: Envelope<T> = match serde_json::from_slice(&raw.body) {
        Ok(envelope) => envelope,
        Err(source) if !raw.is_success() => {
            debug!(operation, status = raw.status, error = %source, "Undecodable error response.");
            return Err(TransportError::Status {
                status: raw.status,
                body: raw.body,
            }
            .into());
        }
        Err(source) => {
            return Err(ClientError::Decode {
                operation: operation.to_string(),
                body: raw.body,
                source,
            });
        }
    };
    if let Some(err) = envelope.api_error() {
        debug!(operation, code = err.code, status = %err.status, "API returned an error envelope.");
        return Err(err.into());
    }
    envelope.set_raw(raw.body);
    Ok(envelope)
}

#[async_trait]
impl DefinitionSource for Api {
    async fn definition(&self, table: &str, hash: u32) -> Result<Box<RawValue>, DefinitionError> {
        let entity_type = table.strip_prefix("Destiny").unwrap_or(table);
        let entity_type = entity_type.strip_suffix("Definition").unwrap_or(entity_type);
        self.entity_definition(entity_type, hash)
            .await?
            .ok_or_else(|| DefinitionError::NotFound {
                table: table.to_string(),
                hash,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Manifest {
        version: String,
    }

    fn api_for(server: &MockServer) -> Api {
        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::new("secret")
        };
        Api::from_config(&config).unwrap()
    }

    async fn mount_body(server: &MockServer, status: u16, body: &'static str) {
        Mock::given(method("GET"))
            .and(path(MANIFEST_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_error_code_zero_is_success() {
        let server = MockServer::start().await;
        mount_body(&server, 200, r#"{"Response":{"version":"v1"},"ErrorCode":0}"#).await;

        let envelope = api_for(&server)
            .call::<Manifest>(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
            .unwrap();
        assert_eq!(envelope.response.as_ref().map(|m| m.version.as_str()), Some("v1"));
        assert!(!envelope.raw().is_empty());
    }

    #[tokio::test]
    async fn test_throttled_surfaces_api_error() {
        let server = MockServer::start().await;
        mount_body(
            &server,
            200,
            r#"{"ErrorCode":5,"ErrorStatus":"Throttled","ThrottleSeconds":30,"Message":"Too fast"}"#,
        )
        .await;

        let err = api_for(&server)
            .call::<Manifest>(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
            .unwrap_err();
        match err {
            ClientError::Api(ApiError {
                code,
                status,
                throttle_seconds,
                ..
            }) => assert_eq!((code, status.as_str(), throttle_seconds), (5, "Throttled", 30)),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_503_is_transport_error() {
        let server = MockServer::start().await;
        mount_body(&server, 503, "Service Unavailable <html>").await;

        let err = api_for(&server)
            .call::<Manifest>(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
            .unwrap_err();
        match err {
            ClientError::Transport(transport) => {
                assert_eq!(transport.status(), Some(503));
                assert_eq!(transport.body(), Some(b"Service Unavailable <html>".as_slice()));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_200_is_decode_error() {
        let server = MockServer::start().await;
        mount_body(&server, 200, "not json").await;

        let err = api_for(&server)
            .call::<Manifest>(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { ref operation, .. } if operation == "GetDestinyManifest"));
    }

    #[tokio::test]
    async fn test_auth_token_and_base_url_interceptors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(MANIFEST_PATH))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ErrorCode":1,"Response":{"version":"v2"}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let api = Api::new("secret")
            .unwrap()
            .with_base_url(server.uri())
            .with_auth_token("tok");
        let envelope = api
            .call::<Manifest>(ClientRequest::get("GetDestinyManifest", MANIFEST_PATH))
            .await
            .unwrap();
        assert_eq!(envelope.into_response(), Some(Manifest { version: "v2".into() }));
    }

    #[tokio::test]
    async fn test_definition_source_uses_entity_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Destiny2/Manifest/InventoryItem/1234/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ErrorCode":1,"Response":{"name":"Foo"}}"#))
            .mount(&server)
            .await;

        let raw = api_for(&server)
            .definition("DestinyInventoryItemDefinition", 1234)
            .await
            .unwrap();
        assert_eq!(raw.get(), r#"{"name":"Foo"}"#);
    }
}
