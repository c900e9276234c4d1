//! Where manifests and definition tables come from.

use std::collections::HashMap;
use std::fmt;

use apibind_runtime::{Api, ApiConfig, DefinitionError, RawValue, TransportError, http_client};
use async_trait::async_trait;
use tracing::debug;

use crate::config::CacheConfig;
use crate::manifest::Manifest;

/// One definition table: hash → undecoded record.
pub type TableRecords = HashMap<u32, Box<RawValue>>;

#[async_trait]
pub trait ContentSource: Send + Sync + fmt::Debug {
    /// Fetches the current manifest. An empty version is returned as-is.
    async fn manifest(&self) -> Result<Manifest, DefinitionError>;

    /// Fetches a whole table by the relative path the manifest lists.
    async fn table(&self, path: &str) -> Result<TableRecords, DefinitionError>;
}

/// Reads the manifest through the API and tables from the content host.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    api: Api,
    http: reqwest::Client,
    content_base_url: String,
}

impl HttpContentSource {
    /// Table downloads use the user agent and deadline of `api_config`.
    pub fn new(api: Api, api_config: &ApiConfig, config: &CacheConfig) -> Result<Self, TransportError> {
        Ok(Self {
            api,
            http: http_client(api_config)?,
            content_base_url: config.content_base_url.clone(),
        })
    }

    fn table_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.content_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn manifest(&self) -> Result<Manifest, DefinitionError> {
        let envelope = self.api.manifest::<Manifest>().await?;
        Ok(envelope.into_response().unwrap_or_default())
    }

    async fn table(&self, path: &str) -> Result<TableRecords, DefinitionError> {
        let url = self.table_url(path);
        debug!(%url, "Fetching definition table.");
        let response = self.http.get(&url).send().await.map_err(TransportError::from)?;
        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::from)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.to_vec(),
            }
            .into());
        }
        let records: TableRecords = serde_json::from_slice(&body)?;
        debug!(%url, records = records.len(), "Fetched definition table.");
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use apibind_runtime::ClientError;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_config_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: format!("{}/Platform", server.uri()),
            ..ApiConfig::new("secret")
        }
    }

    fn source_with(server: &MockServer, api_config: &ApiConfig) -> HttpContentSource {
        let api = Api::from_config(api_config).unwrap();
        let config = CacheConfig {
            content_base_url: server.uri(),
            ..CacheConfig::default()
        };
        HttpContentSource::new(api, api_config, &config).unwrap()
    }

    fn source_for(server: &MockServer) -> HttpContentSource {
        source_with(server, &api_config_for(server))
    }

    #[tokio::test]
    async fn test_manifest_and_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Platform/Destiny2/Manifest/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"ErrorCode":1,"Response":{"version":"v1","jsonWorldComponentContentPaths":{"en":{"DestinyInventoryItemDefinition":"/content/items-v1.json"}}}}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/content/items-v1.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"17":{"name":"Foo"},"4294967295":{"name":"Max"}}"#),
            )
            .mount(&server)
            .await;

        let source = source_for(&server);
        let manifest = source.manifest().await.unwrap();
        assert_eq!(manifest.version, "v1");
        let table_path = manifest
            .table_path("en", "DestinyInventoryItemDefinition")
            .unwrap();
        let records = source.table(table_path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[&17].get(), r#"{"name":"Foo"}"#);
        assert!(records.contains_key(&u32::MAX));
    }

    #[tokio::test]
    async fn test_table_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let err = source_for(&server).table("/content/missing.json").await.unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::Client(ClientError::Transport(TransportError::Status { status: 404, .. }))
        ));
    }

    #[tokio::test]
    async fn test_table_fetch_uses_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/items.json"))
            .and(header("user-agent", "apibind-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"1":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let api_config = ApiConfig {
            user_agent: "apibind-test/1.0".to_string(),
            ..api_config_for(&server)
        };
        let records = source_with(&server, &api_config).table("/content/items.json").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_table_fetch_honors_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/slow.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let api_config = ApiConfig {
            timeout_secs: Some(1),
            ..api_config_for(&server)
        };
        let err = source_with(&server, &api_config).table("/content/slow.json").await.unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::Client(ClientError::Transport(TransportError::Connection(ref e))) if e.is_timeout()
        ));
    }
}
