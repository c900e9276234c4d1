//! Client decorators that adjust requests before delegating.
//!
//! Interceptors wrap an inner [`Client`]. The most recently added one runs
//! first, and values it sets are not overwritten by interceptors further in.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{Client, ClientRequest, RawResponse};
use crate::error::TransportError;

/// Sets a header on every request unless an outer layer already set it.
#[derive(Debug)]
pub struct AddHeaderClient {
    inner: Arc<dyn Client>,
    name: String,
    value: String,
}

impl AddHeaderClient {
    pub fn new(inner: Arc<dyn Client>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl Client for AddHeaderClient {
    async fn execute(&self, mut request: ClientRequest) -> Result<RawResponse, TransportError> {
        let already_set = request
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case(&self.name));
        if !already_set {
            request.headers.insert(self.name.clone(), self.value.clone());
        }
        self.inner.execute(request).await
    }
}

/// Points every request at another base URL.
#[derive(Debug)]
pub struct BaseUrlClient {
    inner: Arc<dyn Client>,
    base_url: String,
}

impl BaseUrlClient {
    pub fn new(inner: Arc<dyn Client>, base_url: impl Into<String>) -> Self {
        Self {
            inner,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Client for BaseUrlClient {
    async fn execute(&self, mut request: ClientRequest) -> Result<RawResponse, TransportError> {
        if request.base_url.is_none() {
            request.base_url = Some(self.base_url.clone());
        }
        self.inner.execute(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Capture {
        seen: Mutex<Vec<ClientRequest>>,
    }

    #[async_trait]
    impl Client for Capture {
        async fn execute(&self, request: ClientRequest) -> Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(RawResponse {
                status: 200,
                body: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_outer_header_wins() {
        let capture = Arc::new(Capture::default());
        let inner: Arc<dyn Client> = Arc::new(AddHeaderClient::new(capture.clone(), "Authorization", "Bearer old"));
        let outer = AddHeaderClient::new(inner, "authorization", "Bearer new");
        outer.execute(ClientRequest::get("Op", "/")).await.unwrap();

        let seen = capture.seen.lock().unwrap();
        assert_eq!(seen[0].headers.len(), 1);
        assert_eq!(seen[0].headers.get("authorization").map(String::as_str), Some("Bearer new"));
    }

    #[tokio::test]
    async fn test_base_url_override() {
        let capture = Arc::new(Capture::default());
        let inner: Arc<dyn Client> = Arc::new(BaseUrlClient::new(capture.clone(), "http://first"));
        let outer = BaseUrlClient::new(inner, "http://second");
        outer.execute(ClientRequest::get("Op", "/")).await.unwrap();

        let seen = capture.seen.lock().unwrap();
        assert_eq!(seen[0].base_url.as_deref(), Some("http://second"));
    }
}
