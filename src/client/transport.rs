//! Base request function decorated by the authenticated pipeline

use super::{join_url, ApiResponse, ProtectedRequest};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Sends one request and buffers the response.
///
/// Implementations never interpret status codes; a 401 is an `Ok` response
/// like any other. Only transport-level failures are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once
    async fn send(&self, request: &ProtectedRequest) -> Result<ApiResponse>;
}

/// [`Transport`] over reqwest, rooted at the protected API's base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Transport for `base_url` using the shared client
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProtectedRequest) -> Result<ApiResponse> {
        let url = join_url(&self.base_url, request.path());

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(method = %request.method(), path = request.path(), %status, "response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
