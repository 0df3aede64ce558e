//! HTTP client layer
//!
//! Provides the request/response records passed through the authenticated
//! pipeline, the [`Transport`] seam the pipeline decorates, and the shared
//! reqwest client that carries the refresh cookie.

pub mod request;
pub mod response;
pub mod transport;

pub use request::ProtectedRequest;
pub use response::ApiResponse;
pub use transport::{HttpTransport, Transport};

use crate::error::{PortalError, Result};
use reqwest::cookie::Jar;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Create the HTTP client shared by the refresher, transport, and logout
///
/// Features:
/// - Cookie jar so the refresh credential travels with auth-service calls
/// - One fixed upper bound for every call (`timeout`)
/// - Short connect timeout and keep-alive pooling
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS backend failure).
pub fn build_http_client(timeout: Duration, jar: Arc<Jar>) -> Result<Client> {
    Client::builder()
        .cookie_provider(jar)
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(concat!("sponsordash/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PortalError::Internal(format!("Failed to create HTTP client: {e}")))
}

/// Cookie jar for the auth service, optionally seeded with a refresh cookie
/// (`name=value; attributes`) scoped to `auth_url`
///
/// # Errors
///
/// Returns an error if `auth_url` is not a valid URL.
pub fn cookie_jar(auth_url: &str, refresh_cookie: Option<&str>) -> Result<Arc<Jar>> {
    let jar = Jar::default();
    if let Some(cookie) = refresh_cookie {
        let url = reqwest::Url::parse(auth_url)
            .map_err(|e| PortalError::InvalidConfig(format!("auth_url '{auth_url}': {e}")))?;
        jar.add_cookie_str(cookie, &url);
    }
    Ok(Arc::new(jar))
}

/// Join a base URL and an absolute path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
