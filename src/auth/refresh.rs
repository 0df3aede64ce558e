//! Silent session refresh
//!
//! Exchanges the long-lived credential (an HTTP-only cookie held by the
//! client's cookie jar) for a new access token and identity claims. The
//! credential itself is never read, stored, or logged here.

use crate::client::join_url;
use crate::config::REFRESH_ENDPOINT;
use crate::error::{PortalError, Result};
use crate::session::{Role, SessionStore};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a successful refresh
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Opaque user id
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role claim
    pub role: Role,
    /// New short-lived bearer token
    pub access_token: String,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// One call to the refresh endpoint
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Ask the auth service for a new access token
    async fn fetch(&self) -> Result<RefreshResponse>;
}

/// [`Refresher`] calling `GET {auth_url}/auth/v1/refresh-token`
#[derive(Debug, Clone)]
pub struct HttpRefresher {
    client: Client,
    url: String,
}

impl HttpRefresher {
    /// Refresher against `auth_url`. `client` must carry the cookie jar
    /// holding the refresh credential.
    pub fn new(client: Client, auth_url: &str) -> Self {
        Self {
            client,
            url: join_url(auth_url, REFRESH_ENDPOINT),
        }
    }
}

#[async_trait]
impl Refresher for HttpRefresher {
    async fn fetch(&self) -> Result<RefreshResponse> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("refresh failed").to_string()
            } else {
                body
            };
            return Err(PortalError::RefreshRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            PortalError::InvalidResponse(format!("refresh response: {e}"))
        })
    }
}

/// Run one refresh and apply it to the session.
///
/// On success the store holds the new identity and token, and the token is
/// returned. On failure the store is untouched and the error is returned.
pub async fn refresh_session(refresher: &dyn Refresher, store: &SessionStore) -> Result<String> {
    match refresher.fetch().await {
        Ok(grant) => {
            store.set_from_refresh(&grant);
            tracing::debug!(
                user = %grant.uuid,
                role = %grant.role,
                expires_in = ?crate::session::token::seconds_remaining(&grant.access_token),
                "session refreshed"
            );
            Ok(grant.access_token)
        }
        Err(err) => {
            tracing::debug!(error = %err, "session refresh failed");
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::{build_http_client, cookie_jar};
    use crate::session::Session;
    use crate::testing::{grant, http_response, serve, ScriptedRefresher};
    use reqwest::cookie::Jar;
    use std::sync::Arc;
    use std::time::Duration;

    fn http_refresher(auth_url: &str, jar: Arc<Jar>) -> HttpRefresher {
        let client = build_http_client(Duration::from_secs(5), jar).unwrap();
        HttpRefresher::new(client, auth_url)
    }

    #[tokio::test]
    async fn test_refresh_success_populates_session() {
        let store = SessionStore::new();
        store.finish_loading();
        let before = store.snapshot();

        let refresher = ScriptedRefresher::new([Ok(grant("tok1"))]);
        let token = refresh_session(&refresher, &store).await.unwrap();
        assert_eq!(token, "tok1");

        let expected = Session {
            user_id: Some("u1".to_string()),
            name: Some("A".to_string()),
            email: Some("a@x.com".to_string()),
            role: Some(Role::Sponsor),
            access_token: Some("tok1".to_string()),
            active: true,
            ..before
        };
        assert_eq!(store.snapshot(), expected);
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_session_untouched() {
        let store = SessionStore::new();
        let before = store.snapshot();

        let refresher = ScriptedRefresher::new([Err(PortalError::RefreshRejected {
            status: 401,
            message: "no refresh cookie".to_string(),
        })]);
        let err = refresh_session(&refresher, &store).await.unwrap_err();

        assert!(err.requires_login());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_refresh_response_wire_format() {
        let body = r#"{"uuid":"u1","name":"A","email":"a@x.com","role":"sponsor","accessToken":"tok1"}"#;
        let parsed: RefreshResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed, grant("tok1"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let body = r#"{"uuid":"u1","name":"A","email":"a@x.com","role":"janitor","accessToken":"t"}"#;
        assert!(serde_json::from_str::<RefreshResponse>(body).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        assert!(!format!("{:?}", grant("secret-token")).contains("secret-token"));
    }

    #[tokio::test]
    async fn test_http_refresher_sends_cookie_and_decodes_grant() {
        let body = r#"{"uuid":"u1","name":"A","email":"a@x.com","role":"sponsor","accessToken":"tok1"}"#;
        let (url, server) = serve(vec![http_response("200 OK", &[], body)]).await;
        let jar = cookie_jar(&url, Some("refresh_token=abc; Path=/")).unwrap();

        let parsed = http_refresher(&url, jar).fetch().await.unwrap();
        assert_eq!(parsed, grant("tok1"));

        let requests = server.await.unwrap();
        let request = requests[0].to_ascii_lowercase();
        assert!(request.starts_with("get /auth/v1/refresh-token "));
        assert!(request.contains("cookie: refresh_token=abc"));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_http_refresher_rejection_carries_status_and_body() {
        let (url, server) = serve(vec![
            http_response("403 Forbidden", &[], "refresh token revoked"),
            http_response("401 Unauthorized", &[], ""),
        ])
        .await;
        let refresher = http_refresher(&url, Arc::new(Jar::default()));

        let err = refresher.fetch().await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::RefreshRejected { status: 403, ref message } if message == "refresh token revoked"
        ));

        let err = refresher.fetch().await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::RefreshRejected { status: 401, ref message } if message == "Unauthorized"
        ));
        assert!(err.requires_login());

        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_http_refresher_malformed_body_is_invalid_response() {
        let (url, server) = serve(vec![
            http_response("200 OK", &[], "not json"),
            http_response("200 OK", &[], r#"{"uuid":"u1","access_token":"snake"}"#),
        ])
        .await;
        let refresher = http_refresher(&url, Arc::new(Jar::default()));

        assert!(matches!(refresher.fetch().await.unwrap_err(), PortalError::InvalidResponse(_)));
        assert!(matches!(refresher.fetch().await.unwrap_err(), PortalError::InvalidResponse(_)));
        let _ = server.await.unwrap();
    }
}
