//! Outbound protected request record

use crate::error::{PortalError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::fmt;

/// A pending call to the protected API.
///
/// The record is owned by a single logical request. `retried` can move from
/// `false` to `true` once, through [`ProtectedRequest::mark_retried`].
#[derive(Clone)]
pub struct ProtectedRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    retried: bool,
}

impl ProtectedRequest {
    /// New request for `method` on `path` (relative to the API base URL)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PortalError::InvalidRequest(format!("header name '{name}': {e}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| PortalError::InvalidRequest(format!("header '{name}': {e}")))?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        let _ = self.headers.insert(name, value);
        Ok(self)
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| PortalError::SerializationError(e.to_string()))?;
        let _ = self
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(bytes);
        Ok(self)
    }

    /// Set a raw body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// HTTP method
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers, including any attached `Authorization`
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Whether this request has already been resent after a refresh
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Whether an `Authorization` header is present
    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Set `Authorization: Bearer <token>`, replacing any existing value
    pub(crate) fn with_bearer(mut self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| PortalError::InvalidRequest(format!("access token is not a valid header value: {e}")))?;
        value.set_sensitive(true);
        let _ = self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Consume the record and return it marked as retried, or `None` if it
    /// was retried before
    pub(crate) fn mark_retried(self) -> Option<Self> {
        if self.retried {
            return None;
        }
        Some(Self {
            retried: true,
            ..self
        })
    }
}

// Manual impl so the attached token never ends up in logs.
impl fmt::Debug for ProtectedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("retried", &self.retried)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_flag_moves_once() {
        let request = ProtectedRequest::get("/children");
        assert!(!request.is_retried());

        let retried = request.mark_retried().unwrap();
        assert!(retried.is_retried());
        assert!(retried.mark_retried().is_none());
    }

    #[test]
    fn test_with_bearer_replaces_header() {
        let request = ProtectedRequest::get("/children")
            .header("Authorization", "Bearer caller")
            .unwrap()
            .with_bearer("fresh")
            .unwrap();

        assert_eq!(request.headers().get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer fresh");
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = ProtectedRequest::post("/funding")
            .json(&serde_json::json!({ "amount": 120 }))
            .unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.body_bytes(), Some(&br#"{"amount":120}"#[..]));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = ProtectedRequest::get("/").header("bad header", "x").unwrap_err();
        assert!(matches!(err, PortalError::InvalidRequest(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let request = ProtectedRequest::get("/").with_bearer("secret-token").unwrap();
        assert!(!format!("{request:?}").contains("secret-token"));
    }
}
