//! Response record returned by a [`Transport`](super::Transport)

use crate::error::{PortalError, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A fully buffered HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

/// Error payload shapes used by the API and its functions
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl ApiResponse {
    /// Build a response with no headers
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the status signals an invalid or expired token
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Body as UTF-8 text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(PortalError::from)
    }

    /// Human-readable failure reason: the `error`/`message` field of a JSON
    /// body, else the raw text, else the status reason
    pub fn error_message(&self) -> String {
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(&self.body) {
            if let Some(message) = body.error.or(body.message).or(body.msg) {
                return message;
            }
        }

        let text = self.text();
        let text = text.trim();
        if text.is_empty() {
            self.status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            text.to_string()
        }
    }

    /// Convert a non-success response into [`PortalError::Api`]
    pub fn into_api_error(self) -> PortalError {
        PortalError::Api {
            status: self.status.as_u16(),
            message: self.error_message(),
        }
    }
}
