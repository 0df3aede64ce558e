//! Error types and handling for the Sponsordash session core
//!
//! Every terminal failure is handed back to the caller. The only failure the
//! core recovers from on its own is the first 401 on a protected request,
//! which is answered with one silent refresh and one resend.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Sponsordash operations
pub type Result<T> = std::result::Result<T, PortalError>;

/// Error types for Sponsordash session and API operations
#[derive(Error, Debug)]
pub enum PortalError {
    // ═══════════════════════════════════════════════════════════════
    // Network & HTTP Errors
    // ═══════════════════════════════════════════════════════════════
    /// Connectivity failure before a response was received
    #[error("Network failure: {0}")]
    Network(String),

    /// The call exceeded the configured time bound
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success response from the API (other than a recoverable 401)
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Invalid API response format
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The outbound request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ═══════════════════════════════════════════════════════════════
    // Authentication & Authorization
    // ═══════════════════════════════════════════════════════════════
    /// The refresh endpoint refused to mint a new access token
    #[error("Session refresh rejected: {status} - {message}")]
    RefreshRejected { status: u16, message: String },

    /// A protected call was still unauthorized after a refresh and resend
    #[error("Session expired: {0}. Sign in again")]
    SessionExpired(String),

    /// Provider-side sign-out failed
    #[error("Sign-out failed: {status} - {message}")]
    SignOutFailed { status: u16, message: String },

    // ═══════════════════════════════════════════════════════════════
    // Configuration & File Errors
    // ═══════════════════════════════════════════════════════════════
    /// Failed to read configuration file
    #[error("Failed to read config from {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to write configuration file
    #[error("Failed to write config to {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    /// Directory operation failed
    #[error("Directory operation failed: {path}: {reason}")]
    DirError { path: PathBuf, reason: String },

    // ═══════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════
    /// Failed to serialize data
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    // ═══════════════════════════════════════════════════════════════
    // Validation & Input Errors
    // ═══════════════════════════════════════════════════════════════
    /// Invalid input argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ═══════════════════════════════════════════════════════════════
    // Other Errors
    // ═══════════════════════════════════════════════════════════════
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Get the exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::InvalidRequest(_) => 2,
            Self::RefreshRejected { .. } | Self::SessionExpired(_) | Self::SignOutFailed { .. } => 3,
            Self::Network(_) => 4,
            Self::Api { .. } | Self::InvalidResponse(_) => 5,
            Self::ConfigRead { .. }
            | Self::InvalidConfig(_)
            | Self::ConfigWrite { .. }
            | Self::DirError { .. } => 6,
            Self::Timeout(_) => 124,
            _ => 1,
        }
    }

    /// Whether the failure happened before any response arrived
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Whether the session can no longer be recovered silently and the user
    /// has to sign in again
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::RefreshRejected { .. } | Self::SessionExpired(_))
    }

    /// HTTP status carried by the error, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. }
            | Self::RefreshRejected { status, .. }
            | Self::SignOutFailed { status, .. } => Some(*status),
            Self::SessionExpired(_) => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() {
            Self::InvalidResponse(format!("JSON syntax error: {err}"))
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
