#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! # Sponsordash session core
//!
//! Session lifecycle and protected-request pipeline for the Sponsordash
//! sponsorship dashboard.
//!
//! ## Architecture
//!
//! - **[`error`]** - Error types and error handling
//! - **[`config`]** - Endpoints, timeouts, refresh policy, and route table
//! - **[`session`]** - The in-memory session and its store
//! - **[`client`]** - Request/response records and the HTTP transport
//! - **[`auth`]** - Refresh, authenticated pipeline, bootstrap, route guard, logout
//! - **[`admin`]** - Client for the role-update function
//! - **[`portal`]** - Composition root wiring everything from a [`Config`]
//!
//! ## Quick Start
//!
//! ```bash
//! export SPONSORDASH_REFRESH_COOKIE='refresh_token=...'
//! sponsordash whoami
//! sponsordash request GET /rest/v1/children
//! sponsordash guard /admin
//! ```

pub mod admin;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod portal;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

/// Error type alias for convenience
pub use error::{PortalError, Result};

/// Configuration type alias for convenience
pub use config::Config;

pub use portal::Portal;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "sponsordash";
