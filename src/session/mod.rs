//! In-memory session state
//!
//! The [`Session`] record holds the current identity, role, and short-lived
//! access token. It is owned by a [`SessionStore`]; everything else reads
//! snapshots of it.

pub mod store;
pub mod token;

pub use store::SessionStore;

use crate::error::PortalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard role carried in the session's identity claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sponsor funding one or more children
    Sponsor,
    /// Coordinator ("stuart") managing sponsorships for a region
    Stuart,
    /// School submitting funding requests
    School,
    /// Administrator
    Admin,
}

impl Role {
    /// All roles, in display order
    pub const ALL: [Self; 4] = [Self::Sponsor, Self::Stuart, Self::School, Self::Admin];

    /// Wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sponsor => "sponsor",
            Self::Stuart => "stuart",
            Self::School => "school",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PortalError::InvalidArgument(format!("unknown role '{s}'")))
    }
}

/// The current user's session
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque user id
    pub user_id: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Role claim; `None` while unauthenticated
    pub role: Option<Role>,
    /// Short-lived bearer token
    pub access_token: Option<String>,
    /// Set until the startup refresh attempt has settled
    pub loading: bool,
    /// Set while an identity is present
    pub active: bool,
}

impl Session {
    /// Empty session, still loading
    pub const fn new() -> Self {
        Self {
            user_id: None,
            name: None,
            email: None,
            role: None,
            access_token: None,
            loading: true,
            active: false,
        }
    }

    /// Whether a signed-in identity is present
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the session's role is one of `roles`
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.is_some_and(|role| roles.contains(&role))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl so the access token never ends up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("loading", &self.loading)
            .field("active", &self.active)
            .finish()
    }
}
