//! Sign-out
//!
//! Signs out at the auth service, then clears the local session before
//! returning. The clear happens whether or not the provider call succeeded.

use crate::client::{ProtectedRequest, Transport};
use crate::config::LOGOUT_ENDPOINT;
use crate::error::{PortalError, Result};
use crate::session::SessionStore;
use std::fmt;
use std::sync::Arc;

/// Provider sign-out plus local session clear
pub struct Logout {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    home_path: String,
}

impl Logout {
    /// `transport` must be rooted at the auth service base URL
    pub fn new(transport: Arc<dyn Transport>, store: SessionStore, home_path: impl Into<String>) -> Self {
        Self {
            transport,
            store,
            home_path: home_path.into(),
        }
    }

    /// Sign out and return the navigation target (the landing page).
    ///
    /// # Errors
    ///
    /// The provider sign-out failure, reported after the local session has
    /// already been cleared. A 401 from the provider counts as signed out.
    pub async fn run(&self) -> Result<String> {
        let signed_out = match self.store.access_token() {
            Some(token) => self.sign_out(&token).await,
            None => Ok(()),
        };

        self.store.clear();
        match &signed_out {
            Ok(()) => tracing::info!("signed out"),
            Err(err) => tracing::warn!(error = %err, "provider sign-out failed, local session cleared"),
        }

        signed_out.map(|()| self.home_path.clone())
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let request = ProtectedRequest::post(LOGOUT_ENDPOINT).with_bearer(token)?;
        let response = self.transport.send(&request).await?;

        if response.is_success() || response.is_unauthorized() {
            return Ok(());
        }
        Err(PortalError::SignOutFailed {
            status: response.status.as_u16(),
            message: response.error_message(),
        })
    }
}

impl fmt::Debug for Logout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logout")
            .field("store", &self.store)
            .field("home_path", &self.home_path)
            .finish_non_exhaustive()
    }
}
