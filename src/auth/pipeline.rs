//! Authenticated request pipeline
//!
//! [`AuthPipeline`] decorates a base [`Transport`]:
//!
//! - Outbound: a request without an `Authorization` header gets
//!   `Bearer <token>`, read from the session at send time.
//! - Inbound: success passes through. The first 401 on a request triggers one
//!   refresh and one resend with the new token. A second 401, a failed
//!   refresh, or any other error status is returned to the caller.
//!
//! Per-request states:
//!
//! ```text
//! Sent ──► Success
//!   └────► AuthFailure ──(not retried)──► Retried ──► Success | Failure
//!               └───────(retried)───────► Failure
//! ```

use super::refresh::{refresh_session, Refresher};
use crate::client::{ApiResponse, ProtectedRequest, Transport};
use crate::error::{PortalError, Result};
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How token renewals triggered by concurrent 401s are shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Renewals run one at a time; a request whose token was already
    /// replaced by another renewal reuses the new token
    #[default]
    SingleFlight,
    /// Every 401 runs its own refresh
    PerRequest,
}

/// Lifecycle state of one protected request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Sent (or resent) and awaiting a response
    Sent,
    /// Got a 401 that may still be recovered
    AuthFailure,
    /// Token renewed; resending
    Retried,
    /// Terminal: 2xx
    Success,
    /// Terminal: error returned to the caller
    Failure,
}

impl RequestState {
    /// State reached after `response` arrives for a request with the given
    /// retry flag
    pub fn after_response(response: &ApiResponse, retried: bool) -> Self {
        if response.is_success() {
            Self::Success
        } else if response.is_unauthorized() && !retried {
            Self::AuthFailure
        } else {
            Self::Failure
        }
    }
}

/// Token-attaching, retry-once decorator around a [`Transport`]
#[derive(Clone)]
pub struct AuthPipeline {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn Refresher>,
    store: SessionStore,
    policy: RefreshPolicy,
    renewal: Arc<Mutex<()>>,
}

impl AuthPipeline {
    /// Wrap `transport`, renewing tokens through `refresher` into `store`
    pub fn new(
        transport: Arc<dyn Transport>,
        refresher: Arc<dyn Refresher>,
        store: SessionStore,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            transport,
            refresher,
            store,
            policy,
            renewal: Arc::new(Mutex::new(())),
        }
    }

    /// Session the pipeline reads tokens from
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Send `request` through the pipeline.
    ///
    /// # Errors
    ///
    /// - transport failures (`Network`, `Timeout`) as-is
    /// - the refresh error when the 401-triggered refresh fails
    /// - [`PortalError::SessionExpired`] on a 401 after the resend, carrying
    ///   the server's message; [`PortalError::status`] reports it as 401 and
    ///   [`PortalError::requires_login`] is true
    /// - [`PortalError::Api`] for any other non-success status
    pub async fn execute(&self, request: ProtectedRequest) -> Result<ApiResponse> {
        let mut request = self.attach_token(request)?;

        loop {
            // Session token as of this send; a different one after the 401
            // means another request already renewed it
            let observed = self.store.access_token();
            let response = self.transport.send(&request).await?;
            let state = RequestState::after_response(&response, request.is_retried());
            Self::trace(&request, RequestState::Sent, state);

            match state {
                RequestState::Success => return Ok(response),
                RequestState::AuthFailure => {
                    let Some(retry) = request.mark_retried() else {
                        return Err(PortalError::SessionExpired(response.error_message()));
                    };
                    let token = self.renew_token(observed.as_deref()).await?;
                    request = retry.with_bearer(&token)?;
                    Self::trace(&request, RequestState::AuthFailure, RequestState::Retried);
                }
                _ if response.is_unauthorized() => {
                    return Err(PortalError::SessionExpired(response.error_message()));
                }
                _ => return Err(response.into_api_error()),
            }
        }
    }

    /// Attach the current session token unless the caller set `Authorization`
    fn attach_token(&self, request: ProtectedRequest) -> Result<ProtectedRequest> {
        if request.has_authorization() {
            return Ok(request);
        }
        match self.store.access_token() {
            Some(token) => request.with_bearer(&token),
            None => Ok(request),
        }
    }

    /// Obtain a token to resend with after a 401 on a request sent while the
    /// session held `observed`
    async fn renew_token(&self, observed: Option<&str>) -> Result<String> {
        match self.policy {
            RefreshPolicy::PerRequest => refresh_session(self.refresher.as_ref(), &self.store).await,
            RefreshPolicy::SingleFlight => {
                let _turn = self.renewal.lock().await;
                if let Some(current) = self.store.access_token() {
                    if observed != Some(current.as_str()) {
                        tracing::debug!("token already renewed by a concurrent request");
                        return Ok(current);
                    }
                }
                refresh_session(self.refresher.as_ref(), &self.store).await
            }
        }
    }

    fn trace(request: &ProtectedRequest, from: RequestState, to: RequestState) {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            retried = request.is_retried(),
            ?from,
            ?to,
            "protected request"
        );
    }
}

impl fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPipeline")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
