//! Startup session restore
//!
//! Runs one silent refresh before any protected content is shown. Until it
//! settles the session's loading flag stays set and callers render only a
//! loading indicator.

use super::refresh::{refresh_session, Refresher};
use crate::session::SessionStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// How the startup refresh attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A token was already present; no network call was made
    AlreadyAuthenticated,
    /// The silent refresh restored a session
    Refreshed,
    /// The refresh failed; the app continues signed out
    Unauthenticated,
}

/// What the caller may render right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapView {
    /// Only a loading indicator
    Loading,
    /// Protected content or the signed-out view, per the route guard
    Ready,
}

impl BootstrapView {
    /// View for the current session state
    pub fn of(store: &SessionStore) -> Self {
        if store.is_loading() {
            Self::Loading
        } else {
            Self::Ready
        }
    }
}

/// One-shot session restore for an application load
pub struct SessionBootstrap {
    store: SessionStore,
    refresher: Arc<dyn Refresher>,
    outcome: OnceCell<BootstrapOutcome>,
}

impl SessionBootstrap {
    /// Bootstrap restoring into `store` through `refresher`
    pub fn new(store: SessionStore, refresher: Arc<dyn Refresher>) -> Self {
        Self {
            store,
            refresher,
            outcome: OnceCell::new(),
        }
    }

    /// Restore the session. The first call does the work; later calls
    /// return the same outcome without touching the network.
    ///
    /// Never fails: a refresh error is logged and reported as
    /// [`BootstrapOutcome::Unauthenticated`].
    pub async fn run(&self) -> BootstrapOutcome {
        *self.outcome.get_or_init(|| self.restore()).await
    }

    /// Outcome of the first run, if it has completed
    pub fn outcome(&self) -> Option<BootstrapOutcome> {
        self.outcome.get().copied()
    }

    async fn restore(&self) -> BootstrapOutcome {
        if self.store.access_token().is_some() {
            self.store.finish_loading();
            tracing::debug!("session already holds a token, skipping refresh");
            return BootstrapOutcome::AlreadyAuthenticated;
        }

        let outcome = match refresh_session(self.refresher.as_ref(), &self.store).await {
            Ok(_) => {
                tracing::info!("session restored");
                BootstrapOutcome::Refreshed
            }
            Err(err) => {
                tracing::warn!(error = %err, "silent refresh failed, continuing signed out");
                BootstrapOutcome::Unauthenticated
            }
        };

        self.store.finish_loading();
        outcome
    }
}

impl fmt::Debug for SessionBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBootstrap")
            .field("store", &self.store)
            .field("outcome", &self.outcome.get())
            .finish_non_exhaustive()
    }
}
