//! Process-wide session container
//!
//! Backed by a `tokio::sync::watch` channel: readers take synchronous
//! snapshots with [`SessionStore::snapshot`] or subscribe to changes with
//! [`SessionStore::subscribe`]. Writers are crate-private and limited to the
//! refresh operation, bootstrap, and logout.

use super::Session;
use crate::auth::refresh::RefreshResponse;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared handle to the session. Clones refer to the same session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create a store holding an empty, loading session
    pub fn new() -> Self {
        Self::with_session(Session::new())
    }

    /// Create a store seeded with `session`
    pub fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Current access token, read at call time
    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().access_token.clone()
    }

    /// Whether the startup refresh has not settled yet
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    /// Receiver notified after every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Replace identity and token with a refresh result in one step.
    /// The loading flag is left as it was.
    pub(crate) fn set_from_refresh(&self, grant: &RefreshResponse) {
        self.tx.send_modify(|session| {
            session.user_id = Some(grant.uuid.clone());
            session.name = Some(grant.name.clone());
            session.email = Some(grant.email.clone());
            session.role = Some(grant.role);
            session.access_token = Some(grant.access_token.clone());
            session.active = true;
        });
    }

    /// Mark the startup refresh as settled
    pub(crate) fn finish_loading(&self) {
        let _ = self.tx.send_if_modified(|session| {
            let changed = session.loading;
            session.loading = false;
            changed
        });
    }

    /// Drop identity and token
    pub(crate) fn clear(&self) {
        let _ = self.tx.send_if_modified(|session| {
            let loading = session.loading;
            let cleared = Session {
                loading,
                active: false,
                ..Session::new()
            };
            let changed = *session != cleared;
            *session = cleared;
            changed
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
