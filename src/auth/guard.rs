//! Role-based route guarding
//!
//! Decisions are computed from the current session on every navigation and
//! every session change. The guard keeps no state of its own.

use crate::config::{Config, RouteTable};
use crate::session::{Role, Session, SessionStore};
use tokio::sync::watch;

/// Outcome of guarding one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup refresh still running; show a waiting indicator
    Pending,
    /// No session; go to login, then come back to `return_to`
    RedirectToLogin {
        /// Location originally requested
        return_to: String,
    },
    /// Signed in, but the role may not view this section
    RedirectUnauthorized,
    /// Render the protected content
    Allow,
}

impl GuardDecision {
    /// Whether the decision is a redirect
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectToLogin { .. } | Self::RedirectUnauthorized)
    }
}

/// Decide whether `session` may view `location`, restricted to `allowed`.
pub fn evaluate(session: &Session, location: &str, allowed: &[Role]) -> GuardDecision {
    if session.loading {
        return GuardDecision::Pending;
    }
    if !session.is_active() {
        return GuardDecision::RedirectToLogin {
            return_to: location.to_string(),
        };
    }
    if !session.has_any_role(allowed) {
        return GuardDecision::RedirectUnauthorized;
    }
    GuardDecision::Allow
}

/// Guard over the configured route table
#[derive(Debug, Clone)]
pub struct RouteGuard {
    routes: RouteTable,
    login_path: String,
    unauthorized_path: String,
}

impl RouteGuard {
    /// Guard with explicit redirect pages
    pub fn new(routes: RouteTable, login_path: impl Into<String>, unauthorized_path: impl Into<String>) -> Self {
        Self {
            routes,
            login_path: login_path.into(),
            unauthorized_path: unauthorized_path.into(),
        }
    }

    /// Guard built from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.route_table(),
            config.login_path.clone(),
            config.unauthorized_path.clone(),
        )
    }

    /// Decide for `location`. Locations outside every protected section are
    /// public and always allowed.
    pub fn check(&self, session: &Session, location: &str) -> GuardDecision {
        match self.routes.allowed_roles(location) {
            Some(allowed) => evaluate(session, location, allowed),
            None => GuardDecision::Allow,
        }
    }

    /// Navigation target for a redirect decision
    pub fn redirect_target(&self, decision: &GuardDecision) -> Option<String> {
        match decision {
            GuardDecision::RedirectToLogin { return_to } => Some(format!(
                "{}?from={}",
                self.login_path,
                urlencoding::encode(return_to)
            )),
            GuardDecision::RedirectUnauthorized => Some(self.unauthorized_path.clone()),
            GuardDecision::Pending | GuardDecision::Allow => None,
        }
    }

    /// Follow the decision for `location` as the session changes
    pub fn watch(&self, store: &SessionStore, location: impl Into<String>) -> GuardWatch {
        GuardWatch {
            guard: self.clone(),
            location: location.into(),
            rx: store.subscribe(),
        }
    }
}

/// Stream of guard decisions for one location, re-evaluated on every
/// session change
#[derive(Debug)]
pub struct GuardWatch {
    guard: RouteGuard,
    location: String,
    rx: watch::Receiver<Session>,
}

impl GuardWatch {
    /// Decision for the session as it is now
    pub fn current(&mut self) -> GuardDecision {
        let session = self.rx.borrow_and_update();
        self.guard.check(&session, &self.location)
    }

    /// Wait for the next session change and decide again. Returns `None`
    /// once the session store has been dropped.
    pub async fn changed(&mut self) -> Option<GuardDecision> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Wait until the decision is no longer [`GuardDecision::Pending`]
    pub async fn settled(&mut self) -> Option<GuardDecision> {
        let decision = self.current();
        if decision != GuardDecision::Pending {
            return Some(decision);
        }
        loop {
            let decision = self.changed().await?;
            if decision != GuardDecision::Pending {
                return Some(decision);
            }
        }
    }
}
