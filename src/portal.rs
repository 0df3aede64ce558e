//! Composition root
//!
//! [`Portal`] builds the session store, HTTP plumbing, refresher, pipeline,
//! bootstrap, guard, and logout once from a [`Config`] and hands them out by
//! reference. Dropping the portal tears all of them down.

use crate::admin::{self, UpdatedIdentity};
use crate::auth::{
    AuthPipeline, BootstrapOutcome, GuardDecision, HttpRefresher, Logout, Refresher, RouteGuard,
    SessionBootstrap,
};
use crate::client::{build_http_client, ApiResponse, HttpTransport, ProtectedRequest, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::session::{Role, SessionStore};
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;

/// Wired-up session core for one application load
#[derive(Debug)]
pub struct Portal {
    config: Config,
    store: SessionStore,
    pipeline: AuthPipeline,
    bootstrap: SessionBootstrap,
    guard: RouteGuard,
    logout: Logout,
}

impl Portal {
    /// Build against live endpoints. `jar` carries the refresh credential.
    ///
    /// # Errors
    ///
    /// Invalid configuration or HTTP client construction failure.
    pub fn connect(config: Config, jar: Arc<Jar>) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(Duration::from_secs(config.timeout_secs), jar)?;

        let refresher = Arc::new(HttpRefresher::new(client.clone(), &config.auth_url));
        let api = Arc::new(HttpTransport::new(client.clone(), config.api_url.clone()));
        let auth = Arc::new(HttpTransport::new(client, config.auth_url.clone()));

        Ok(Self::assemble(config, api, auth, refresher))
    }

    /// Build from explicit collaborators. `api` is rooted at the protected
    /// API, `auth` at the auth service.
    pub fn assemble(
        config: Config,
        api: Arc<dyn Transport>,
        auth: Arc<dyn Transport>,
        refresher: Arc<dyn Refresher>,
    ) -> Self {
        let store = SessionStore::new();
        let pipeline = AuthPipeline::new(api, refresher.clone(), store.clone(), config.refresh_policy);
        let bootstrap = SessionBootstrap::new(store.clone(), refresher);
        let guard = RouteGuard::from_config(&config);
        let logout = Logout::new(auth, store.clone(), config.home_path.clone());

        Self {
            config,
            store,
            pipeline,
            bootstrap,
            guard,
            logout,
        }
    }

    /// Restore the session (once per portal)
    pub async fn start(&self) -> BootstrapOutcome {
        self.bootstrap.run().await
    }

    /// Guard decision for navigating to `location` right now
    pub fn navigate(&self, location: &str) -> GuardDecision {
        self.guard.check(&self.store.snapshot(), location)
    }

    /// Send a protected request
    ///
    /// # Errors
    ///
    /// See [`AuthPipeline::execute`].
    pub async fn request(&self, request: ProtectedRequest) -> Result<ApiResponse> {
        self.pipeline.execute(request).await
    }

    /// Assign a role through the administrative function
    ///
    /// # Errors
    ///
    /// See [`admin::update_user_role`].
    pub async fn update_user_role(&self, user_id: &str, role: Role) -> Result<UpdatedIdentity> {
        admin::update_user_role(&self.pipeline, &self.config.role_update_path, user_id, role).await
    }

    /// Sign out; returns the navigation target
    ///
    /// # Errors
    ///
    /// See [`Logout::run`].
    pub async fn logout(&self) -> Result<String> {
        self.logout.run().await
    }

    /// Effective configuration
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Session store
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Authenticated pipeline
    pub const fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    /// Route guard
    pub const fn guard(&self) -> &RouteGuard {
        &self.guard
    }
}
