//! Session and authentication lifecycle
//!
//! - [`refresh`] - silent token refresh, the only writer of identity fields
//! - [`pipeline`] - bearer attachment and retry-once-on-401 around protected calls
//! - [`bootstrap`] - one refresh attempt at startup behind a loading state
//! - [`guard`] - role-based route decisions
//! - [`logout`] - provider sign-out and local clear

pub mod bootstrap;
pub mod guard;
pub mod logout;
pub mod pipeline;
pub mod refresh;

pub use bootstrap::{BootstrapOutcome, BootstrapView, SessionBootstrap};
pub use guard::{evaluate, GuardDecision, GuardWatch, RouteGuard};
pub use logout::Logout;
pub use pipeline::{AuthPipeline, RefreshPolicy, RequestState};
pub use refresh::{refresh_session, HttpRefresher, RefreshResponse, Refresher};
