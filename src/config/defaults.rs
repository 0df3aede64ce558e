//! Default configuration values

use super::routes::RouteRule;
use crate::session::Role;

/// Default base URL of the protected dashboard API
pub fn default_api_url() -> String {
    "http://localhost:54321".to_string()
}

/// Default base URL of the auth service (refresh and sign-out endpoints)
pub fn default_auth_url() -> String {
    "http://localhost:54321".to_string()
}

/// Default request timeout in seconds
pub const fn default_timeout() -> u64 {
    10
}

/// Default path of the external role-update function
pub fn default_role_update_path() -> String {
    "/functions/v1/update-user-role".to_string()
}

/// Default login page
pub fn default_login_path() -> String {
    "/login".to_string()
}

/// Default page shown when the role does not match the section
pub fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

/// Default landing page (post-logout target)
pub fn default_home_path() -> String {
    "/".to_string()
}

/// Default protected sections, one per role
pub fn default_routes() -> Vec<RouteRule> {
    vec![
        RouteRule::new("/sponsor", [Role::Sponsor]),
        RouteRule::new("/stuart", [Role::Stuart]),
        RouteRule::new("/school", [Role::School]),
        RouteRule::new("/admin", [Role::Admin]),
    ]
}

/// Refresh endpoint, relative to the auth base URL
pub const REFRESH_ENDPOINT: &str = "/auth/v1/refresh-token";

/// Provider sign-out endpoint, relative to the auth base URL
pub const LOGOUT_ENDPOINT: &str = "/auth/v1/logout";

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "SPONSORDASH_API_URL";

/// Environment variable overriding the auth base URL
pub const ENV_AUTH_URL: &str = "SPONSORDASH_AUTH_URL";

/// Environment variable carrying the refresh cookie for the CLI's cookie jar
pub const ENV_REFRESH_COOKIE: &str = "SPONSORDASH_REFRESH_COOKIE";
