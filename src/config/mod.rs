//! Configuration management for Sponsordash
//!
//! Handles loading, validating, and persisting the endpoints, timeouts,
//! refresh policy, and role-scoped route table used by the session core.

use crate::auth::RefreshPolicy;
use crate::error::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;
pub mod routes;

pub use defaults::*;
pub use routes::{RouteRule, RouteTable};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the protected dashboard API
    #[serde(default = "defaults::default_api_url")]
    pub api_url: String,

    /// Base URL of the auth service (refresh and sign-out)
    #[serde(default = "defaults::default_auth_url")]
    pub auth_url: String,

    /// Upper bound for every outbound call, in seconds
    #[serde(default = "defaults::default_timeout")]
    pub timeout_secs: u64,

    /// How concurrent 401s share token renewals
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,

    /// Path of the external role-update function, relative to `api_url`
    #[serde(default = "defaults::default_role_update_path")]
    pub role_update_path: String,

    /// Login page used for unauthenticated redirects
    #[serde(default = "defaults::default_login_path")]
    pub login_path: String,

    /// Page used when the session role does not match the section
    #[serde(default = "defaults::default_unauthorized_path")]
    pub unauthorized_path: String,

    /// Landing page, the navigation target after logout
    #[serde(default = "defaults::default_home_path")]
    pub home_path: String,

    /// Protected sections and their allowed roles
    #[serde(default = "defaults::default_routes")]
    pub routes: Vec<RouteRule>,
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_default(&path)
    }

    /// Load configuration from `path` if it exists, defaults otherwise,
    /// then apply environment overrides
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| PortalError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| PortalError::InvalidConfig(e.to_string()))
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PortalError::DirError {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let contents = self.to_toml()?;

        fs::write(path, contents).map_err(|e| PortalError::ConfigWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, Permissions::from_mode(0o600)).map_err(|e| {
                PortalError::ConfigWrite {
                    path: path.to_path_buf(),
                    reason: format!("Failed to set permissions: {e}"),
                }
            })?;
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PortalError::SerializationError(e.to_string()))
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .and_then(|path| if path.is_empty() { None } else { Some(path) })
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        config_home
            .ok_or_else(|| {
                PortalError::Internal(
                    "Could not determine config directory: XDG_CONFIG_HOME not set and no home directory found"
                        .to_string(),
                )
            })
            .map(|path| path.join("sponsordash").join("config.toml"))
    }

    /// Apply `SPONSORDASH_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(url) = non_empty_env(ENV_AUTH_URL) {
            self.auth_url = url;
        }
    }

    /// Apply command-line overrides, which take precedence over file and env
    pub fn apply_overrides(&mut self, api_url: Option<&str>, auth_url: Option<&str>) {
        if let Some(url) = api_url {
            self.api_url = url.to_string();
        }
        if let Some(url) = auth_url {
            self.auth_url = url.to_string();
        }
    }

    /// Route table built from the configured rules
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.clone())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(PortalError::InvalidConfig("api_url cannot be empty".to_string()));
        }
        if self.auth_url.is_empty() {
            return Err(PortalError::InvalidConfig("auth_url cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(PortalError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        for path in [&self.login_path, &self.unauthorized_path, &self.home_path] {
            if !path.starts_with('/') {
                return Err(PortalError::InvalidConfig(format!(
                    "navigation path '{path}' must start with '/'"
                )));
            }
        }

        if let Some(rule) = self.routes.iter().find(|rule| rule.roles.is_empty()) {
            return Err(PortalError::InvalidConfig(format!(
                "route '{}' allows no roles",
                rule.prefix
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            timeout_secs: default_timeout(),
            refresh_policy: RefreshPolicy::default(),
            role_update_path: default_role_update_path(),
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
            home_path: default_home_path(),
            routes: default_routes(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.refresh_policy, RefreshPolicy::SingleFlight);
        assert_eq!(config.routes.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_url = "https://api.example.org"
            refresh_policy = "per-request"

            [[routes]]
            prefix = "/reports"
            roles = ["admin", "stuart"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.auth_url, default_auth_url());
        assert_eq!(config.refresh_policy, RefreshPolicy::PerRequest);
        assert_eq!(config.routes, vec![RouteRule::new("/reports", [Role::Admin, Role::Stuart])]);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.timeout_secs = 30;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timeout_secs, 30);
        assert_eq!(loaded.routes, config.routes);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.timeout_secs, default_timeout());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, PortalError::InvalidConfig(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.routes.push(RouteRule::new("/empty", Vec::<Role>::new()));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.login_path = "login".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let mut config = Config::default();
        config.apply_overrides(Some("https://api.example.org"), None);
        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.auth_url, default_auth_url());
    }
}
