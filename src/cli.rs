//! Command-line interface argument parsing
//!
//! Defines all CLI commands and their arguments using Clap.

use crate::session::Role;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sponsordash CLI - session and API client for the sponsorship dashboard
#[derive(Parser, Debug)]
#[command(name = "sponsordash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Session and API client for the Sponsordash sponsorship dashboard")]
#[command(long_about = concat!(
    "Sponsordash (v", env!("CARGO_PKG_VERSION"), ")\n",
    "Restores a session from the refresh cookie, sends authenticated API requests\n",
    "with silent refresh-and-retry, and checks role-based route access.\n\n",
    "The refresh cookie is read from SPONSORDASH_REFRESH_COOKIE (e.g. 'refresh_token=...')."
))]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/sponsordash/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Protected API base URL (overrides config and SPONSORDASH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Auth service base URL (overrides config and SPONSORDASH_AUTH_URL)
    #[arg(long, global = true)]
    pub auth_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore the session and show who is signed in
    ///
    /// Example:
    ///   sponsordash whoami
    #[command(display_order = 1)]
    Whoami,

    /// Send an authenticated request to the dashboard API
    ///
    /// The current access token is attached automatically. A 401 triggers one
    /// silent refresh and one resend.
    ///
    /// Examples:
    ///   sponsordash request GET /rest/v1/children
    ///   sponsordash request POST /rest/v1/funding --data '{"amount":120}'
    #[command(display_order = 2)]
    Request {
        /// HTTP method
        method: String,

        /// Path relative to the API base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        data: Option<String>,

        /// Extra header ('Name: value'); repeatable
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },

    /// Check whether the session may open a dashboard location
    ///
    /// Examples:
    ///   sponsordash guard /admin
    ///   sponsordash guard /school/children?id=7
    #[command(display_order = 3)]
    Guard {
        /// Location to navigate to
        location: String,
    },

    /// Change a user's role (admin only)
    ///
    /// Example:
    ///   sponsordash set-role --user-id 42 --role school
    #[command(display_order = 4)]
    SetRole {
        /// User whose role changes
        #[arg(long)]
        user_id: String,

        /// New role: sponsor, stuart, school, or admin
        #[arg(long)]
        role: Role,
    },

    /// Sign out and clear the session
    #[command(display_order = 5)]
    Logout,

    /// Show the effective configuration
    ///
    /// Examples:
    ///   sponsordash config
    ///   sponsordash config --init
    #[command(display_order = 6)]
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },

    /// Check CLI version
    #[command(display_order = 7)]
    Version,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_request_with_headers() {
        let cli = Cli::try_parse_from([
            "sponsordash",
            "request",
            "post",
            "/rest/v1/funding",
            "--data",
            "{}",
            "-H",
            "Prefer: return=representation",
        ])
        .unwrap();

        match cli.command {
            Commands::Request { method, path, data, headers } => {
                assert_eq!(method, "post");
                assert_eq!(path, "/rest/v1/funding");
                assert_eq!(data.as_deref(), Some("{}"));
                assert_eq!(headers, vec!["Prefer: return=representation".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_role() {
        let cli = Cli::try_parse_from(["sponsordash", "set-role", "--user-id", "42", "--role", "school"]).unwrap();
        assert!(matches!(cli.command, Commands::SetRole { role: Role::School, .. }));

        assert!(Cli::try_parse_from(["sponsordash", "set-role", "--user-id", "42", "--role", "janitor"]).is_err());
    }
}
