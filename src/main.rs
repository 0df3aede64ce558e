//! Sponsordash CLI - session and API client for the sponsorship dashboard
//!
//! Restores a session from the refresh cookie, sends authenticated requests,
//! and checks role-based route access against a live deployment.

#![allow(clippy::print_stdout, clippy::print_stderr)] // Terminal output is the binary's job

use anyhow::{Context, Result};
use console::style;
use sponsordash_cli::auth::{BootstrapOutcome, BootstrapView, GuardDecision};
use sponsordash_cli::cli::{Cli, Commands};
use sponsordash_cli::client::{cookie_jar, ProtectedRequest};
use sponsordash_cli::config::{Config, ENV_REFRESH_COOKIE};
use sponsordash_cli::session::{token, Role};
use sponsordash_cli::{logging, Portal, PortalError};
use std::path::Path;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

/// Main application entry point
fn run() -> i32 {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    // The session core assumes one cooperative thread
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{} failed to start runtime: {err}", style("Error:").red().bold());
            return 1;
        }
    };

    match runtime.block_on(execute(cli)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err:#}", style("Error:").red().bold());
            if let Some(portal_err) = err.downcast_ref::<PortalError>() {
                if portal_err.requires_login() {
                    eprintln!("  Sign in to the dashboard again to renew the refresh cookie.");
                }
                return portal_err.exit_code();
            }
            1
        }
    }
}

/// Execute the requested command
async fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    config.apply_overrides(cli.api_url.as_deref(), cli.auth_url.as_deref());

    match cli.command {
        Commands::Version => {
            println!("Sponsordash CLI v{}", sponsordash_cli::VERSION);
            return Ok(());
        }
        Commands::Config { init, force } => return handle_config(cli.config.as_deref(), &config, init, force),
        _ => {}
    }

    let refresh_cookie = std::env::var(ENV_REFRESH_COOKIE).ok().filter(|c| !c.is_empty());
    let jar = cookie_jar(&config.auth_url, refresh_cookie.as_deref())?;
    let portal = Portal::connect(config, jar)?;

    if BootstrapView::of(portal.store()) == BootstrapView::Loading {
        eprintln!("{}", style("Restoring session...").dim());
    }
    let outcome = portal.start().await;

    match cli.command {
        Commands::Whoami => handle_whoami(&portal, outcome),
        Commands::Request {
            method,
            path,
            data,
            headers,
        } => handle_request(&portal, &method, &path, data.as_deref(), &headers).await,
        Commands::Guard { location } => handle_guard(&portal, &location),
        Commands::SetRole { user_id, role } => handle_set_role(&portal, &user_id, role).await,
        Commands::Logout => handle_logout(&portal).await,
        Commands::Version | Commands::Config { .. } => Ok(()),
    }
}

/// Handle whoami command
fn handle_whoami(portal: &Portal, outcome: BootstrapOutcome) -> Result<()> {
    let session = portal.store().snapshot();
    if !session.is_active() {
        println!("{} Not signed in", style("✗").red());
        return Ok(());
    }

    println!("{}", style("=== Sponsordash Session ===\n").bold().cyan());
    println!("{} {}", style("Name:").bold(), session.name.as_deref().unwrap_or("unknown"));
    println!("{} {}", style("Email:").bold(), session.email.as_deref().unwrap_or("unknown"));
    println!("{} {}", style("ID:").bold(), session.user_id.as_deref().unwrap_or("unknown"));
    if let Some(role) = session.role {
        println!("{} {}", style("Role:").bold(), role);
    }

    if let Some(exp) = session.access_token.as_deref().and_then(token::expiry) {
        if let Some(at) = chrono::DateTime::<chrono::Utc>::from_timestamp(exp, 0) {
            println!("{} {}", style("Token expires:").bold(), at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    if outcome == BootstrapOutcome::Refreshed {
        println!("\n{} Session restored from refresh cookie", style("✓").green());
    }
    Ok(())
}

/// Handle request command
async fn handle_request(
    portal: &Portal,
    method: &str,
    path: &str,
    data: Option<&str>,
    headers: &[String],
) -> Result<()> {
    let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| PortalError::InvalidArgument(format!("invalid HTTP method '{method}'")))?;

    let mut request = ProtectedRequest::new(method, path);
    for header in headers {
        let (name, value) = header.split_once(':').ok_or_else(|| {
            PortalError::InvalidArgument(format!("header '{header}' must look like 'Name: value'"))
        })?;
        request = request.header(name.trim(), value.trim())?;
    }
    if let Some(data) = data {
        let body: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| PortalError::InvalidArgument(format!("--data is not valid JSON: {e}")))?;
        request = request.json(&body)?;
    }

    let response = portal.request(request).await?;
    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}

/// Handle guard command
fn handle_guard(portal: &Portal, location: &str) -> Result<()> {
    let decision = portal.navigate(location);
    match &decision {
        GuardDecision::Allow => println!("{} {location}: allowed", style("✓").green()),
        GuardDecision::Pending => println!("{} {location}: session still loading", style("…").yellow()),
        GuardDecision::RedirectToLogin { .. } => {
            println!("{} {location}: sign-in required", style("✗").red());
        }
        GuardDecision::RedirectUnauthorized => {
            let role = portal
                .store()
                .snapshot()
                .role
                .map_or_else(|| "none".to_string(), |role: Role| role.to_string());
            println!("{} {location}: not permitted for role '{role}'", style("✗").red());
        }
    }
    if let Some(target) = portal.guard().redirect_target(&decision) {
        println!("  {} {target}", style("→ redirect:").dim());
    }
    Ok(())
}

/// Handle set-role command
async fn handle_set_role(portal: &Portal, user_id: &str, role: Role) -> Result<()> {
    let identity = portal
        .update_user_role(user_id, role)
        .await
        .with_context(|| format!("updating role of user {user_id}"))?;

    println!(
        "{} {} is now {}",
        style("✓").green(),
        identity.email.as_deref().unwrap_or(&identity.id),
        style(identity.role.unwrap_or(role)).bold()
    );
    Ok(())
}

/// Handle logout command
async fn handle_logout(portal: &Portal) -> Result<()> {
    let target = portal.logout().await?;
    println!("{} Signed out", style("✓").green());
    println!("  {} {target}", style("→ redirect:").dim());
    Ok(())
}

/// Handle config command
fn handle_config(path: Option<&Path>, config: &Config, init: bool, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    if init {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
        Config::default().save_to(&path)?;
        println!("{} Wrote {}", style("✓").green(), path.display());
        return Ok(());
    }

    println!("{} {}", style("Config file:").bold(), path.display());
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
