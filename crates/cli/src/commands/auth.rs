//! Session commands: login, whoami, register, logout.

use std::sync::Arc;

use thiserror::Error;

use mailcove_client::api::auth::{LoginRequest, RegisterRequest};
use mailcove_client::app::App;
use mailcove_client::config::{ClientConfig, ConfigError};
use mailcove_client::router::Navigator;
use mailcove_client::storage::FileStorage;

const DEFAULT_SESSION_FILE: &str = "mailcove-session.json";

/// Errors that can occur during session commands.
#[derive(Debug, Error)]
pub enum AuthCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session file could not be opened.
    #[error("Session file error: {0}")]
    SessionFile(#[from] std::io::Error),

    /// The backend rejected the flow.
    #[error("{0}")]
    Rejected(String),

    /// No authenticated session.
    #[error("Not logged in")]
    NotLoggedIn,
}

/// Navigator for a non-interactive process: a forced redirect just tells the
/// user where a browser would have gone.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn replace(&self, path: &str) {
        tracing::warn!("session expired, continue at {path}");
    }
}

fn build_app() -> Result<App, AuthCommandError> {
    let config = ClientConfig::from_env()?;
    let session_file = std::env::var("MAILCOVE_SESSION_FILE")
        .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
    let storage = Arc::new(FileStorage::open(session_file)?);
    Ok(App::new(&config, storage, Arc::new(CliNavigator), None))
}

/// Log in and persist the session.
///
/// # Errors
///
/// Returns `AuthCommandError::Rejected` with the backend's message when the
/// credentials are refused.
pub async fn login(username: String, password: String, admin: bool) -> Result<(), AuthCommandError> {
    let app = build_app()?;
    app.start().await;

    let credentials = LoginRequest { username, password };
    let outcome = if admin {
        app.session.admin_login(&credentials).await
    } else {
        app.session.login(&credentials).await
    };

    if !outcome.success {
        return Err(AuthCommandError::Rejected(
            outcome.message.unwrap_or_else(|| "login failed".to_string()),
        ));
    }

    if let Some(identity) = app.session.identity() {
        tracing::info!("Logged in as {} ({})", identity.display_name(), identity.email);
    }
    Ok(())
}

/// Restore the persisted session and show the authenticated identity.
///
/// # Errors
///
/// Returns `AuthCommandError::NotLoggedIn` when no valid session is
/// persisted.
pub async fn whoami() -> Result<(), AuthCommandError> {
    let app = build_app()?;
    app.start().await;

    let identity = app.session.identity().ok_or(AuthCommandError::NotLoggedIn)?;
    tracing::info!("User: {}", identity.display_name());
    tracing::info!("  Username: {}", identity.username);
    tracing::info!("  Email: {}", identity.email);
    tracing::info!("  Role: {:?}", identity.role);
    tracing::info!("  Status: {:?}", identity.status);
    Ok(())
}

/// Register a new account. Does not log in.
///
/// # Errors
///
/// Returns `AuthCommandError::Rejected` with the backend's message when
/// registration is refused.
pub async fn register(
    username: String,
    email: String,
    password: String,
    nickname: Option<String>,
) -> Result<(), AuthCommandError> {
    let app = build_app()?;
    app.start().await;

    let outcome = app
        .session
        .register(&RegisterRequest {
            username,
            email,
            password,
            nickname,
        })
        .await;

    if !outcome.success {
        return Err(AuthCommandError::Rejected(
            outcome
                .message
                .unwrap_or_else(|| "registration failed".to_string()),
        ));
    }

    tracing::info!("{}", outcome.message.unwrap_or_default());
    Ok(())
}

/// Notify the backend and clear the persisted session.
///
/// # Errors
///
/// Returns `AuthCommandError::Config` or `AuthCommandError::SessionFile` when
/// the app cannot be assembled; the logout itself cannot fail.
pub async fn logout() -> Result<(), AuthCommandError> {
    let app = build_app()?;
    app.start().await;

    app.session.logout().await;
    tracing::info!("Logged out");
    Ok(())
}
