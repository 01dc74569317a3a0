//! Navigation metadata and the per-transition guard.
//!
//! The route table itself is an external collaborator: it supplies a
//! [`RouteMeta`] per route and the guard only reads it. The guard writes one
//! thing back - the redirect target recorded in the session store when it
//! denies an unauthenticated request to a protected view.

mod guard;

pub use guard::{GuardVerdict, NavigationGuard};

use serde::{Deserialize, Serialize};

/// Path of the application's home view, the default redirect target.
pub const HOME_PATH: &str = "/inbox";
/// Path of the login view.
pub const LOGIN_PATH: &str = "/auth/login";
/// Prefix of the auth-only views (login, register, forgot password).
pub const AUTH_PREFIX: &str = "/auth";

/// Layout surrounding a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Main,
    Auth,
    Admin,
}

/// Per-route navigation metadata supplied by the route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteMeta {
    /// Human-readable title applied to the surrounding chrome.
    pub title: Option<String>,
    pub requires_auth: bool,
    pub requires_admin: bool,
    pub layout: Layout,
}

impl RouteMeta {
    /// A view reachable without authentication.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// A view requiring an authenticated session.
    #[must_use]
    pub fn protected() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }

    /// A view additionally requiring the administrator role.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            requires_auth: true,
            requires_admin: true,
            layout: Layout::Admin,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// Navigation sink the 401 hook and post-login flow push paths into.
pub trait Navigator: Send + Sync {
    /// Replace the current location with `path`.
    fn replace(&self, path: &str);
}

/// Surrounding chrome that can display a view title.
pub trait Chrome: Send + Sync {
    fn set_title(&self, title: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_wire_names() {
        let meta: RouteMeta = serde_json::from_str(
            r#"{"title": "Inbox", "requiresAuth": true, "layout": "main"}"#,
        )
        .unwrap();
        assert_eq!(meta.title.as_deref(), Some("Inbox"));
        assert!(meta.requires_auth);
        assert!(!meta.requires_admin);
        assert_eq!(meta.layout, Layout::Main);
    }

    #[test]
    fn test_meta_defaults_allow_everything() {
        let meta: RouteMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, RouteMeta::public());
    }

    #[test]
    fn test_builders() {
        let meta = RouteMeta::admin().with_title("Users");
        assert!(meta.requires_auth);
        assert!(meta.requires_admin);
        assert_eq!(meta.layout, Layout::Admin);
        assert_eq!(meta.title.as_deref(), Some("Users"));
    }
}
