//! Per-navigation authorization decision.

use std::sync::Arc;

use crate::session::SessionStore;

use super::{AUTH_PREFIX, Chrome, HOME_PATH, LOGIN_PATH, RouteMeta};

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// The startup restore has not completed; re-evaluate once it has
    /// instead of flashing the login view at a user who may well hold a
    /// valid session.
    Defer,
    /// Proceed with the requested transition.
    Allow,
    /// Deny the requested transition and go to this path instead.
    Redirect(String),
}

/// Gate invoked before every client-side route transition.
///
/// Decisions are made synchronously against already-resolved session state;
/// the guard never triggers a network validation itself (that happens once,
/// in [`SessionStore::restore`]).
pub struct NavigationGuard {
    session: SessionStore,
    chrome: Option<Arc<dyn Chrome>>,
}

impl NavigationGuard {
    #[must_use]
    pub const fn new(session: SessionStore, chrome: Option<Arc<dyn Chrome>>) -> Self {
        Self { session, chrome }
    }

    /// Decide whether the transition to `path` may proceed.
    ///
    /// Evaluated in order: title side effect, defer while uninitialized,
    /// auth-only views bounced for authenticated users, protected views
    /// denied (recording the redirect target) for unauthenticated sessions,
    /// admin views denied for non-administrators.
    #[must_use]
    pub fn before_each(&self, path: &str, meta: &RouteMeta) -> GuardVerdict {
        // Title application is a side effect, not a gate.
        if let (Some(chrome), Some(title)) = (&self.chrome, &meta.title) {
            chrome.set_title(title);
        }

        if !self.session.is_initialized() {
            return GuardVerdict::Defer;
        }

        if meta.requires_auth {
            if !self.session.is_authenticated() {
                self.session.set_redirect_path(path);
                return GuardVerdict::Redirect(LOGIN_PATH.to_string());
            }
            if meta.requires_admin && !self.session.is_administrator() {
                return GuardVerdict::Redirect(HOME_PATH.to_string());
            }
            return GuardVerdict::Allow;
        }

        // Logged-in users have no business on the login/register views.
        if self.session.is_authenticated() && path.starts_with(AUTH_PREFIX) {
            return GuardVerdict::Redirect(HOME_PATH.to_string());
        }

        GuardVerdict::Allow
    }
}
