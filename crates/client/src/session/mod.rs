//! Session store: the credential lifecycle state machine.
//!
//! Owns the credential token and the paired identity. The two are set
//! together on login or restore and cleared together on logout or
//! invalidation; one without the other never exists. The persisted copy
//! (under the fixed `auth_token` / `auth_user` keys) is re-serialized on
//! every mutation, so it is never partially inconsistent with memory.
//!
//! Interactive flows ([`login`](SessionStore::login),
//! [`register`](SessionStore::register), the password-reset pair) return a
//! [`FlowOutcome`] result value; they never raise past this boundary.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;

use mailcove_core::{Identity, IdentityPatch};

use crate::api::auth::{AuthApi, LoginPayload, LoginRequest, RegisterRequest, ResetPasswordRequest};
use crate::http::{ApiClient, ApiError, ApiResponse};
use crate::router::HOME_PATH;
use crate::storage::{StoragePort, keys};

/// Fallback message when a flow call fails before reaching the backend.
const NETWORK_FAILURE_MESSAGE: &str = "network error, please try again later";

/// Result value returned by the interactive auth flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutcome {
    pub success: bool,
    /// Display message: the backend's own message for domain failures, a
    /// generic network message when the call itself failed.
    pub message: Option<String>,
}

impl FlowOutcome {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    #[must_use]
    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Derived authentication phase of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The one-time startup restore has not completed yet. Route decisions
    /// must be deferred, not denied.
    Uninitialized,
    Authenticated,
    Unauthenticated,
}

#[derive(Default)]
struct SessionState {
    credential: Option<SecretString>,
    identity: Option<Identity>,
    initialized: bool,
    /// Pending post-login navigation path; `None` means the default.
    redirect_path: Option<String>,
}

/// Owner of the credential and identity.
///
/// Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: AuthApi,
    storage: Arc<dyn StoragePort>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    #[must_use]
    pub fn new(client: ApiClient, storage: Arc<dyn StoragePort>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api: AuthApi::new(client),
                storage,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the persisted session. Runs exactly once at startup.
    ///
    /// With nothing persisted this completes without a network call. With a
    /// persisted credential and identity the session is optimistically
    /// restored, then validated with one profile fetch; any validation
    /// failure (including the 401 interception path) purges the persisted
    /// state. Either way initialization is marked complete, which is what
    /// lets the navigation guard tell "not yet known" apart from "known
    /// unauthenticated".
    pub async fn restore(&self) {
        let token = self.inner.storage.get(keys::AUTH_TOKEN);
        let raw_identity = self.inner.storage.get(keys::AUTH_USER);

        if let (Some(token), Some(raw_identity)) = (token, raw_identity) {
            match serde_json::from_str::<Identity>(&raw_identity) {
                Ok(identity) => {
                    {
                        let mut state = self.write_state();
                        state.credential = Some(SecretString::from(token));
                        state.identity = Some(identity);
                    }
                    if !self.validate().await {
                        self.clear_session();
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable persisted identity");
                    self.clear_session();
                }
            }
        }

        self.write_state().initialized = true;
    }

    /// One validation round-trip through the request pipeline.
    ///
    /// Returns `false` (and clears the session) when the backend rejects the
    /// credential or the call fails.
    async fn validate(&self) -> bool {
        if self.read_state().credential.is_none() {
            return false;
        }

        match self.inner.api.profile().await {
            Ok(response) if response.success => true,
            Ok(response) => {
                tracing::warn!(code = response.code, "credential validation rejected");
                self.clear_session();
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential validation failed");
                self.clear_session();
                false
            }
        }
    }

    /// Log in and, on success, atomically adopt and persist the returned
    /// credential and identity. On failure the prior state is untouched.
    ///
    /// Concurrent `login` calls are not coordinated against each other: the
    /// last write to persisted storage wins. The UI is expected to disable
    /// concurrent submission.
    pub async fn login(&self, credentials: &LoginRequest) -> FlowOutcome {
        let result = self.inner.api.login(credentials).await;
        self.finish_login(result)
    }

    /// Log in against the administrator endpoint. Same state transitions as
    /// [`login`](Self::login).
    pub async fn admin_login(&self, credentials: &LoginRequest) -> FlowOutcome {
        let result = self.inner.api.admin_login(credentials).await;
        self.finish_login(result)
    }

    fn finish_login(&self, result: Result<ApiResponse<LoginPayload>, ApiError>) -> FlowOutcome {
        match result {
            Ok(response) => match (response.success, response.data) {
                (true, Some(payload)) => {
                    self.adopt_session(payload.token, payload.user);
                    FlowOutcome::ok()
                }
                (true, None) => FlowOutcome::fail("login response carried no session"),
                (false, _) => FlowOutcome::fail(non_empty_or(response.message, "login failed")),
            },
            Err(e) => {
                tracing::error!(error = %e, "login request failed");
                FlowOutcome::fail(flow_failure_message(&e))
            }
        }
    }

    /// Best-effort notify the backend, then unconditionally tear the local
    /// session down. Idempotent when already logged out.
    ///
    /// A backend failure here is swallowed (logged only): local teardown must
    /// succeed regardless of network state.
    pub async fn logout(&self) {
        let logged_in = self.read_state().credential.is_some();
        if logged_in
            && let Err(e) = self.inner.api.logout().await
        {
            tracing::warn!(error = %e, "logout notification failed, clearing session anyway");
        }

        self.clear_session();
        self.write_state().initialized = true;
    }

    /// Register a new account. Does not mutate session state; a subsequent
    /// explicit login is required.
    pub async fn register(&self, request: &RegisterRequest) -> FlowOutcome {
        match self.inner.api.register(request).await {
            Ok(response) if response.success => {
                FlowOutcome::ok_with("registration complete, please log in")
            }
            Ok(response) => FlowOutcome::fail(non_empty_or(response.message, "registration failed")),
            Err(e) => {
                tracing::error!(error = %e, "register request failed");
                FlowOutcome::fail(flow_failure_message(&e))
            }
        }
    }

    /// Start the password-reset flow by mailing a verification code.
    /// Does not mutate session state.
    pub async fn forgot_password(&self, email: &str) -> FlowOutcome {
        match self.inner.api.forgot_password(email).await {
            Ok(response) if response.success => FlowOutcome::ok_with("reset code sent"),
            Ok(response) => FlowOutcome::fail(non_empty_or(response.message, "sending failed")),
            Err(e) => {
                tracing::error!(error = %e, "forgot-password request failed");
                FlowOutcome::fail(flow_failure_message(&e))
            }
        }
    }

    /// Complete the password-reset flow. Does not mutate session state.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> FlowOutcome {
        match self.inner.api.reset_password(request).await {
            Ok(response) if response.success => FlowOutcome::ok_with("password reset"),
            Ok(response) => FlowOutcome::fail(non_empty_or(response.message, "reset failed")),
            Err(e) => {
                tracing::error!(error = %e, "reset-password request failed");
                FlowOutcome::fail(flow_failure_message(&e))
            }
        }
    }

    /// Merge fields into the current identity and re-persist the serialized
    /// copy. No-op when there is no current identity.
    pub fn update_identity(&self, patch: IdentityPatch) {
        let mut state = self.write_state();
        if let Some(identity) = state.identity.as_mut() {
            identity.apply(patch);
            Self::persist_identity(&self.inner.storage, identity);
        }
    }

    /// React to the pipeline's 401 interception: the persisted keys are
    /// already cleared, so only the in-memory state remains to drop.
    pub fn handle_unauthorized(&self) {
        self.clear_session();
        self.write_state().initialized = true;
    }

    // =========================================================================
    // Redirect target
    // =========================================================================

    /// Record the navigation path to return to after login.
    pub fn set_redirect_path(&self, path: &str) {
        self.write_state().redirect_path = Some(path.to_string());
    }

    /// Read-and-reset the pending redirect target. A second consecutive call
    /// returns the default home path.
    pub fn take_redirect_path(&self) -> String {
        self.write_state()
            .redirect_path
            .take()
            .unwrap_or_else(|| HOME_PATH.to_string())
    }

    // =========================================================================
    // Derived facts
    // =========================================================================

    /// Credential and identity both present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let state = self.read_state();
        state.credential.is_some() && state.identity.is_some()
    }

    /// The current identity holds the administrator role.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.read_state()
            .identity
            .as_ref()
            .is_some_and(Identity::is_administrator)
    }

    /// Whether the one-time startup restore has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    /// Current phase, derived from the initialization flag and the presence
    /// of credential and identity.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let state = self.read_state();
        if !state.initialized {
            SessionPhase::Uninitialized
        } else if state.credential.is_some() && state.identity.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity.clone()
    }

    /// Display initials of the current identity's name.
    #[must_use]
    pub fn initials(&self) -> Option<String> {
        self.read_state().identity.as_ref().map(Identity::initials)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Set credential and identity together, in memory and in the persisted
    /// store.
    fn adopt_session(&self, token: String, identity: Identity) {
        self.inner.storage.set(keys::AUTH_TOKEN, &token);
        Self::persist_identity(&self.inner.storage, &identity);

        let mut state = self.write_state();
        state.credential = Some(SecretString::from(token));
        state.identity = Some(identity);
    }

    fn persist_identity(storage: &Arc<dyn StoragePort>, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => storage.set(keys::AUTH_USER, &raw),
            Err(e) => tracing::warn!(error = %e, "failed to serialize identity"),
        }
    }

    /// Clear credential and identity together, in memory and in the
    /// persisted store, and reset the redirect target.
    fn clear_session(&self) {
        self.inner.storage.remove(keys::AUTH_TOKEN);
        self.inner.storage.remove(keys::AUTH_USER);

        let mut state = self.write_state();
        state.credential = None;
        state.identity = None;
        state.redirect_path = None;
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The backend's own message for domain failures, a fallback otherwise.
fn non_empty_or(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// User-facing message for a flow call that failed before producing an
/// envelope. Timeout and expiry keep their fixed messages; everything else
/// collapses to a generic network failure.
fn flow_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Timeout | ApiError::Unauthorized | ApiError::Validation { .. } => {
            error.to_string()
        }
        ApiError::Network(_) | ApiError::Transport { .. } | ApiError::Decode(_) => {
            NETWORK_FAILURE_MESSAGE.to_string()
        }
    }
}

// SecretString intentionally never leaves this module; expose_secret is only
// needed when comparing in tests.
#[cfg(test)]
impl SessionStore {
    pub(crate) fn credential_for_tests(&self) -> Option<String> {
        use secrecy::ExposeSecret;
        self.read_state()
            .credential
            .as_ref()
            .map(|s| s.expose_secret().to_string())
    }
}
