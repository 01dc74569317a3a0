//! Authentication endpoints consumed by the session store.

use mailcove_core::{Identity, IdentityPatch};
use serde::{Deserialize, Serialize};

use crate::http::{ApiClient, ApiError, ApiResponse, Query};

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub user: Identity,
    pub token: String,
}

/// Registration request. Registration does not log the user in; a subsequent
/// explicit login is required.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub user: Identity,
}

#[derive(Debug, Serialize)]
struct SendCodeRequest<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyCodeRequest<'a> {
    email: &'a str,
    code: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Password reset request, completing a `reset_password` verification code.
#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// Bindings for the login/validate/logout endpoints and the related
/// public flows.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in as a regular user, returning `{user, token}` on success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level; bad
    /// credentials come back as a failed envelope, not an error.
    pub async fn login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<ApiResponse<LoginPayload>, ApiError> {
        self.client.post("/public/user/login", credentials).await
    }

    /// Log in against the administrator endpoint. Same payload shape as
    /// [`login`](Self::login).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn admin_login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<ApiResponse<LoginPayload>, ApiError> {
        self.client.post("/public/admin/login", credentials).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<RegisterPayload>, ApiError> {
        self.client.post("/public/user/register", request).await
    }

    /// Notify the backend of a logout. No response body is required.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails; the session store swallows
    /// this failure because local teardown must succeed regardless.
    pub async fn logout(&self) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client.post_empty("/user/logout").await
    }

    /// Fetch the authenticated profile. Used as the credential validation
    /// round-trip during session restore.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails; a 401 here has already torn
    /// the persisted session down.
    pub async fn profile(&self) -> Result<ApiResponse<Identity>, ApiError> {
        self.client.get("/user/profile", &Query::new()).await
    }

    /// Persist profile changes for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn update_profile(
        &self,
        patch: &IdentityPatch,
    ) -> Result<ApiResponse<Identity>, ApiError> {
        self.client.put("/user/profile", patch).await
    }

    /// Send a verification code of the given kind to an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn send_code(
        &self,
        email: &str,
        kind: &str,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client
            .post("/public/send-code", &SendCodeRequest { email, kind })
            .await
    }

    /// Check a previously sent verification code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        kind: &str,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client
            .post("/public/verify-code", &VerifyCodeRequest { email, code, kind })
            .await
    }

    /// Start the password-reset flow: a `reset_password` code is mailed to
    /// the address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn forgot_password(
        &self,
        email: &str,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.send_code(email, "reset_password").await
    }

    /// Complete the password-reset flow.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client.post("/public/reset-password", request).await
    }
}
