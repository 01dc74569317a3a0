//! Machine-to-machine endpoints authenticated by `X-API-Key`.
//!
//! These endpoints sit outside the session lifecycle: the key is supplied per
//! client instead of the stored bearer credential, carried as a
//! caller-supplied header that the pipeline merges last.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::http::{ApiClient, ApiError, ApiResponse, Query};

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Client for the `/v1` machine API.
#[derive(Clone)]
pub struct MachineApi {
    client: ApiClient,
    api_key: SecretString,
}

impl MachineApi {
    #[must_use]
    pub const fn new(client: ApiClient, api_key: SecretString) -> Self {
        Self { client, api_key }
    }

    fn key_header(&self) -> Result<HeaderMap, ApiError> {
        let value = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|e| ApiError::Decode(format!("invalid API key format: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }

    /// Send an email on behalf of the key's owner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn send_email(
        &self,
        email: &serde_json::Value,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client
            .post_with_headers("/v1/emails/send", email, self.key_header()?)
            .await
    }

    /// List emails visible to the key's owner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn list_emails(
        &self,
        query: &Query,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client
            .get_with_headers("/v1/emails", query, self.key_header()?)
            .await
    }

    /// List verification codes received by the key's owner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails at the transport level.
    pub async fn list_verification_codes(
        &self,
        query: &Query,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.client
            .get_with_headers("/v1/verification-codes", query, self.key_header()?)
            .await
    }
}
