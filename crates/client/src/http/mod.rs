//! Request pipeline for the Mailcove backend.
//!
//! Every call, whatever the verb, funnels through one internal executor that:
//!
//! - attaches the stored bearer credential when one exists,
//! - bounds the request with the configured timeout (the underlying transport
//!   attempt is aborted, not merely raced),
//! - normalizes the backend `{code, data, msg}` envelope into
//!   [`ApiResponse`], and
//! - intercepts HTTP 401: the persisted credential and identity are cleared
//!   and the registered unauthorized hook fires before the failure is handed
//!   to the caller. No request proceeds under a dead credential past this
//!   point.
//!
//! Callers never see the raw envelope or the raw transport error; failures
//! arrive as [`ApiError`] variants distinguishable by kind.

mod error;
mod query;

pub use error::ApiError;
pub use query::{Query, Scalar};

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::storage::{StoragePort, keys};

/// Callback invoked after a 401 response forced the persisted session to be
/// cleared. Registered once during app wiring; typically drops the in-memory
/// session state and navigates to the login view.
pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Raw backend response wrapper. Never exposed to callers.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    data: Option<T>,
    #[serde(default)]
    msg: String,
}

/// Normalized backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// Whether the backend reported success (`code == 0`).
    pub success: bool,
    /// Unwrapped `data` payload, when present.
    pub data: Option<T>,
    /// Human-readable message supplied by the backend.
    pub message: String,
    /// Raw backend code.
    pub code: i64,
}

impl<T> ApiResponse<T> {
    /// Convert a domain failure (`code != 0`) into [`ApiError::Validation`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` carrying the backend's code and message
    /// when the envelope reported failure.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Validation {
                code: self.code,
                message: self.message,
            })
        }
    }

    /// Like [`into_result`](Self::into_result), but requires a payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` on a domain failure, or
    /// `ApiError::Decode` if a successful envelope carried no data.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.into_result()?
            .ok_or_else(|| ApiError::Decode("envelope carried no data".to_string()))
    }
}

enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

// =============================================================================
// ApiClient
// =============================================================================

/// HTTP client for the Mailcove backend.
///
/// Cheap to clone; all clones share the same storage port and unauthorized
/// hook.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    storage: Arc<dyn StoragePort>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// The storage port is the same durable store the session store persists
    /// into: the credential is read from it on every outgoing call, so a
    /// freshly stored token takes effect immediately.
    #[must_use]
    pub fn new(config: &ClientConfig, storage: Arc<dyn StoragePort>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                timeout: config.timeout,
                storage,
                on_unauthorized: RwLock::new(None),
            }),
        }
    }

    /// Register the callback fired after a 401 forced the session teardown.
    ///
    /// Replaces any previously registered hook.
    pub fn set_unauthorized_hook(&self, hook: UnauthorizedHook) {
        *self
            .inner
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// GET a path with query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::GET, path, query, RequestBody::Empty, HeaderMap::new())
            .await
    }

    /// GET with caller-supplied headers (merged last, caller wins).
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn get_with_headers<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        headers: HeaderMap,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::GET, path, query, RequestBody::Empty, headers)
            .await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(
            Method::POST,
            path,
            &Query::new(),
            RequestBody::Json(to_json(body)?),
            HeaderMap::new(),
        )
        .await
    }

    /// POST a JSON body with caller-supplied headers (merged last).
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn post_with_headers<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        headers: HeaderMap,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(
            Method::POST,
            path,
            &Query::new(),
            RequestBody::Json(to_json(body)?),
            headers,
        )
        .await
    }

    /// POST without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(
            Method::POST,
            path,
            &Query::new(),
            RequestBody::Empty,
            HeaderMap::new(),
        )
        .await
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(
            Method::PUT,
            path,
            &Query::new(),
            RequestBody::Json(to_json(body)?),
            HeaderMap::new(),
        )
        .await
    }

    /// DELETE a path.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(
            Method::DELETE,
            path,
            &Query::new(),
            RequestBody::Empty,
            HeaderMap::new(),
        )
        .await
    }

    /// Upload a file as `multipart/form-data` under the `file` field, with
    /// extra form fields stringified by the same rules as query scalars.
    ///
    /// The multipart content-type (and boundary) is left to the transport.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the failure taxonomy.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        fields: &Query,
    ) -> Result<ApiResponse<T>, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new().part("file", part);
        for (key, value) in fields.encode() {
            form = form.text(key, value);
        }
        self.execute(
            Method::POST,
            path,
            &Query::new(),
            RequestBody::Multipart(form),
            HeaderMap::new(),
        )
        .await
    }

    /// The one executor every verb funnels through.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: RequestBody,
        extra_headers: HeaderMap,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!(method = %method, path, "backend request");

        let mut request = self
            .inner
            .http
            .request(method, &url)
            .timeout(self.inner.timeout);

        if !query.is_empty() {
            request = request.query(&query.encode());
        }

        // Header synthesis order: base content-type, bearer credential,
        // caller-supplied headers last (caller wins on conflict). Multipart
        // requests carry no base content-type so the transport can set the
        // boundary.
        request = match body {
            RequestBody::Empty => {
                request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        if let Some(token) = self.inner.storage.get(keys::AUTH_TOKEN) {
            request = request.bearer_auth(token);
        }

        if !extra_headers.is_empty() {
            request = request.headers(extra_headers);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.force_logout(path);
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                path,
                body = %message.chars().take(200).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(ApiError::Transport {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await.map_err(ApiError::from)?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                path,
                error = %e,
                body = %text.chars().take(200).collect::<String>(),
                "failed to parse backend envelope"
            );
            ApiError::Decode(e.to_string())
        })?;

        Ok(ApiResponse {
            success: envelope.code == 0,
            data: envelope.data,
            message: envelope.msg,
            code: envelope.code,
        })
    }

    /// Forced-logout side effect for a rejected credential.
    ///
    /// This is the single place that guarantees no further request proceeds
    /// under a dead credential: both persisted keys are cleared here, then
    /// the registered hook handles in-memory state and navigation.
    fn force_logout(&self, path: &str) {
        tracing::warn!(path, "credential rejected by backend, clearing session");
        self.inner.storage.remove(keys::AUTH_TOKEN);
        self.inner.storage.remove(keys::AUTH_USER);

        let hook = self
            .inner
            .on_unauthorized
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(hook) = hook.as_ref() {
            hook();
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_normalization_success() {
        let envelope: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"code": 0, "data": [1, 2], "msg": "ok"}"#).unwrap();
        let response = ApiResponse {
            success: envelope.code == 0,
            data: envelope.data,
            message: envelope.msg,
            code: envelope.code,
        };
        assert!(response.success);
        assert_eq!(response.data, Some(vec![1, 2]));
        assert_eq!(response.message, "ok");
    }

    #[test]
    fn test_envelope_defaults_missing_fields() {
        let envelope: Envelope<String> = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.msg, "");
    }

    #[test]
    fn test_into_result_maps_domain_failure() {
        let response: ApiResponse<String> = ApiResponse {
            success: false,
            data: None,
            message: "bad credentials".to_string(),
            code: 1001,
        };
        match response.into_result() {
            Err(ApiError::Validation { code, message }) => {
                assert_eq!(code, 1001);
                assert_eq!(message, "bad credentials");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_into_data_requires_payload() {
        let response: ApiResponse<String> = ApiResponse {
            success: true,
            data: None,
            message: String::new(),
            code: 0,
        };
        assert!(matches!(response.into_data(), Err(ApiError::Decode(_))));
    }
}
