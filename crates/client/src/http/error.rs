//! Failure taxonomy surfaced by the request pipeline.

use thiserror::Error;

/// Errors that can occur when calling the backend.
///
/// Callers distinguish failures by variant, never by matching message text.
/// The messages on [`Timeout`](ApiError::Timeout) and
/// [`Unauthorized`](ApiError::Unauthorized) are the fixed user-facing strings
/// shown by the UI.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request exceeded the configured timeout and was aborted.
    #[error("request timed out, please try again later")]
    Timeout,

    /// The transport layer could not be reached at all.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status other than 401.
    #[error("HTTP {status}: {message}")]
    Transport {
        /// Numeric HTTP status.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// The backend rejected the credential with 401.
    ///
    /// By the time this error reaches a caller the forced-logout side effect
    /// has already run: persisted credential and identity are cleared and the
    /// registered unauthorized hook has fired.
    #[error("session expired, please log in again")]
    Unauthorized,

    /// The backend envelope carried a non-zero `code` with a domain message.
    #[error("{message}")]
    Validation {
        /// Backend failure code.
        code: i64,
        /// Display message supplied by the backend.
        message: String,
    },

    /// The response body did not match the expected envelope shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error)
        }
    }
}
