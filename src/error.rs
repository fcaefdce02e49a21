//! Transport error type
//!
//! Every failure talking to the agent (unreachable host, non-2xx status,
//! malformed JSON) is normalized into `ApiError` so callers never branch on
//! transport specifics.

use thiserror::Error;

/// Failure of a single API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// The agent answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable message for status lines
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the agent rejected the request payload
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Status { status: 400 | 422, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
