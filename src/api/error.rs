//! Failure modes of a call to the analysis backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-success HTTP status. `message` is the backend's `error` field when
    /// it was read, otherwise `API error: <status>`.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The body carried an `error` field.
    #[error("{0}")]
    Backend(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(status: u16) -> Self {
        ApiError::Status {
            status,
            message: format!("API error: {}", status),
        }
    }
}
