//! Error types for deploywatch

use thiserror::Error;

/// Startup and configuration errors. Any of these stops the process before
/// the polling loop begins.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}

/// Why a single fetch of the deployment list failed. None of these are fatal
/// to the polling loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a non-success status
    #[error("API responded with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// No response came back (connect failure, DNS, timeout)
    #[error("No response received: {0}")]
    Unreachable(String),

    /// The request could not be built or the response could not be read
    #[error("{message}")]
    MalformedOrLocal { message: String },
}

impl FetchError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FetchError::MalformedOrLocal {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            FetchError::Unreachable(err.to_string())
        } else {
            FetchError::malformed(err.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::malformed(format!("invalid request URL: {}", err))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::malformed(format!("unexpected response body: {}", err))
    }
}
