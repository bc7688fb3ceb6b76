// src/error.rs

//! Unified error handling for the orchestration layer.

use std::fmt;

use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Backend call failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation needs a logged-in session
    #[error("Login required: {0}")]
    NotAuthenticated(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a login-required error naming the rejected operation.
    pub fn not_authenticated(operation: impl Into<String>) -> Self {
        Self::NotAuthenticated(operation.into())
    }
}

/// Failure category of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connectivity problem, the request never got an answer
    Network,
    /// Non-2xx status or a body that does not match the expected shape
    Server,
    /// Transport timeout elapsed
    Timeout,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::Network => "network",
            FetchErrorKind::Server => "server",
            FetchErrorKind::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Typed failure surfaced by the fetch gateway. No retry is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl fmt::Display) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            status: None,
            message: message.to_string(),
        }
    }

    pub fn server(status: Option<u16>, message: impl fmt::Display) -> Self {
        Self {
            kind: FetchErrorKind::Server,
            status,
            message: message.to_string(),
        }
    }

    pub fn timeout(message: impl fmt::Display) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            status: None,
            message: message.to_string(),
        }
    }

    /// A 2xx response whose body is not the shape the endpoint promises.
    pub fn unexpected_shape(endpoint: impl fmt::Display, detail: impl fmt::Display) -> Self {
        Self::server(None, format!("unexpected payload from {endpoint}: {detail}"))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let status = error.status().map(|s| s.as_u16());
        if error.is_timeout() {
            Self::timeout(error)
        } else if error.is_status() || error.is_decode() {
            Self::server(status, error)
        } else {
            Self::network(error)
        }
    }
}
