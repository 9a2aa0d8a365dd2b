//! Error types for photoop

use std::time::Duration;
use thiserror::Error;

/// Result type alias for photoop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type shared by every component.
///
/// Callers match on [`Error::kind`] when they only care about the failure
/// class, or on the wrapped error when they need the detail.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Failure class attached to every [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    NotFound,
    Persistence,
    Auth,
    Config,
    Other,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Decode(_) | Error::Json(_) => ErrorKind::Decode,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::Auth(_) => ErrorKind::Auth,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::Dialoguer(_) | Error::Other(_) => ErrorKind::Other,
        }
    }
}

/// Transport-level errors: connectivity and HTTP status failures.
///
/// These short-circuit before any decoder runs and are never retried.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Authentication failed. Run `photoop login` to sign in again.")]
    Unauthorized,

    #[error("Access denied. The current session lacks permission for this call.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            TransportError::Network("Failed to connect to API".to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// A response body could not be turned into the decoder's target type
#[derive(Debug, Clone, Error)]
#[error("Failed to decode {type_name}: {message}")]
pub struct DecodeError {
    /// Name of the type the decoder was bound to
    pub type_name: &'static str,

    /// Underlying parser message
    pub message: String,
}

impl DecodeError {
    pub fn new(type_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            type_name,
            message: message.into(),
        }
    }
}

/// Cache miss. A normal control-flow signal, not a failure to log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No cached entry for key {key}")]
pub struct NotFoundError {
    pub key: String,
}

/// Durable settings store errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Could not determine a data directory for settings")]
    NoHome,

    #[error("Settings database error: {0}")]
    Database(String),

    #[error("Settings I/O error: {0}")]
    Io(String),

    #[error("Failed to encode setting `{key}`: {message}")]
    Encode { key: String, message: String },
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Database(err.to_string())
    }
}

/// OAuth handshake and session errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("A login is already waiting for authorization")]
    HandshakeInProgress,

    #[error("Authorization was cancelled")]
    Cancelled,

    #[error("Authorization was denied by the user")]
    Denied,

    #[error("Malformed authorization callback: {0}")]
    MalformedCallback(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Not logged in. Run `photoop login` first.")]
    NotLoggedIn,

    #[error("Could not open the authorization page: {0}")]
    Presentation(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `photoop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Consumer key not configured. Run `photoop init` to add your API key.")]
    MissingConsumerKey,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
