//! Error types for shopfront.
//!
//! [`Error`] is the layered error returned by transports and token stores.
//! [`AuthError`] is the classification the session manager hands to its
//! callers for login and registration.

use std::fmt;
use thiserror::Error;

/// The unified error type for transport and storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a non-success status.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, malformed payload).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns the HTTP status if this error came from an API response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(err) => Some(err.status),
            _ => None,
        }
    }

    /// Check if the API rejected the bearer credential or login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Protocol(err) if err.is_auth_error())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors from API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Short error name from the body (e.g. "Unauthorized"), if present.
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.error.as_deref() == Some("Unauthorized")
    }

    /// Check if the server refused the payload as a duplicate or invalid.
    pub fn is_conflict(&self) -> bool {
        matches!(self.status, 400 | 409 | 422)
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Token storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The stored document could not be encoded or decoded.
    #[error("malformed token document: {message}")]
    Malformed { message: String },
}

/// Authentication outcome errors surfaced by the session manager.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account could not be created (duplicate email or rejected fields).
    #[error("account conflict{}", conflict_suffix(.message))]
    Conflict { message: Option<String> },

    /// Any other transport, protocol or storage failure.
    #[error("network error: {0}")]
    Network(#[source] Error),

    /// The stored session could not be validated.
    ///
    /// Never returned from public operations; the session manager turns it
    /// into a logout.
    #[error("session expired")]
    SessionExpired,
}

fn conflict_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl AuthError {
    /// Classify an error from the login endpoint.
    pub fn from_login(err: Error) -> Self {
        if err.is_unauthorized() {
            AuthError::InvalidCredentials
        } else {
            AuthError::Network(err)
        }
    }

    /// Classify an error from the account creation endpoint.
    pub fn from_registration(err: Error) -> Self {
        match err {
            Error::Protocol(ref protocol) if protocol.is_conflict() => AuthError::Conflict {
                message: protocol.message.clone(),
            },
            other => AuthError::Network(other),
        }
    }
}
