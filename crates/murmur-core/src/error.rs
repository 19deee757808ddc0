//! Error types for the murmur client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and storage errors.
//! [`Error::kind`] folds them into the coarse categories that the request
//! dispatcher reasons about.

use std::fmt;
use thiserror::Error;

/// The unified error type for murmur operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed HTTP).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (expired credential, failed renewal, rejected login).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-success statuses, unexpected bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, route).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Local persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse error categories used by collaborators to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A protected request was rejected for an expired or invalid credential.
    ExpiredCredential,
    /// The renewal endpoint failed; the session has ended.
    RenewalFailed,
    /// Network-level failure unrelated to authorization.
    TransportFailure,
    /// A 401-class response from a credential-issuance or renewal endpoint.
    ExemptRouteRejected,
    /// Any other non-success response.
    Protocol,
    /// Invalid caller input.
    InvalidInput,
    /// Local persistence failure.
    Storage,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::TransportFailure,
            Error::Auth(AuthError::CredentialExpired) => ErrorKind::ExpiredCredential,
            Error::Auth(AuthError::RenewalFailed(_)) => ErrorKind::RenewalFailed,
            Error::Auth(AuthError::Rejected { .. }) => ErrorKind::ExemptRouteRejected,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if this error means the session is over and the user
    /// has to log in again.
    pub fn is_session_ended(&self) -> bool {
        self.kind() == ErrorKind::RenewalFailed
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The credential attached to a protected request was not accepted.
    #[error("credential expired")]
    CredentialExpired,

    /// Renewing the credential failed.
    #[error("credential renewal failed: {0}")]
    RenewalFailed(RenewalFailure),

    /// A login, registration or renewal endpoint rejected the request.
    #[error("rejected by {route}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        route: String,
        message: Option<String>,
    },
}

/// Why a credential renewal failed.
///
/// Every request waiting on the same renewal receives an identical copy of
/// this value, hence `Clone` and `PartialEq`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalFailure {
    /// The renewal call never produced a response.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The renewal endpoint answered with a non-success status.
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The renewal endpoint succeeded but returned no credential.
    #[error("no credential in renewal response")]
    MissingCredential,

    /// The renewal task ended without reporting an outcome.
    #[error("renewal abandoned")]
    Abandoned,
}

impl From<RenewalFailure> for Error {
    fn from(failure: RenewalFailure) -> Self {
        Error::Auth(AuthError::RenewalFailed(failure))
    }
}

/// Protocol-level errors from non-success responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server, if the body carried one.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if this is a not-found response.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid route path.
    #[error("invalid route '{value}': {reason}")]
    Route { value: String, reason: String },

    /// A response body could not be decoded.
    #[error("malformed response body: {message}")]
    Body { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Local persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be parsed or written.
    #[error("corrupt store at {path}: {message}")]
    Corrupt { path: String, message: String },
}
