//! Error types and handling for the HTTP server layer.
//!
//! Every fallible operation in this crate returns [`Error`], an opaque struct
//! paired with an [`ErrorKind`] enum, following the `std::io::Error` pattern.
//! Internal error sources can change without breaking consumers.
//!
//! Errors fall into a few groups:
//!
//! - setup failures (bad static file pattern, unreadable TLS key pair) are
//!   returned from registration and construction calls;
//! - serialization and template failures are returned from the response and
//!   render helpers, and the handler decides what to send back;
//! - listener failures end the serve loop and are also pushed to the error
//!   channel returned by [`Server::listen_error`](crate::Server::listen_error).
//!
//! `Error` implements `IntoResponse`, so a handler returning
//! `Result<Response, Error>` can simply use `?`.
//!
//! # Example
//!
//! ```rust
//! use axum_httpserver::{Error, ErrorKind};
//!
//! let error = Error::template("unexpected {{end}}");
//!
//! match error.kind() {
//!     ErrorKind::Template => println!("Template error: {}", error),
//!     _ => println!("Other error: {}", error),
//! }
//!
//! use axum::http::StatusCode;
//! assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
///
/// This enum is marked `#[non_exhaustive]`, so new variants may be added
/// without breaking existing code. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration error (invalid TOML, bad route pattern).
    #[error("configuration error")]
    Configuration,

    /// TLS/certificate error.
    #[error("TLS error")]
    Tls,

    /// I/O error (file operations, network, listener).
    #[error("I/O error")]
    Io,

    /// Invalid input (bad header, unreadable request body).
    #[error("invalid input")]
    InvalidInput,

    /// A value could not be encoded or decoded as JSON.
    #[error("serialization error")]
    Serialization,

    /// A template failed to parse or execute.
    #[error("template error")]
    Template,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error that can occur in the axum-httpserver library.
///
/// Use [`Error::kind()`] to determine the category of error for matching,
/// and the `Display` implementation to get a human-readable message.
///
/// ```rust
/// use axum_httpserver::{Error, ErrorKind};
///
/// let err = Error::config("static file pattern must end with /{*filepath}");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "cert.pem");
/// let err = Error::new(ErrorKind::Tls, io_err);
/// assert_eq!(err.kind(), ErrorKind::Tls);
/// ```
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error code string for this error.
    ///
    /// This is a stable identifier suitable for client-side error handling.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::Tls => "TLS_ERROR",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Serialization => "SERIALIZATION_ERROR",
            ErrorKind::Template => "TEMPLATE_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration
            | ErrorKind::Tls
            | ErrorKind::Io
            | ErrorKind::Serialization
            | ErrorKind::Template
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a structured error response.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string())
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates a TLS error.
    pub fn tls(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Tls, msg.into())
    }

    /// Creates an I/O error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg.into())
    }

    /// Creates an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, msg.into())
    }

    /// Creates a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, msg.into())
    }

    /// Creates a template error.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Template, msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = self.to_error_response();

        tracing::error!(
            error_code = %error_response.error_code,
            message = %error_response.message,
            status = %status.as_u16(),
            "Error occurred"
        );

        (status, Json(error_response)).into_response()
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization, err)
    }
}

impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        Self::new(ErrorKind::Tls, err)
    }
}

// ============================================================================
// ErrorResponse
// ============================================================================

/// Structured error response with error code and details.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Unique error code for client-side error handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
