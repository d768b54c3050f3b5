//! Error types for the Carrot client.
//!
//! # Design
//! Expected outcomes of a call (user not created, not authorized, read-only,
//! authorized, undetermined) are `AuthorizationStatus` values, never errors.
//! `ApiError` covers only what stops a request from being built or from
//! completing its round-trip: bad configuration, a payload that cannot be
//! encoded, or a transport failure.

use thiserror::Error;

/// Errors returned by `CarrotClient` and its transports.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The HTTP transport failed (DNS, connection refused, timeout, malformed
    /// response).
    #[cfg(feature = "ureq")]
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// An I/O failure raised by a custom transport.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Action or object properties could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
