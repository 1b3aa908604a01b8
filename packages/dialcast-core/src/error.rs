//! Centralized error types for the DialCast core library.
//!
//! This module provides the unified error handling system:
//! - Structured error types using `thiserror`
//! - Machine-readable error codes via the [`ErrorCode`] trait
//! - Result type aliases for the common operations

use thiserror::Error;

use crate::dial::transport::TransportError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

/// Errors that can occur while driving a DIAL device session or a cast run.
#[derive(Debug, Error)]
pub enum DialError {
    /// A device location URL could not be parsed into host, port, and path.
    #[error("invalid device location: {0}")]
    InvalidLocation(String),

    /// The pre-flight memory headroom check failed before a TLS call.
    ///
    /// The lounge control channel has a bursty memory profile under
    /// concurrent TLS sessions; every TLS attempt is gated on a configurable
    /// free-memory threshold.
    #[error("insufficient memory headroom: {available} bytes free, need {required}")]
    ResourceExhausted {
        /// Free bytes reported by the headroom probe.
        available: u64,
        /// The configured threshold that was not met.
        required: u64,
    },

    /// Network, TLS, or timeout failure on an outbound call.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The remote answered with a status code the caller cannot proceed on.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The codec found no usable value for a required field.
    #[error("response parse failed: missing {0}")]
    ParseFailure(&'static str),

    /// Command name is not part of the lounge command vocabulary, or is
    /// missing its required payload. Rejected before any network call.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// The bind response did not yield a required session field.
    #[error("session bind failed: response carried no {0}")]
    BindFailed(&'static str),

    /// The token-batch endpoint returned no lounge token for the screen.
    #[error("lounge token unavailable")]
    TokenUnavailable,

    /// The target application never reported running within the poll budget.
    #[error("app did not report running after {attempts} status polls")]
    RetriesExhausted {
        /// Number of polls performed before giving up.
        attempts: u32,
    },

    /// A command was dispatched against a device without a bound session.
    #[error("session is not bound")]
    SessionNotBound,

    /// The caller cancelled the operation between poll attempts.
    #[error("operation cancelled")]
    Cancelled,
}

impl ErrorCode for DialError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidLocation(_) => "invalid_location",
            Self::ResourceExhausted { .. } => "resource_exhausted",
            Self::Transport(_) => "transport_failure",
            Self::UnexpectedStatus(_) => "unexpected_status",
            Self::ParseFailure(_) => "parse_failure",
            Self::UnsupportedCommand(_) => "unsupported_command",
            Self::BindFailed(_) => "bind_failed",
            Self::TokenUnavailable => "token_unavailable",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::SessionNotBound => "session_not_bound",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Convenient Result alias for DIAL session and cast operations.
pub type DialResult<T> = Result<T, DialError>;
