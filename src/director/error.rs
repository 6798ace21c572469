//! Routing decision errors.
//!
//! Every error maps onto the gRPC status the proxy engine surfaces to the
//! inbound caller.

use std::time::Duration;

use thiserror::Error;
use tonic::{Code, Status};

/// Why a call was not forwarded.
///
/// `Clone` so a failed dial can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectorError {
    /// The inbound call carried no metadata set.
    #[error("metadata unavailable")]
    MetadataUnavailable,

    /// The method is not in the route table.
    #[error("unknown method {method}")]
    UnrecognizedMethod { method: String },

    /// The backend could not be dialed.
    #[error("backend {target} unavailable: {reason}")]
    Dial { target: String, reason: String },

    /// The dial did not complete within the connect timeout.
    #[error("backend {target} did not connect within {timeout:?}")]
    DialTimeout { target: String, timeout: Duration },

    /// Dialing was given up after repeated failures.
    #[error("backend {target} unavailable after {attempts} failed dials: {reason}")]
    RetryExhausted {
        target: String,
        attempts: u32,
        reason: String,
    },

    /// The inbound call was cancelled while waiting for the backend.
    #[error("call cancelled before the backend connection was ready")]
    Cancelled,
}

impl DirectorError {
    /// The gRPC status code reported for this error.
    pub fn code(&self) -> Code {
        match self {
            DirectorError::MetadataUnavailable => Code::Internal,
            DirectorError::UnrecognizedMethod { .. } => Code::Unimplemented,
            DirectorError::Dial { .. }
            | DirectorError::DialTimeout { .. }
            | DirectorError::RetryExhausted { .. } => Code::Unavailable,
            DirectorError::Cancelled => Code::Cancelled,
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            DirectorError::MetadataUnavailable => "metadata_unavailable",
            DirectorError::UnrecognizedMethod { .. } => "unimplemented",
            DirectorError::Dial { .. } => "dial_failed",
            DirectorError::DialTimeout { .. } => "dial_timeout",
            DirectorError::RetryExhausted { .. } => "retry_exhausted",
            DirectorError::Cancelled => "cancelled",
        }
    }
}

impl From<DirectorError> for Status {
    fn from(err: DirectorError) -> Self {
        Status::new(err.code(), err.to_string())
    }
}
