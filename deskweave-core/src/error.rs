//! Typed error types shared by the Facade and every backend adapter.
//!
//! Callers can match on [`ContainerError`] variants to distinguish between an
//! operation issued too early, a missing lookup target, a capability the
//! backend lacks, and a failure inside the backend driver itself.

use serde_json::Value;
use thiserror::Error;

use crate::layout::LayoutError;

/// Result type alias using [`ContainerError`].
pub type Result<T> = std::result::Result<T, ContainerError>;

/// A failure reported by (or while translating data from) a backend driver.
///
/// The native message is kept verbatim. When the failure came from a payload
/// the adapter could not translate, the payload is attached for diagnosis.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct BackendError {
    /// Message reported by the driver, not reinterpreted.
    pub message: String,
    /// Offending backend payload, when there is one.
    pub payload: Option<Value>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(message: impl Into<String>, payload: Value) -> Self {
        Self {
            message: message.into(),
            payload: Some(payload),
        }
    }
}

/// Top-level error type for container operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The operation was attempted before the backend connection was ready
    /// (or after the container started closing).
    #[error("container not ready: '{operation}' requires a connected backend (state: {state})")]
    NotReady {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Container state at the time of the call.
        state: String,
    },

    /// A lookup or unsubscribe target does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The capability is not implemented by this backend.
    #[error("'{capability}' is not supported by the {backend} backend")]
    Unsupported {
        /// Host type of the backend, e.g. "Glue42".
        backend: &'static str,
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// The underlying driver call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A layout handed to the container is structurally invalid.
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    /// The layout store could not be read or written.
    #[error("layout storage error: {0}")]
    Storage(String),
}

impl ContainerError {
    pub fn not_ready(operation: &'static str, state: impl ToString) -> Self {
        Self::NotReady {
            operation,
            state: state.to_string(),
        }
    }

    pub fn unsupported(backend: &'static str, capability: &'static str) -> Self {
        Self::Unsupported {
            backend,
            capability,
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Payload attached to a backend translation failure, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Backend(err) => err.payload.as_ref(),
            _ => None,
        }
    }
}
