use std::time::Duration;

use thiserror::Error;

/// Errors raised by the actor invocation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    /// Referenced type name was never registered
    #[error("type `{0}` is not registered")]
    UnknownType(String),

    /// A type with the same unique name is already registered
    #[error("type `{0}` is already registered")]
    DuplicateType(String),

    /// Method resolution against a type descriptor failed
    #[error("method `{method}` not found on type `{type_name}`")]
    MethodNotFound { type_name: String, method: String },

    /// The cluster rejected an actor creation request
    #[error("failed to create actor of type `{type_name}`: {reason}")]
    ActorCreationFailed { type_name: String, reason: String },

    /// The cluster rejected a task before it was dispatched
    #[error("failed to submit `{method}` to actor {actor_id}: {reason}")]
    TaskSubmissionFailed { actor_id: String, method: String, reason: String },

    /// The task ran remotely but raised an application error
    #[error("remote execution of `{method}` failed: {message}")]
    RemoteExecutionFailed { method: String, message: String },

    /// The cluster directory service could not be reached
    #[error("failed to connect to cluster at {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    /// Session metadata could not be obtained during bootstrap
    #[error("session metadata unavailable: {0}")]
    SessionUnavailable(String),

    /// A typed accessor disagrees with the recorded type tag
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    /// Invalid configuration or address
    #[error("{0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("{0}")]
    Serialization(String),

    /// The object store freed the value before it was fetched
    #[error("object {0} was evicted from the object store")]
    ObjectEvicted(String),

    /// Object store errors
    #[error("{0}")]
    Store(String),

    /// A local wait exceeded its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A local wait was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled
}

impl InvokeError {
    /// True for errors detected locally, before any I/O
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            InvokeError::UnknownType(_)
                | InvokeError::DuplicateType(_)
                | InvokeError::MethodNotFound { .. }
                | InvokeError::TypeMismatch { .. }
        )
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for InvokeError {
    fn from(err: serde_json::Error) -> Self {
        InvokeError::Serialization(err.to_string())
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for InvokeError {
    fn from(err: serde_yaml::Error) -> Self {
        InvokeError::Configuration(err.to_string())
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for InvokeError {
    fn from(err: std::io::Error) -> Self {
        InvokeError::Configuration(err.to_string())
    }
}
