//! Error types for the Key Administrator client.
//!
//! Business outcomes reported by the gateway (authorization failures,
//! validation errors, transport faults) are never errors here: they come back
//! as a [`Response`](crate::response::Response) with a non-1xx code. This
//! type covers what a caller cannot recover from by inspecting a response:
//! misuse of the operation registry and broken setup.

use thiserror::Error;

use crate::operation::Operation;

/// Errors raised by the client itself, never by the remote service.
#[derive(Debug, Error)]
pub enum KeyAdminError {
    /// The operation name does not exist in the registry.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// The operation exists but is not implemented by the gateway client.
    #[error("operation '{0}' is not supported")]
    Unsupported(Operation),

    /// The arguments do not match the operation's argument shape.
    #[error("invalid arguments for '{operation}': {reason}")]
    InvalidArguments {
        operation: Operation,
        reason: String,
    },

    /// A typed facade received a different outcome than its descriptor declares.
    #[error("unexpected outcome: expected {expected}, got {found}")]
    UnexpectedOutcome {
        expected: &'static str,
        found: &'static str,
    },

    /// Configuration sources could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client backing the transport could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Convenience alias used throughout the crate.
pub type KeyAdminResult<T> = Result<T, KeyAdminError>;
