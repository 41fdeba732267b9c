// src/error.rs
// Error taxonomy for the session and dispatch layer

use crate::session::DocumentKind;
use thiserror::Error;

/// Main error type for office-mcp
#[derive(Error, Debug)]
pub enum OfficeError {
    /// Engine unreachable, handshake failed, or the link dropped mid-request.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("document type mismatch: session holds a {actual} document, operation requires {expected}")]
    TypeMismatch {
        actual: DocumentKind,
        expected: DocumentKind,
    },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The engine accepted the request but reported a failure.
    #[error("remote operation failed: {0}")]
    RemoteOperation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Result using OfficeError
pub type Result<T> = std::result::Result<T, OfficeError>;

impl OfficeError {
    /// Convert to user-facing string for MCP tool boundaries
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }

    /// Whether the caller supplied bad input (as opposed to an engine or link failure)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OfficeError::SessionNotFound(_)
                | OfficeError::TypeMismatch { .. }
                | OfficeError::InvalidAddress(_)
                | OfficeError::InvalidInput(_)
        )
    }
}

impl From<OfficeError> for String {
    fn from(err: OfficeError) -> Self {
        err.to_string()
    }
}
