//! Error types for policy and configuration decoding

use thiserror::Error;

/// Errors produced while decoding documents or loading files.
///
/// Accessors on a decoded [`PolicyStatement`](crate::policy::PolicyStatement)
/// never return these; a missing value is `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// Input did not match the expected structure
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Strict decoding rejected fields it does not know about
    #[error("Unknown fields in {origin}: {}", fields.join(", "))]
    UnknownFields { origin: String, fields: Vec<String> },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Function configuration failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A payload in an invocation stream was not valid JSON
    #[error("Failed to decode payload as JSON: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("Invalid function file: {0}")]
    InvalidFunctionFile(String),
}

pub type Result<T> = std::result::Result<T, Error>;
