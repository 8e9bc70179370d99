//! Error types for schema bundle generation

use thiserror::Error;

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema bundle errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to decode {phase}: {source}")]
    Decode {
        phase: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("No schema records found")]
    NoSchemasFound,

    #[error("Invalid {kind} definition schema: {reason}")]
    InvalidDefinition { kind: String, reason: String },

    #[error("Drift detected in {count} file(s)")]
    Drift { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Wrap a serde error with the decode phase it happened in
    pub fn decode(phase: &'static str, source: serde_json::Error) -> Self {
        SchemaError::Decode { phase, source }
    }
}
