//! Error types for the risk model crate

use thiserror::Error;

/// Errors raised while loading, validating or persisting a pipeline
#[derive(Error, Debug)]
pub enum ModelError {
    /// No artifact exists at the given path
    #[error("model artifact not found: {path}")]
    NotFound { path: String },

    /// The artifact exists but cannot be decoded or fails validation
    #[error("model artifact {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    /// Writing the artifact failed
    #[error("failed to persist model artifact to {path}: {reason}")]
    Persist { path: String, reason: String },

    /// The artifact was trained against a different encoding schema
    #[error("encoding schema mismatch: artifact has {artifact}, runtime expects {runtime}")]
    SchemaMismatch { artifact: String, runtime: String },

    /// Pipeline structure is unusable
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
