//! Unified error types for Meridian

use thiserror::Error;

/// Unified error type for all Meridian operations
#[derive(Error, Debug)]
pub enum MeridianError {
    // Ledger errors
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    // Workflow step errors (fatal to the enclosing workflow call)
    #[error("Peer review failed: {0}")]
    ReviewFailed(String),

    #[error("Dataset curation failed: {0}")]
    CurationFailed(String),

    // Recoverable: logged and swallowed by the coordinator
    #[error("Proposal creation failed: {0}")]
    ProposalFailed(String),

    // Fatal at process startup only
    #[error("Health check failed: {0}")]
    HealthCheck(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // External API errors
    #[error("API error: {0}")]
    Api(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using MeridianError
pub type Result<T> = std::result::Result<T, MeridianError>;
