//! Error types for signflow.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignflowError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Input errors
    #[error("No usable sign language features detected in input")]
    EmptyInput,

    #[error("Video decode failed: {message}")]
    Decode { message: String },

    // Model errors
    #[error("Model capability not registered: {capability}")]
    CapabilityMissing { capability: String },

    #[error("Model registry lifecycle violation: {message}")]
    Registry { message: String },

    #[error("Model invocation failed in {capability}: {message}")]
    ModelInvocation { capability: String, message: String },

    // Extraction faults are recovered inside the extractor and never
    // surfaced to callers; the variant exists so detectors can report them.
    #[error("Detector fault: {message}")]
    Extraction { message: String },

    // Persistence failures are logged by orchestrators and discarded
    #[error("Record store rejected {record_kind}: {message}")]
    Persistence { record_kind: String, message: String },

    // Session errors
    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SignflowError>;
