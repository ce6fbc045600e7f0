//! Error types for kikitori.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KikitoriError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio decoding/encoding errors
    #[error("Failed to decode audio file: {message}")]
    Decode { message: String },

    #[error("Failed to encode audio clip: {message}")]
    Encode { message: String },

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Recognition service errors
    #[error("Recognition service unavailable: {detail}")]
    ServiceUnavailable { detail: String },

    // Transcript export errors
    #[error("Failed to write transcript to {path}: {message}")]
    Export { path: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, KikitoriError>;
