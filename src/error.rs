//! Error types for the Attache gateway

use thiserror::Error;

/// Result type alias for Attache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Attache gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Reasoning endpoint error
    #[error("reasoning error: {0}")]
    Reasoning(String),

    /// Task automation error
    #[error("automation error: {0}")]
    Automation(String),

    /// Invalid intent state transition
    #[error("intent error: {0}")]
    Intent(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
