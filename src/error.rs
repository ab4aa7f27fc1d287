//! Error types and handling for the KoboldAI client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the KoboldAI client
///
/// Nothing is recovered internally; every failure propagates to the caller
/// as one of the three kinds below so the caller can decide on retry or
/// fallback policy.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors, surfaced before any request is attempted
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP round trip could not be completed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not hold the expected envelope
    #[error("Response format error: {0}")]
    ResponseFormat(#[from] ResponseFormatError),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration field: {field}")]
    UnknownField { field: String },

    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Configuration must be a JSON object")]
    InvalidFormat,
}

/// Errors completing the HTTP round trip
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
}

/// Errors extracting the completion from the response body
#[derive(Error, Debug)]
pub enum ResponseFormatError {
    #[error("Invalid response body: {message}")]
    InvalidJson { message: String },

    #[error("Response contained no results")]
    EmptyResults,
}
