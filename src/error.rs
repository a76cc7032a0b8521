//! Custom error types for the order streaming service
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Top-level service errors
#[derive(Error, Debug)]
pub enum OrdercastError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preference store error: {0}")]
    Preference(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Push-connection errors. Connection and transport failures are recorded
/// on the state machine as plain close reasons and feed the retry policy;
/// only frame-level faults surface as typed errors, dropped at the
/// dispatcher boundary with a diagnostic.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Malformed frame: {0}")]
    Protocol(String),
}
