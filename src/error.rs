//! Medhanit error types

/// Medhanit error types
#[derive(Debug, thiserror::Error)]
pub enum MedhanitError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),

    // Persistence errors
    #[error("storage error: {0}")]
    Store(String),
}

/// Result type alias for Medhanit operations
pub type Result<T> = std::result::Result<T, MedhanitError>;
