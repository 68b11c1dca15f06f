//! Generation-service error handling.

use thiserror::Error;

/// Gemini API specific errors.
#[derive(Error, Debug)]
pub enum AiError {
    /// API key not found in environment variables or settings.
    #[error("Gemini API key not found. Set the GEMINI_API_KEY environment variable")]
    ApiKeyNotFound,

    /// Gemini API request failed with error message.
    #[error("Gemini API request failed: {0}")]
    RequestFailed(String),

    /// Invalid response format from the Gemini API.
    #[error("Invalid response format from Gemini API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    Network(String),
}

// Note: anyhow already has a blanket impl for thiserror::Error types
