//! Error types for model operations

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during model operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Response was blocked by the provider's safety filters
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Map a non-success HTTP status to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String, model: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            LLMError::from_status(StatusCode::UNAUTHORIZED, String::new(), "m"),
            LLMError::AuthenticationFailed
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::FORBIDDEN, String::new(), "m"),
            LLMError::AuthenticationFailed
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::NOT_FOUND, String::new(), "gemini-x"),
            LLMError::ModelNotFound(m) if m == "gemini-x"
        ));

        let err = LLMError::from_status(StatusCode::BAD_GATEWAY, "upstream".to_string(), "m");
        assert_eq!(err.to_string(), "API request failed: HTTP 502 Bad Gateway: upstream");
    }
}
