//! Error types for market data operations

use thiserror::Error;

/// Market data and analysis errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// A credential for an optional provider is not configured.
    ///
    /// Callers treat this as "feature unavailable", never as "retry later".
    #[error("{feature} is not configured; set {env_var} to enable it")]
    NotConfigured {
        feature: &'static str,
        env_var: &'static str,
    },

    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Finnhub API error
    #[error("Finnhub error: {0}")]
    FinnhubError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Generative-AI provider error
    #[error("AI provider error: {0}")]
    LlmError(#[from] poketrade_llm::LLMError),

    /// Prompt template error
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    /// A stage did not settle within its time budget
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: String, secs: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl MarketError {
    /// Whether this error means a provider credential is missing
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;
