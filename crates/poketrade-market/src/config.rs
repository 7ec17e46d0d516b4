//! Configuration for market data and analysis operations

use crate::error::{MarketError, Result};
use poketrade_utils::{env_flag, env_var, mask_secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Environment variable holding the Finnhub token (quotes, candles, news)
pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";
/// Environment variable overriding the Finnhub token used for news only
pub const FINNHUB_NEWS_API_KEY_ENV: &str = "FINNHUB_NEWS_API_KEY";
/// Environment variable holding the Alpha Vantage key
pub const ALPHA_VANTAGE_API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";
/// Environment variable holding the Perplexity key (market commentary)
pub const PERPLEXITY_API_KEY_ENV: &str = "PERPLEXITY_API_KEY";
/// Environment variable holding the Gemini key (insights, chat, translation)
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable enabling the live free quote fallback
pub const QUOTE_FALLBACK_ENV: &str = "POKETRADE_QUOTE_FALLBACK";

const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_COMMENTARY_MODEL: &str = "sonar";
const ALPHA_VANTAGE_DEMO_KEY: &str = "demo";

/// Configuration for the market analysis service
///
/// Every provider credential is optional. A missing credential is a supported
/// state: the matching stage is skipped or replaced by a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Query Yahoo Finance before synthesizing a quote
    pub quote_fallback_enabled: bool,

    /// Finnhub token for quotes and candlestick history
    pub history_api_key: Option<String>,

    /// Finnhub token for company and market news
    pub news_api_key: Option<String>,

    /// Alpha Vantage key for the daily-series history fallback
    pub alpha_vantage_api_key: String,

    /// Perplexity key for market commentary
    pub commentary_api_key: Option<String>,

    /// Gemini key for trading insights, chat, symbol extraction and translation
    pub ai_api_key: Option<String>,

    /// Gemini model name
    pub ai_model: String,

    /// Perplexity model name
    pub commentary_model: String,

    /// Upper bound for any single aggregation stage or fallback attempt
    pub stage_timeout: Duration,

    /// HTTP client timeout
    pub request_timeout: Duration,

    /// Lookback window for the candlestick stage of a comprehensive analysis
    pub history_days: u32,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// How long successful translations stay cached
    pub translation_cache_ttl: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            quote_fallback_enabled: false,
            history_api_key: None,
            news_api_key: None,
            alpha_vantage_api_key: ALPHA_VANTAGE_DEMO_KEY.to_string(),
            commentary_api_key: None,
            ai_api_key: None,
            ai_model: DEFAULT_AI_MODEL.to_string(),
            commentary_model: DEFAULT_COMMENTARY_MODEL.to_string(),
            stage_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            history_days: 7,
            finnhub_rate_limit: 60,
            alpha_vantage_rate_limit: 5,
            translation_cache_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Build a configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_all_keys().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.stage_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 || self.alpha_vantage_rate_limit == 0 {
            return Err(MarketError::ConfigError(
                "rate limits must be greater than 0".to_string(),
            ));
        }

        if self.history_days == 0 {
            return Err(MarketError::ConfigError(
                "history_days must be greater than 0".to_string(),
            ));
        }

        if self.ai_model.trim().is_empty() || self.commentary_model.trim().is_empty() {
            return Err(MarketError::ConfigError(
                "model names must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether Finnhub quotes and candles can be queried
    pub fn has_history_provider(&self) -> bool {
        self.history_api_key.is_some()
    }

    /// Whether news can be fetched
    pub fn has_news_provider(&self) -> bool {
        self.news_api_key.is_some()
    }

    /// Whether market commentary can be fetched
    pub fn has_commentary_provider(&self) -> bool {
        self.commentary_api_key.is_some()
    }

    /// Whether the generative-AI provider is available
    pub fn has_ai_provider(&self) -> bool {
        self.ai_api_key.is_some()
    }

    /// Credential status rows: (provider, masked key or state)
    pub fn credential_status(&self) -> Vec<(&'static str, String)> {
        vec![
            ("finnhub", mask_secret(self.history_api_key.as_deref())),
            ("finnhub-news", mask_secret(self.news_api_key.as_deref())),
            ("alpha-vantage", mask_secret(Some(&self.alpha_vantage_api_key))),
            ("perplexity", mask_secret(self.commentary_api_key.as_deref())),
            ("gemini", mask_secret(self.ai_api_key.as_deref())),
            (
                "yahoo-finance",
                if self.quote_fallback_enabled {
                    "enabled (no key needed)".to_string()
                } else {
                    "disabled".to_string()
                },
            ),
        ]
    }

    /// Log the status of every credential with keys masked
    pub fn log_status(&self) {
        for (provider, status) in self.credential_status() {
            info!(provider, status = %status, "API key status");
        }
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    quote_fallback_enabled: Option<bool>,
    history_api_key: Option<String>,
    news_api_key: Option<String>,
    alpha_vantage_api_key: Option<String>,
    commentary_api_key: Option<String>,
    ai_api_key: Option<String>,
    ai_model: Option<String>,
    commentary_model: Option<String>,
    stage_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    history_days: Option<u32>,
    finnhub_rate_limit: Option<u32>,
    alpha_vantage_rate_limit: Option<u32>,
    translation_cache_ttl: Option<Duration>,
}

impl MarketConfigBuilder {
    /// Enable or disable the live free quote fallback
    pub fn quote_fallback_enabled(mut self, enabled: bool) -> Self {
        self.quote_fallback_enabled = Some(enabled);
        self
    }

    /// Set the Finnhub token for quotes and candles
    pub fn history_api_key(mut self, key: impl Into<String>) -> Self {
        self.history_api_key = Some(key.into());
        self
    }

    /// Set the Finnhub token for news
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the Alpha Vantage key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the Perplexity key
    pub fn commentary_api_key(mut self, key: impl Into<String>) -> Self {
        self.commentary_api_key = Some(key.into());
        self
    }

    /// Set the Gemini key
    pub fn ai_api_key(mut self, key: impl Into<String>) -> Self {
        self.ai_api_key = Some(key.into());
        self
    }

    /// Set the Gemini model
    pub fn ai_model(mut self, model: impl Into<String>) -> Self {
        self.ai_model = Some(model.into());
        self
    }

    /// Set the Perplexity model
    pub fn commentary_model(mut self, model: impl Into<String>) -> Self {
        self.commentary_model = Some(model.into());
        self
    }

    /// Set the per-stage timeout
    pub fn stage_timeout(mut self, duration: Duration) -> Self {
        self.stage_timeout = Some(duration);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the candlestick lookback in days
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the Finnhub rate limit (requests per minute)
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Set the Alpha Vantage rate limit (requests per minute)
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set the translation cache TTL
    pub fn translation_cache_ttl(mut self, ttl: Duration) -> Self {
        self.translation_cache_ttl = Some(ttl);
        self
    }

    /// Load every credential and model override from the environment.
    ///
    /// Values already set on the builder win over the environment.
    pub fn with_env_all_keys(mut self) -> Self {
        let finnhub = env_var(FINNHUB_API_KEY_ENV);

        self.history_api_key = self.history_api_key.or_else(|| finnhub.clone());
        self.news_api_key = self
            .news_api_key
            .or_else(|| env_var(FINNHUB_NEWS_API_KEY_ENV))
            .or(finnhub);
        self.alpha_vantage_api_key = self
            .alpha_vantage_api_key
            .or_else(|| env_var(ALPHA_VANTAGE_API_KEY_ENV));
        self.commentary_api_key = self
            .commentary_api_key
            .or_else(|| env_var(PERPLEXITY_API_KEY_ENV));
        self.ai_api_key = self.ai_api_key.or_else(|| env_var(GEMINI_API_KEY_ENV));
        self.ai_model = self.ai_model.or_else(|| env_var("GEMINI_MODEL"));
        self.commentary_model = self
            .commentary_model
            .or_else(|| env_var("PERPLEXITY_MODEL"));
        self.quote_fallback_enabled = self
            .quote_fallback_enabled
            .or_else(|| env_flag(QUOTE_FALLBACK_ENV));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        // Blank keys behave like missing keys
        let non_blank = |key: Option<String>| key.filter(|k| !k.trim().is_empty());

        let config = MarketConfig {
            quote_fallback_enabled: self
                .quote_fallback_enabled
                .unwrap_or(defaults.quote_fallback_enabled),
            history_api_key: non_blank(self.history_api_key),
            news_api_key: non_blank(self.news_api_key),
            alpha_vantage_api_key: non_blank(self.alpha_vantage_api_key)
                .unwrap_or(defaults.alpha_vantage_api_key),
            commentary_api_key: non_blank(self.commentary_api_key),
            ai_api_key: non_blank(self.ai_api_key),
            ai_model: self.ai_model.unwrap_or(defaults.ai_model),
            commentary_model: self.commentary_model.unwrap_or(defaults.commentary_model),
            stage_timeout: self.stage_timeout.unwrap_or(defaults.stage_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            finnhub_rate_limit: self
                .finnhub_rate_limit
                .unwrap_or(defaults.finnhub_rate_limit),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            translation_cache_ttl: self
                .translation_cache_ttl
                .unwrap_or(defaults.translation_cache_ttl),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert!(!config.quote_fallback_enabled);
        assert!(!config.has_history_provider());
        assert!(!config.has_news_provider());
        assert!(!config.has_commentary_provider());
        assert!(!config.has_ai_provider());
        assert_eq!(config.alpha_vantage_api_key, "demo");
        assert_eq!(config.stage_timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MarketConfig::builder()
            .history_api_key("finnhub-key")
            .ai_api_key("gemini-key")
            .stage_timeout(Duration::from_secs(3))
            .history_days(14)
            .build()
            .unwrap();

        assert!(config.has_history_provider());
        assert!(config.has_ai_provider());
        assert!(!config.has_news_provider());
        assert_eq!(config.stage_timeout, Duration::from_secs(3));
        assert_eq!(config.history_days, 14);
    }

    #[test]
    fn test_blank_keys_are_absent() {
        let config = MarketConfig::builder()
            .news_api_key("   ")
            .alpha_vantage_api_key("")
            .build()
            .unwrap();

        assert!(!config.has_news_provider());
        assert_eq!(config.alpha_vantage_api_key, "demo");
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        assert!(
            MarketConfig::builder()
                .stage_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(MarketConfig::builder().finnhub_rate_limit(0).build().is_err());
        assert!(MarketConfig::builder().history_days(0).build().is_err());
        assert!(MarketConfig::builder().ai_model(" ").build().is_err());
    }

    #[test]
    fn test_credential_status_masks_keys() {
        let config = MarketConfig::builder()
            .history_api_key("ct8sa39r01qpc9s0")
            .build()
            .unwrap();

        let status = config.credential_status();
        let finnhub = status.iter().find(|(p, _)| *p == "finnhub").unwrap();
        assert_eq!(finnhub.1, "ct8sa39r...");

        let gemini = status.iter().find(|(p, _)| *p == "gemini").unwrap();
        assert_eq!(gemini.1, "NOT SET");
    }
}
