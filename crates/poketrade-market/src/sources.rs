//! Source traits the aggregator queries, and the live wiring behind them

use crate::api::{AlphaVantageClient, FinnhubClient, YahooFinanceClient};
use crate::config::MarketConfig;
use crate::error::Result;
use crate::models::{Candle, NewsItem, Quote};
use async_trait::async_trait;
use poketrade_llm::LLMProvider;
use poketrade_llm::providers::{GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider};
use std::sync::Arc;

const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";

/// Provider of current quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest quote for `symbol`
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Provider of OHLCV history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch candles for `symbol` between two epoch-second bounds.
    ///
    /// An empty result is a failure of the source, not an empty answer.
    async fn candles(
        &self,
        symbol: &str,
        resolution: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<Candle>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Provider of news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Company news for `symbol` over the last `days` days
    async fn company_news(&self, symbol: &str, days: u32) -> Result<Vec<NewsItem>>;

    /// General market news
    async fn market_news(&self) -> Result<Vec<NewsItem>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// The set of collaborators a [`MarketService`](crate::MarketService) talks to.
///
/// Quote and candle sources are tried in order. A `None` optional source
/// means its credential is missing.
#[derive(Clone, Default)]
pub struct MarketSources {
    pub quotes: Vec<Arc<dyn QuoteSource>>,
    pub candles: Vec<Arc<dyn CandleSource>>,
    pub news: Option<Arc<dyn NewsSource>>,
    pub commentary: Option<Arc<dyn LLMProvider>>,
    pub ai: Option<Arc<dyn LLMProvider>>,
}

impl std::fmt::Debug for MarketSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketSources")
            .field("quotes", &self.quotes.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("candles", &self.candles.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("news", &self.news.as_ref().map(|s| s.name()))
            .field("commentary", &self.commentary.as_ref().map(|p| p.name()))
            .field("ai", &self.ai.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl MarketSources {
    /// Build the live provider clients that `config` has credentials for
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        let timeout_secs = config.request_timeout.as_secs();
        let mut sources = Self::default();

        let history = config
            .history_api_key
            .as_ref()
            .map(|key| {
                FinnhubClient::new(key.clone(), config.finnhub_rate_limit, config.request_timeout)
                    .map(Arc::new)
            })
            .transpose()?;

        if let Some(finnhub) = &history {
            sources.quotes.push(finnhub.clone());
            sources.candles.push(finnhub.clone());
        }

        if config.quote_fallback_enabled {
            sources.quotes.push(Arc::new(YahooFinanceClient::new()));
        }

        sources.candles.push(Arc::new(AlphaVantageClient::new(
            config.alpha_vantage_api_key.clone(),
            config.alpha_vantage_rate_limit,
            config.request_timeout,
        )?));

        if let Some(key) = &config.news_api_key {
            // one key, one quota: reuse the history client and its limiter
            let news: Arc<dyn NewsSource> = match &history {
                Some(finnhub) if config.history_api_key.as_ref() == Some(key) => finnhub.clone(),
                _ => Arc::new(FinnhubClient::new(
                    key.clone(),
                    config.finnhub_rate_limit,
                    config.request_timeout,
                )?),
            };
            sources.news = Some(news);
        }

        if let Some(key) = &config.commentary_api_key {
            let provider_config = OpenAIConfig::new(key.clone())
                .with_api_base(PERPLEXITY_API_BASE)
                .with_timeout(timeout_secs);
            sources.commentary = Some(Arc::new(OpenAIProvider::with_config(provider_config)?));
        }

        if let Some(key) = &config.ai_api_key {
            let provider_config = GeminiConfig::new(key.clone()).with_timeout(timeout_secs);
            sources.ai = Some(Arc::new(GeminiProvider::with_config(provider_config)?));
        }

        Ok(sources)
    }
}
