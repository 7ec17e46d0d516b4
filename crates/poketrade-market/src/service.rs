//! The market analysis aggregator
//!
//! [`MarketService`] fans one symbol out to the quote, candle, news,
//! commentary and AI sources and folds the answers into a
//! [`ComprehensiveAnalysis`]. Quote and candle stages fall back through their
//! providers and end in synthesis, so they never fail. The optional stages
//! (news, commentary, insight) are isolated: a missing credential or a failure
//! becomes an empty list or a placeholder.

use crate::config::{
    FINNHUB_API_KEY_ENV, GEMINI_API_KEY_ENV, MarketConfig, PERPLEXITY_API_KEY_ENV,
};
use crate::error::{MarketError, Result};
use crate::fallback::FallbackChain;
use crate::insight::parse_insight_from_text;
use crate::models::{
    Candle, ComprehensiveAnalysis, NewsItem, Quote, TradingInsight, line_series,
};
use crate::prompts::{CHAT, MARKET_COMMENTARY, SYMBOL_COMMENTARY_QUERY, TRADING_INSIGHT};
use crate::sources::MarketSources;
use crate::synthesis::{synthesize_candles, synthesize_quote};
use chrono::Utc;
use poketrade_llm::{CompletionRequest, LLMProvider};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Most candles any series returned by the service holds
pub const MAX_CANDLES: usize = 30;
/// Most news items any list returned by the service holds
pub const MAX_NEWS_ITEMS: usize = 10;
/// Days of company news requested
pub const NEWS_LOOKBACK_DAYS: u32 = 7;
/// Candle resolution used by the comprehensive analysis
pub const ANALYSIS_RESOLUTION: &str = "D";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Commentary text when no commentary credential exists
pub const COMMENTARY_DISABLED: &str = "⚠️ Market commentary is not configured. Set PERPLEXITY_API_KEY for real-time market insights.";
/// Commentary text when the commentary provider failed
pub const COMMENTARY_FAILED: &str = "⚠️ Market commentary is unavailable right now. Check the PERPLEXITY_API_KEY configuration.";
const COMMENTARY_EMPTY: &str = "No insights available";

const INSIGHT_DISABLED_ANALYSIS: &str =
    "⚠️ AI analysis is not configured. Set GEMINI_API_KEY for AI trading insights.";
const INSIGHT_DISABLED_REASONING: &str = "AI analysis requires a GEMINI_API_KEY.";
const INSIGHT_FAILED_ANALYSIS: &str =
    "⚠️ AI analysis failed. Check the GEMINI_API_KEY configuration.";
const INSIGHT_FAILED_REASONING: &str =
    "AI analysis unavailable; configure the AI provider for detailed insights.";

/// Chat answer when no AI credential exists
pub const CHAT_NOT_CONFIGURED: &str = "🤖 **AI Assistant Not Configured**

To enable conversational answers, set your Gemini API key:

```
GEMINI_API_KEY=your_gemini_key
```

💡 **Meanwhile, ask about a specific stock** (e.g. \"NVDA\", \"Tesla\", \"Apple\") for a market analysis.";

const INSIGHT_MAX_TOKENS: usize = 1024;
const COMMENTARY_MAX_TOKENS: usize = 400;
const COMMENTARY_TEMPERATURE: f32 = 0.1;
const CHAT_MAX_TOKENS: usize = 1024;

/// Trim and upper-case a ticker; empty input is rejected
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(MarketError::InvalidSymbol(
            "symbol must not be empty".to_string(),
        ));
    }
    Ok(symbol)
}

/// Market data aggregator over a fixed set of sources
#[derive(Debug, Clone)]
pub struct MarketService {
    config: MarketConfig,
    sources: MarketSources,
}

impl MarketService {
    /// Build a service with live provider clients for every configured credential
    pub fn new(config: MarketConfig) -> Result<Self> {
        config.validate()?;
        let sources = MarketSources::from_config(&config)?;
        config.log_status();
        Ok(Self { config, sources })
    }

    /// Build a service from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(MarketConfig::from_env()?)
    }

    /// Build a service over injected sources
    pub fn with_sources(config: MarketConfig, sources: MarketSources) -> Self {
        Self { config, sources }
    }

    /// Service configuration
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// The generative-AI provider, when configured
    pub fn ai_provider(&self) -> Option<&Arc<dyn LLMProvider>> {
        self.sources.ai.as_ref()
    }

    async fn within_stage<T, F>(&self, stage: &'static str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.config.stage_timeout, future)
            .await
            .map_err(|_| MarketError::Timeout {
                stage: stage.to_string(),
                secs: self.config.stage_timeout.as_secs(),
            })?
    }

    /// Current quote for `symbol`. Never fails: the last resort is synthesis.
    #[instrument(skip(self))]
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        let mut chain = FallbackChain::new("quote", self.config.stage_timeout);
        for source in &self.sources.quotes {
            chain = chain.attempt(source.name(), source.quote(symbol));
        }

        chain
            .run_or_else(|| {
                info!(symbol, "Using synthesized quote");
                synthesize_quote(symbol, &mut rand::thread_rng())
            })
            .await
    }

    /// Candles for `symbol` between two epoch-second bounds.
    ///
    /// Never fails: the last resort is a synthesized daily series. The result
    /// holds at most [`MAX_CANDLES`] points, the most recent ones.
    #[instrument(skip(self))]
    pub async fn get_candlestick_series(
        &self,
        symbol: &str,
        resolution: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Vec<Candle> {
        if to_secs <= from_secs {
            debug!(from_secs, to_secs, "Empty candle range");
            return Vec::new();
        }

        let mut chain = FallbackChain::new("candles", self.config.stage_timeout);
        for source in &self.sources.candles {
            chain = chain.attempt(source.name(), async move {
                let candles = source.candles(symbol, resolution, from_secs, to_secs).await?;
                if candles.is_empty() {
                    return Err(MarketError::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: format!("{} returned an empty series", source.name()),
                    });
                }
                Ok(candles)
            });
        }

        let mut candles = chain
            .run_or_else(|| {
                info!(symbol, "Using synthesized candles");
                synthesize_candles(symbol, from_secs, to_secs, &mut rand::thread_rng())
            })
            .await;

        if candles.len() > MAX_CANDLES {
            candles.drain(..candles.len() - MAX_CANDLES);
        }
        candles
    }

    /// Company news for `symbol`, or general market news without one.
    ///
    /// Fails with [`MarketError::NotConfigured`] when no news credential exists.
    #[instrument(skip(self))]
    pub async fn get_market_news(&self, symbol: Option<&str>) -> Result<Vec<NewsItem>> {
        let source = self.sources.news.as_ref().ok_or(MarketError::NotConfigured {
            feature: "market news",
            env_var: FINNHUB_API_KEY_ENV,
        })?;

        let mut news = match symbol {
            Some(symbol) => source.company_news(symbol, NEWS_LOOKBACK_DAYS).await?,
            None => source.market_news().await?,
        };

        if news.is_empty() {
            warn!(symbol = symbol.unwrap_or("market"), "No news articles found");
        }
        news.truncate(MAX_NEWS_ITEMS);
        info!(count = news.len(), "News received");
        Ok(news)
    }

    /// Free-text market commentary for `query`.
    ///
    /// Without a commentary credential this resolves to a fixed notice.
    #[instrument(skip(self))]
    pub async fn get_market_commentary(&self, query: &str) -> Result<String> {
        let Some(provider) = &self.sources.commentary else {
            warn!("Commentary provider not configured");
            return Ok(COMMENTARY_DISABLED.to_string());
        };

        let request = CompletionRequest::builder(&self.config.commentary_model)
            .prompt(MARKET_COMMENTARY.render(json!({ "query": query }))?)
            .max_tokens(COMMENTARY_MAX_TOKENS)
            .temperature(COMMENTARY_TEMPERATURE)
            .build();

        let response = provider.complete(request).await?;
        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Ok(COMMENTARY_EMPTY.to_string());
        }
        Ok(text)
    }

    /// Ask the AI provider for a trading view on `symbol`.
    ///
    /// Fails with [`MarketError::NotConfigured`] when no AI credential exists.
    #[instrument(skip(self, quote, news), fields(news = news.len()))]
    pub async fn generate_trading_insight(
        &self,
        symbol: &str,
        quote: &Quote,
        news: &[NewsItem],
    ) -> Result<TradingInsight> {
        let provider = self.sources.ai.as_ref().ok_or(MarketError::NotConfigured {
            feature: "AI trading insight",
            env_var: GEMINI_API_KEY_ENV,
        })?;

        let prompt = TRADING_INSIGHT.render(json!({
            "symbol": symbol,
            "quote_json": serde_json::to_string_pretty(quote)?,
            "price": quote.price,
            "news": news,
        }))?;

        let request = CompletionRequest::builder(&self.config.ai_model)
            .prompt(prompt)
            .max_tokens(INSIGHT_MAX_TOKENS)
            .build();

        let analysis = provider.complete(request).await?.into_text()?;
        let parsed = parse_insight_from_text(&analysis, quote.price);
        info!(symbol, recommendation = %parsed.recommendation, "AI insight generated");

        Ok(TradingInsight {
            symbol: symbol.to_string(),
            recommendation: parsed.recommendation,
            confidence: parsed.confidence,
            price_target: parsed.price_target,
            reasoning: analysis.clone(),
            analysis,
        })
    }

    /// Assemble everything known about `symbol`.
    ///
    /// The only error is an empty symbol. Quote, candles, news and commentary
    /// are gathered concurrently; the insight follows once quote and news are in.
    #[instrument(skip(self))]
    pub async fn get_comprehensive_analysis(&self, symbol: &str) -> Result<ComprehensiveAnalysis> {
        let symbol = normalize_symbol(symbol)?;
        info!(symbol = %symbol, "Starting comprehensive analysis");

        let to = Utc::now().timestamp();
        let from = to - i64::from(self.config.history_days) * SECONDS_PER_DAY;

        let (quote, candles, news, commentary) = tokio::join!(
            self.get_quote(&symbol),
            self.get_candlestick_series(&symbol, ANALYSIS_RESOLUTION, from, to),
            self.news_stage(&symbol),
            self.commentary_stage(&symbol),
        );
        info!(
            candles = candles.len(),
            news = news.len(),
            "Market data stages settled"
        );

        let insight = self.insight_stage(&symbol, &quote, &news).await;
        let line = line_series(&candles, &quote);

        info!(symbol = %symbol, "Comprehensive analysis complete");
        Ok(ComprehensiveAnalysis {
            quote,
            candles,
            line,
            news,
            commentary,
            insight,
        })
    }

    async fn news_stage(&self, symbol: &str) -> Vec<NewsItem> {
        if self.sources.news.is_none() {
            info!("News provider not configured, skipping news");
            return Vec::new();
        }

        match self
            .within_stage("news", self.get_market_news(Some(symbol)))
            .await
        {
            Ok(news) => news,
            Err(e) => {
                warn!(error = %e, "News stage failed");
                Vec::new()
            }
        }
    }

    async fn commentary_stage(&self, symbol: &str) -> String {
        if self.sources.commentary.is_none() {
            return COMMENTARY_DISABLED.to_string();
        }

        let query = match SYMBOL_COMMENTARY_QUERY.render(json!({ "symbol": symbol })) {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "Commentary query could not be rendered");
                return COMMENTARY_FAILED.to_string();
            }
        };

        match self
            .within_stage("commentary", self.get_market_commentary(&query))
            .await
        {
            Ok(commentary) => commentary,
            Err(e) => {
                warn!(error = %e, env_var = PERPLEXITY_API_KEY_ENV, "Commentary stage failed");
                COMMENTARY_FAILED.to_string()
            }
        }
    }

    async fn insight_stage(&self, symbol: &str, quote: &Quote, news: &[NewsItem]) -> TradingInsight {
        if self.sources.ai.is_none() {
            info!("AI provider not configured, using placeholder insight");
            return TradingInsight::placeholder(
                symbol,
                quote.price,
                INSIGHT_DISABLED_ANALYSIS,
                INSIGHT_DISABLED_REASONING,
            );
        }

        match self
            .within_stage("insight", self.generate_trading_insight(symbol, quote, news))
            .await
        {
            Ok(insight) => insight,
            Err(e) => {
                warn!(error = %e, "Insight stage failed");
                TradingInsight::placeholder(
                    symbol,
                    quote.price,
                    INSIGHT_FAILED_ANALYSIS,
                    INSIGHT_FAILED_REASONING,
                )
            }
        }
    }

    /// General finance conversation. Always resolves to displayable text.
    #[instrument(skip(self))]
    pub async fn get_chat_response(&self, query: &str) -> String {
        let Some(provider) = &self.sources.ai else {
            return CHAT_NOT_CONFIGURED.to_string();
        };

        let answer = async {
            let request = CompletionRequest::builder(&self.config.ai_model)
                .prompt(CHAT.render(json!({ "query": query }))?)
                .max_tokens(CHAT_MAX_TOKENS)
                .build();
            let text = provider.complete(request).await?.into_text()?;
            Ok::<_, MarketError>(text)
        };

        match self.within_stage("chat", answer).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Chat response failed");
                format!(
                    "❌ **AI Response Error**\n\nUnable to generate a response: {e}\n\n\
                     💡 **Try asking about a specific stock** for a market analysis."
                )
            }
        }
    }
}
