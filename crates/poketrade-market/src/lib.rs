//! Market analysis aggregator for poketrade
//!
//! This crate assembles a complete picture of a stock from several
//! independent providers:
//!
//! - Quotes from Finnhub, Yahoo Finance (opt-in) or Alpha Vantage
//! - Daily candles from Finnhub or Alpha Vantage
//! - Company and market news from Finnhub with keyword sentiment
//! - Market commentary from Perplexity
//! - Trading insights from Gemini
//!
//! Every provider is optional. Each stage walks its sources in order and
//! falls back to the next one on failure; quotes and candles finally fall
//! back to synthesized data, so an analysis always has a price.
//!
//! On top of the service sits [`TradingAssistant`], which detects the
//! ticker a chat message refers to, renders a markdown report and
//! translates the result into Hindi or Telugu.
//!
//! # Example
//!
//! ```rust,ignore
//! use poketrade_market::{Language, MarketService, TradingAssistant};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = MarketService::from_env()?;
//!
//!     let analysis = service.get_comprehensive_analysis("NVDA").await?;
//!     println!("{} @ {:.2}", analysis.quote.symbol, analysis.quote.price);
//!
//!     let assistant = TradingAssistant::new(service);
//!     let reply = assistant.respond("how is tesla doing?", Language::Hi).await?;
//!     println!("{}", reply.text());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod insight;
pub mod models;
pub mod prompts;
pub mod report;
pub mod sentiment;
pub mod service;
pub mod sources;
pub mod synthesis;
pub mod translate;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use assistant::{TradingAssistant, match_symbol};
pub use config::{MarketConfig, MarketConfigBuilder};
pub use error::{MarketError, Result};
pub use fallback::FallbackChain;
pub use insight::{ParsedInsight, parse_insight_from_text};
pub use models::{
    AssistantReply, Candle, ComprehensiveAnalysis, Language, LinePoint, NewsItem,
    Quote, Recommendation, Sentiment, TradingInsight,
};
pub use report::{ReportText, render_analysis};
pub use sentiment::analyze_sentiment;
pub use service::MarketService;
pub use sources::{CandleSource, MarketSources, NewsSource, QuoteSource};
pub use translate::Translator;
