//! Market data model shared by the service, assistant and report renderer

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snapshot of a security's current price and daily statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Absolute change against the previous close
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    pub volume: u64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// One OHLCV interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// Whether high and low bound both open and close
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Closing-price point used for line charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub price: f64,
}

impl From<&Candle> for LinePoint {
    fn from(candle: &Candle) -> Self {
        Self {
            timestamp: candle.timestamp,
            price: candle.close,
        }
    }
}

/// Keyword-derived tone of a news item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

/// A news article with its sentiment label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    /// Publication time in epoch milliseconds
    #[serde(rename = "datetime")]
    pub published_at: i64,
    pub sentiment: Sentiment,
}

/// Trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        };
        f.write_str(label)
    }
}

/// AI-derived recommendation for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingInsight {
    pub symbol: String,
    pub analysis: String,
    pub recommendation: Recommendation,
    /// 0 to 100
    pub confidence: u8,
    pub price_target: f64,
    pub reasoning: String,
}

impl TradingInsight {
    /// HOLD insight with zero confidence, used when no model answer exists
    pub fn placeholder(
        symbol: impl Into<String>,
        price: f64,
        analysis: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            analysis: analysis.into(),
            recommendation: Recommendation::Hold,
            confidence: 0,
            price_target: price,
            reasoning: reasoning.into(),
        }
    }
}

/// Everything known about one symbol, assembled for a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub quote: Quote,
    #[serde(rename = "candlestickData")]
    pub candles: Vec<Candle>,
    #[serde(rename = "lineData")]
    pub line: Vec<LinePoint>,
    pub news: Vec<NewsItem>,
    #[serde(rename = "perplexityInsights")]
    pub commentary: String,
    #[serde(rename = "tradingInsights")]
    pub insight: TradingInsight,
}

/// Build the line series for an analysis.
///
/// Uses candle closes when any exist, otherwise a two-point line from the
/// previous close one day ago to the current price.
pub fn line_series(candles: &[Candle], quote: &Quote) -> Vec<LinePoint> {
    if candles.is_empty() {
        let now = Utc::now().timestamp_millis();
        return vec![
            LinePoint {
                timestamp: now - DAY_MILLIS,
                price: quote.previous_close,
            },
            LinePoint {
                timestamp: now,
                price: quote.price,
            },
        ];
    }

    candles.iter().map(LinePoint::from).collect()
}

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Supported answer languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Te,
}

impl Language {
    /// Short language code
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Te => "te",
        }
    }

    /// English name of the language, as used in translation prompts
    pub fn name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Te => "Telugu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "hi" | "hindi" => Ok(Self::Hi),
            "te" | "telugu" => Ok(Self::Te),
            other => Err(format!("unsupported language '{other}' (expected en, hi or te)")),
        }
    }
}

/// Answer produced by the trading assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssistantReply {
    /// A ticker was recognized and analyzed
    Analysis {
        symbol: String,
        analysis: Box<ComprehensiveAnalysis>,
        text: String,
    },
    /// General finance conversation
    Chat { text: String },
}

impl AssistantReply {
    /// Rendered answer text
    pub fn text(&self) -> &str {
        match self {
            Self::Analysis { text, .. } | Self::Chat { text } => text,
        }
    }
}
