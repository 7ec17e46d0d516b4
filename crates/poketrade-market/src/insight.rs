//! Heuristic extraction of structured fields from free-form model analysis

use crate::models::Recommendation;
use regex::Regex;
use std::sync::LazyLock;

/// Confidence used when the text carries no percentage
pub const DEFAULT_CONFIDENCE: u8 = 75;

/// Price target multiplier used when the text carries no dollar amount
pub const DEFAULT_TARGET_MULTIPLIER: f64 = 1.05;

static PERCENT_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+)%").ok());
static DOLLAR_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$(\d+(?:\.\d+)?)").ok());

/// Fields recovered from a model's analysis text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedInsight {
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub price_target: f64,
}

/// Parse a recommendation, confidence and price target out of `text`.
///
/// - recommendation: BUY when the text mentions BUY or BULLISH, else SELL when
///   it mentions SELL or BEARISH, else HOLD
/// - confidence: the first `NN%` in the text, clamped to 100, else 75
/// - price target: the first `$NN` or `$NN.NN`, else `current_price * 1.05`
pub fn parse_insight_from_text(text: &str, current_price: f64) -> ParsedInsight {
    ParsedInsight {
        recommendation: extract_recommendation(text),
        confidence: extract_confidence(text),
        price_target: extract_price_target(text, current_price),
    }
}

fn extract_recommendation(text: &str) -> Recommendation {
    let upper = text.to_uppercase();
    if upper.contains("BUY") || upper.contains("BULLISH") {
        Recommendation::Buy
    } else if upper.contains("SELL") || upper.contains("BEARISH") {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

fn extract_confidence(text: &str) -> u8 {
    PERCENT_RE
        .as_ref()
        .and_then(|re| re.captures(text))
        .map_or(DEFAULT_CONFIDENCE, |caps| {
            // digit runs too long for u64 are far above 100 anyway
            caps[1].parse::<u64>().map_or(100, |v| v.min(100) as u8)
        })
}

fn extract_price_target(text: &str, current_price: f64) -> f64 {
    DOLLAR_RE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(current_price * DEFAULT_TARGET_MULTIPLIER)
}
