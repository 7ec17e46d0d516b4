//! Yahoo Finance client, the free secondary quote source

use crate::error::{MarketError, Result};
use crate::models::Quote;
use crate::sources::QuoteSource;
use crate::synthesis::round2;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Default, Clone, Copy)]
pub struct YahooFinanceClient {}

/// Daily bar reduced to the fields a quote needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get the most recent daily bars for a symbol, oldest first
    pub async fn get_daily_bars(&self, symbol: &str) -> Result<Vec<DailyBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| DailyBar {
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}

/// Build a quote from daily bars: the last bar is today, the one before it
/// supplies the previous close.
pub fn quote_from_bars(symbol: &str, bars: &[DailyBar]) -> Result<Quote> {
    let (last, earlier) = bars.split_last().ok_or_else(|| MarketError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: "Yahoo Finance returned no quotes".to_string(),
    })?;

    let previous_close = earlier.last().map_or(last.open, |bar| bar.close);
    let change = last.close - previous_close;
    let change_percent = if previous_close > 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };

    Ok(Quote {
        symbol: symbol.to_string(),
        price: round2(last.close),
        change: round2(change),
        change_percent: round2(change_percent),
        high: round2(last.high),
        low: round2(last.low),
        open: round2(last.open),
        previous_close: round2(previous_close),
        volume: last.volume,
        timestamp: Utc::now().timestamp_millis(),
    })
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    #[instrument(skip(self), fields(provider = "yahoo-finance"))]
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let bars = self.get_daily_bars(symbol).await?;
        debug!(bars = bars.len(), "Yahoo Finance daily bars");
        quote_from_bars(symbol, &bars)
    }

    fn name(&self) -> &'static str {
        "yahoo-finance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, close: f64) -> DailyBar {
        DailyBar {
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_quote_from_bars() {
        let quote = quote_from_bars("AAPL", &[bar(99.0, 100.0), bar(100.5, 102.0)]).unwrap();

        assert_eq!(quote.price, 102.0);
        assert_eq!(quote.previous_close, 100.0);
        assert_eq!(quote.change, 2.0);
        assert_eq!(quote.change_percent, 2.0);
        assert_eq!(quote.open, 100.5);
        assert_eq!(quote.volume, 1_000);
    }

    #[test]
    fn test_single_bar_uses_open_as_previous_close() {
        let quote = quote_from_bars("AAPL", &[bar(50.0, 51.0)]).unwrap();
        assert_eq!(quote.previous_close, 50.0);
        assert_eq!(quote.change, 1.0);
    }

    #[test]
    fn test_no_bars_is_failure() {
        assert!(quote_from_bars("AAPL", &[]).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_quote() {
        let client = YahooFinanceClient::new();
        let quote = client.quote("AAPL").await.unwrap();
        assert!(quote.price > 0.0);
    }
}
