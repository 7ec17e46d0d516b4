//! Alpha Vantage client for daily OHLCV history

use crate::error::{MarketError, Result};
use crate::models::Candle;
use crate::sources::CandleSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key ("demo" works for a few symbols)
    /// * `rate_limit` - Maximum requests per minute (default: 5 for free tier)
    /// * `timeout` - HTTP request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Get the compact daily time series as a JSON document
    pub async fn get_daily(&self, symbol: &str) -> Result<serde_json::Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", "compact"),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

/// Parse a `TIME_SERIES_DAILY` document into candles inside `[from_secs, to_secs]`,
/// sorted ascending.
pub fn parse_daily_series(data: &serde_json::Value, from_secs: i64, to_secs: i64) -> Result<Vec<Candle>> {
    // Check for API error messages
    if let Some(error) = data.get("Error Message") {
        return Err(MarketError::AlphaVantageError(error.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(MarketError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    let series = data
        .get(DAILY_SERIES_KEY)
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| MarketError::AlphaVantageError("No time series data found".to_string()))?;

    let field = |values: &serde_json::Value, key: &str| -> Option<f64> {
        values[key].as_str()?.parse().ok()
    };

    let mut candles: Vec<Candle> = series
        .iter()
        .filter_map(|(date, values)| {
            let timestamp = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)?
                .and_utc()
                .timestamp_millis();

            // entries with a missing or unparseable price are skipped
            Some(Candle {
                timestamp,
                open: field(values, "1. open")?,
                high: field(values, "2. high")?,
                low: field(values, "3. low")?,
                close: field(values, "4. close")?,
                volume: values["5. volume"]
                    .as_str()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            })
        })
        .filter(|c| c.timestamp >= from_secs * 1000 && c.timestamp <= to_secs * 1000)
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

#[async_trait]
impl CandleSource for AlphaVantageClient {
    #[instrument(skip(self, _resolution), fields(provider = "alpha-vantage"))]
    async fn candles(
        &self,
        symbol: &str,
        _resolution: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<Candle>> {
        let data = self.get_daily(symbol).await?;
        let candles = parse_daily_series(&data, from_secs, to_secs)?;
        debug!(points = candles.len(), "Alpha Vantage daily series");

        if candles.is_empty() {
            return Err(MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no Alpha Vantage candles inside the requested range".to_string(),
            });
        }

        Ok(candles)
    }

    fn name(&self) -> &'static str {
        "alpha-vantage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_series() -> serde_json::Value {
        json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-01-03": {"1. open": "161.0", "2. high": "162.5", "3. low": "160.1", "4. close": "162.0", "5. volume": "4000000"},
                "2024-01-02": {"1. open": "160.0", "2. high": "161.5", "3. low": "159.5", "4. close": "161.0", "5. volume": "3500000"},
                "2023-12-01": {"1. open": "150.0", "2. high": "151.0", "3. low": "149.0", "4. close": "150.5", "5. volume": "3000000"}
            }
        })
    }

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("demo", 5, Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key, "demo");
        assert_eq!(client.name(), "alpha-vantage");
    }

    #[test]
    fn test_parse_filters_and_sorts() {
        // 2024-01-01T00:00:00Z .. 2024-01-04T00:00:00Z
        let candles = parse_daily_series(&sample_series(), 1_704_067_200, 1_704_326_400).unwrap();

        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
        assert_eq!(candles[0].open, 160.0);
        assert_eq!(candles[1].close, 162.0);
        assert_eq!(candles[1].volume, 4_000_000);
    }

    #[test]
    fn test_error_message_is_error() {
        let data = json!({"Error Message": "Invalid API call."});
        assert!(matches!(
            parse_daily_series(&data, 0, i64::MAX / 1000),
            Err(MarketError::AlphaVantageError(_))
        ));
    }

    #[test]
    fn test_note_is_rate_limit() {
        let note = json!({"Note": "Thank you for using Alpha Vantage!"});
        let info = json!({"Information": "The demo API key is for demo purposes only."});

        assert!(matches!(
            parse_daily_series(&note, 0, 1),
            Err(MarketError::RateLimitExceeded { .. })
        ));
        assert!(matches!(
            parse_daily_series(&info, 0, 1),
            Err(MarketError::RateLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_incomplete_day_is_skipped() {
        let data = json!({
            "Time Series (Daily)": {
                "2024-01-02": {"1. open": "100.0", "2. high": "102.0", "3. low": "99.0", "4. close": "101.0", "5. volume": "1000"},
                "2024-01-03": {"1. open": "101.0", "3. low": "100.0", "4. close": "not-a-number"}
            }
        });

        let candles = parse_daily_series(&data, 1_704_067_200, 1_704_326_400).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 101.0);
        assert!(candles.iter().all(|c| c.open > 0.0 && c.close > 0.0));
    }

    #[test]
    fn test_missing_series_is_error() {
        assert!(parse_daily_series(&json!({}), 0, 1).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_daily_series() {
        let client = AlphaVantageClient::new("demo", 5, Duration::from_secs(10)).unwrap();
        let data = client.get_daily("IBM").await.unwrap();
        assert!(data.get(DAILY_SERIES_KEY).is_some());
    }
}
