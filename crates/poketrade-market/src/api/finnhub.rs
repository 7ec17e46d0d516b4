//! Finnhub client: quotes, candlestick history and news

use crate::error::{MarketError, Result};
use crate::models::{Candle, NewsItem, Quote};
use crate::sentiment::analyze_sentiment;
use crate::sources::{CandleSource, NewsSource, QuoteSource};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://finnhub.io/api/v1";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Finnhub `/quote` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    pub c: Option<f64>,
    /// Change
    pub d: Option<f64>,
    /// Percent change
    pub dp: Option<f64>,
    /// Day high
    pub h: Option<f64>,
    /// Day low
    pub l: Option<f64>,
    /// Day open
    pub o: Option<f64>,
    /// Previous close
    pub pc: Option<f64>,
}

/// Finnhub `/stock/candle` payload (parallel arrays)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubCandles {
    /// Status, "ok" or "no_data"
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

/// Finnhub news article; every field may be absent or empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubNewsArticle {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Publish time (UNIX seconds)
    #[serde(default)]
    pub datetime: Option<i64>,
}

/// Finnhub REST client with a per-client rate limiter
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API token
    /// * `rate_limit` - Requests per minute (free tier: 60)
    /// * `timeout` - HTTP request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Point the client at a different API base
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(MarketError::RateLimitExceeded {
                provider: "Finnhub".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::FinnhubError(format!("HTTP {status}: {body}")));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch raw company news between two `YYYY-MM-DD` dates
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.get_json(
            "/company-news",
            &[("symbol", symbol), ("from", from), ("to", to)],
        )
        .await
    }

    /// Fetch raw general market news
    pub async fn get_market_news(&self, category: &str) -> Result<Vec<FinnhubNewsArticle>> {
        self.get_json("/news", &[("category", category)]).await
    }
}

/// Convert a `/quote` payload; a missing or zero current price is a failure
pub fn quote_from_payload(symbol: &str, payload: &FinnhubQuote) -> Result<Quote> {
    let price = payload
        .c
        .filter(|c| *c > 0.0)
        .ok_or_else(|| MarketError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "Finnhub returned no current price".to_string(),
        })?;

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        change: payload.d.unwrap_or_default(),
        change_percent: payload.dp.unwrap_or_default(),
        high: payload.h.unwrap_or_default(),
        low: payload.l.unwrap_or_default(),
        open: payload.o.unwrap_or_default(),
        previous_close: payload.pc.unwrap_or_default(),
        // the quote endpoint carries no volume
        volume: 0,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// Convert a `/stock/candle` payload; only status "ok" with data succeeds
pub fn candles_from_payload(symbol: &str, payload: &FinnhubCandles) -> Result<Vec<Candle>> {
    if payload.s != "ok" || payload.t.is_empty() {
        return Err(MarketError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("Finnhub candle status '{}'", payload.s),
        });
    }

    let len = payload.t.len();
    if [payload.o.len(), payload.h.len(), payload.l.len(), payload.c.len()]
        .iter()
        .any(|n| *n != len)
    {
        return Err(MarketError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "Finnhub candle arrays have mismatched lengths".to_string(),
        });
    }

    let candles: Vec<Candle> = payload
        .t
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(Candle {
                timestamp: ts * 1000,
                open: *payload.o.get(i)?,
                high: *payload.h.get(i)?,
                low: *payload.l.get(i)?,
                close: *payload.c.get(i)?,
                volume: payload.v.get(i).copied().unwrap_or_default() as u64,
            })
        })
        .collect();

    if candles.is_empty() {
        return Err(MarketError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "Finnhub returned no usable candles".to_string(),
        });
    }
    Ok(candles)
}

/// Normalize an article, filling absent fields and scoring sentiment
pub fn normalize_article(article: FinnhubNewsArticle) -> NewsItem {
    let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

    let headline = non_empty(article.headline).unwrap_or_else(|| "No headline".to_string());
    let summary = non_empty(article.summary);
    let sentiment = analyze_sentiment(&format!(
        "{headline} {}",
        summary.as_deref().unwrap_or_default()
    ));

    NewsItem {
        summary: summary.unwrap_or_else(|| {
            if headline == "No headline" {
                "No summary available".to_string()
            } else {
                headline.clone()
            }
        }),
        headline,
        url: non_empty(article.url).unwrap_or_else(|| "#".to_string()),
        source: non_empty(article.source).unwrap_or_else(|| "Unknown".to_string()),
        published_at: article
            .datetime
            .filter(|t| *t > 0)
            .map_or_else(|| Utc::now().timestamp_millis(), |t| t * 1000),
        sentiment,
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    #[instrument(skip(self), fields(provider = "finnhub"))]
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let payload: FinnhubQuote = self.get_json("/quote", &[("symbol", symbol)]).await?;
        debug!(?payload, "Finnhub quote payload");
        quote_from_payload(symbol, &payload)
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }
}

#[async_trait]
impl CandleSource for FinnhubClient {
    #[instrument(skip(self), fields(provider = "finnhub"))]
    async fn candles(
        &self,
        symbol: &str,
        resolution: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<Candle>> {
        let from = from_secs.to_string();
        let to = to_secs.to_string();
        let payload: FinnhubCandles = self
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", symbol),
                    ("resolution", resolution),
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                ],
            )
            .await?;
        debug!(status = %payload.s, points = payload.t.len(), "Finnhub candle payload");
        candles_from_payload(symbol, &payload)
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    #[instrument(skip(self), fields(provider = "finnhub"))]
    async fn company_news(&self, symbol: &str, days: u32) -> Result<Vec<NewsItem>> {
        let today = Utc::now().date_naive();
        let from = (today - ChronoDuration::days(i64::from(days)))
            .format("%Y-%m-%d")
            .to_string();
        let to = today.format("%Y-%m-%d").to_string();

        let articles = self.get_company_news(symbol, &from, &to).await?;
        debug!(count = articles.len(), "Finnhub company news");
        Ok(articles.into_iter().map(normalize_article).collect())
    }

    #[instrument(skip(self), fields(provider = "finnhub"))]
    async fn market_news(&self) -> Result<Vec<NewsItem>> {
        let articles = self.get_market_news("general").await?;
        debug!(count = articles.len(), "Finnhub market news");
        Ok(articles.into_iter().map(normalize_article).collect())
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }
}
