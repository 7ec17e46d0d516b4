//! API clients for market data providers

pub mod alpha_vantage;
pub mod finnhub;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use finnhub::{FinnhubClient, FinnhubNewsArticle};
pub use yahoo::YahooFinanceClient;
