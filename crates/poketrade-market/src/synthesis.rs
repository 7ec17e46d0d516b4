//! Synthetic market data used as the terminal step of the quote and candle
//! fallback chains.
//!
//! Known symbols come from a fixed reference table so their quotes are
//! deterministic. Everything random draws from a caller-supplied [`Rng`], so
//! tests can seed a `StdRng`.

use crate::models::{Candle, Quote};
use chrono::Utc;
use rand::Rng;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const MAX_SYNTHETIC_CANDLES: i64 = 30;
const DAILY_VOLATILITY: f64 = 0.02;
const DEFAULT_BASE_PRICE: f64 = 150.0;

/// Reference snapshot for a well-known symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceQuote {
    pub symbol: &'static str,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub high: f64,
    pub low: f64,
}

/// Fixed reference data for the symbols the assistant is most often asked about
pub const REFERENCE_QUOTES: &[ReferenceQuote] = &[
    ReferenceQuote { symbol: "NVDA", price: 159.34, change: 2.09, change_percent: 1.33, volume: 22_900_000, high: 160.98, low: 157.77 },
    ReferenceQuote { symbol: "AAPL", price: 190.90, change: -1.23, change_percent: -0.64, volume: 45_000_000, high: 192.50, low: 189.80 },
    ReferenceQuote { symbol: "TSLA", price: 251.52, change: 3.87, change_percent: 1.56, volume: 78_000_000, high: 254.20, low: 248.90 },
    ReferenceQuote { symbol: "MSFT", price: 441.58, change: 5.23, change_percent: 1.20, volume: 32_000_000, high: 443.80, low: 438.90 },
    ReferenceQuote { symbol: "GOOGL", price: 181.72, change: -2.15, change_percent: -1.17, volume: 28_000_000, high: 183.50, low: 180.90 },
    ReferenceQuote { symbol: "AMZN", price: 186.87, change: 1.44, change_percent: 0.78, volume: 41_000_000, high: 188.20, low: 185.30 },
    ReferenceQuote { symbol: "META", price: 503.69, change: 7.82, change_percent: 1.58, volume: 18_000_000, high: 506.50, low: 498.20 },
];

/// Look up the reference snapshot for `symbol`
pub fn reference_quote(symbol: &str) -> Option<&'static ReferenceQuote> {
    REFERENCE_QUOTES.iter().find(|r| r.symbol == symbol)
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Produce a quote for `symbol` without any network access.
///
/// Reference symbols return their table values. Unknown symbols get a
/// random price strictly inside (50, 350) with `low <= price <= high`.
pub fn synthesize_quote<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> Quote {
    let timestamp = Utc::now().timestamp_millis();

    if let Some(reference) = reference_quote(symbol) {
        return Quote {
            symbol: symbol.to_string(),
            price: reference.price,
            change: reference.change,
            change_percent: reference.change_percent,
            high: reference.high,
            low: reference.low,
            open: round2(reference.price - reference.change * 0.8),
            previous_close: round2(reference.price - reference.change),
            volume: reference.volume,
            timestamp,
        };
    }

    // base and a +-2% move keep the price within (53.9, 346.8)
    let base = rng.gen_range(55.0..340.0);
    let change_percent = rng.gen_range(-2.0..2.0);
    let change = base * change_percent / 100.0;
    let price = base + change;

    Quote {
        symbol: symbol.to_string(),
        price: round2(price),
        change: round2(change),
        change_percent: round2(change_percent),
        high: round2(price + rng.gen_range(0.0..1.0) * base * 0.02),
        low: round2(price - rng.gen_range(0.0..1.0) * base * 0.02),
        open: round2(base + rng.gen_range(-0.5..0.5) * base * 0.01),
        previous_close: round2(base),
        volume: rng.gen_range(10_000_000..110_000_000),
        timestamp,
    }
}

/// Produce a daily random-walk series between two epoch-second bounds.
///
/// One candle per whole day in the range, capped at 30; a non-empty range
/// shorter than a day yields a single candle and an empty or inverted range
/// yields none. Every candle satisfies `high >= max(open, close)` and
/// `low <= min(open, close)`.
pub fn synthesize_candles<R: Rng + ?Sized>(
    symbol: &str,
    from_secs: i64,
    to_secs: i64,
    rng: &mut R,
) -> Vec<Candle> {
    if to_secs <= from_secs {
        return Vec::new();
    }

    let days = ((to_secs - from_secs) / SECONDS_PER_DAY).clamp(1, MAX_SYNTHETIC_CANDLES);
    let mut price = reference_quote(symbol).map_or(DEFAULT_BASE_PRICE, |r| r.price);
    let mut candles = Vec::with_capacity(days as usize);

    for day in 0..days {
        let open = price;
        let volatility = open * DAILY_VOLATILITY;
        let close = open + rng.gen_range(-0.5..0.5) * volatility;
        let high = open.max(close) + rng.gen_range(0.0..0.5) * volatility;
        let low = open.min(close) - rng.gen_range(0.0..0.5) * volatility;

        // rounding is monotone, so the OHLC ordering survives it
        candles.push(Candle {
            timestamp: (from_secs + day * SECONDS_PER_DAY) * 1000,
            open: round2(open),
            high: round2(high),
            low: round2(low),
            close: round2(close),
            volume: rng.gen_range(10_000_000..60_000_000),
        });

        price = close + rng.gen_range(-0.5..0.5) * volatility * 0.3;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_reference_quote_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let quote = synthesize_quote("NVDA", &mut rng);

        assert_eq!(quote.price, 159.34);
        assert_eq!(quote.change, 2.09);
        assert_eq!(quote.change_percent, 1.33);
        assert_eq!(quote.high, 160.98);
        assert_eq!(quote.low, 157.77);
        assert_eq!(quote.volume, 22_900_000);
        assert_eq!(quote.open, 157.67);
        assert_eq!(quote.previous_close, 157.25);
    }

    #[test]
    fn test_unknown_symbol_quote_bounds() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quote = synthesize_quote("UNKNOWNX", &mut rng);

            assert_eq!(quote.symbol, "UNKNOWNX");
            assert!(quote.price > 50.0 && quote.price < 350.0, "{quote:?}");
            assert!(quote.high >= quote.price, "{quote:?}");
            assert!(quote.low <= quote.price, "{quote:?}");
            assert!(quote.volume >= 10_000_000);
        }
    }

    #[test]
    fn test_candles_respect_ohlc_invariant() {
        let to = 1_700_000_000;
        let from = to - 7 * SECONDS_PER_DAY;

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let candles = synthesize_candles("UNKNOWNX", from, to, &mut rng);

            assert_eq!(candles.len(), 7);
            assert!(candles.iter().all(Candle::is_consistent));
            assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            assert!(
                candles
                    .iter()
                    .all(|c| (10_000_000..60_000_000).contains(&c.volume))
            );
        }
    }

    #[test]
    fn test_candles_start_from_reference_price() {
        let mut rng = StdRng::seed_from_u64(1);
        let candles = synthesize_candles("META", 0, 3 * SECONDS_PER_DAY, &mut rng);
        assert_eq!(candles[0].open, 503.69);
        assert_eq!(candles[0].timestamp, 0);
        assert_eq!(candles[1].timestamp, SECONDS_PER_DAY * 1000);
    }

    #[test]
    fn test_candle_count_is_capped() {
        let mut rng = StdRng::seed_from_u64(3);
        let candles = synthesize_candles("AAPL", 0, 365 * SECONDS_PER_DAY, &mut rng);
        assert_eq!(candles.len(), 30);
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(synthesize_candles("AAPL", 100, 100, &mut rng).is_empty());
        assert!(synthesize_candles("AAPL", 200, 100, &mut rng).is_empty());
        assert_eq!(synthesize_candles("AAPL", 0, 3600, &mut rng).len(), 1);
    }
}
