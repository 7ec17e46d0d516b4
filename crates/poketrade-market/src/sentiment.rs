//! Keyword sentiment scoring for news text

use crate::models::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "growth", "increase", "rise", "bull", "gains", "profit", "strong",
];

const NEGATIVE_WORDS: &[&str] = &[
    "decline", "fall", "bear", "loss", "weak", "drop", "concern",
];

/// Label text by counting which keywords appear in it.
///
/// Each keyword counts once no matter how often it appears. Matching is a
/// case-insensitive substring test, so "bullish" counts as "bull".
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();

    let positive = count(POSITIVE_WORDS);
    let negative = count(NEGATIVE_WORDS);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}
