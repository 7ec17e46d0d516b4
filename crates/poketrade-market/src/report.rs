//! Markdown rendering of a comprehensive analysis

use crate::models::{ComprehensiveAnalysis, Language, Recommendation};
use std::fmt::Write;

/// Headlines shown in a report
pub const REPORT_HEADLINES: usize = 2;

/// The free-text parts of a report, possibly translated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportText {
    pub insight: String,
    pub commentary: String,
    pub headlines: Vec<String>,
}

impl ReportText {
    /// The analysis' own text, untranslated
    pub fn from_analysis(analysis: &ComprehensiveAnalysis) -> Self {
        Self {
            insight: analysis.insight.analysis.clone(),
            commentary: analysis.commentary.clone(),
            headlines: analysis
                .news
                .iter()
                .take(REPORT_HEADLINES)
                .map(|n| n.headline.clone())
                .collect(),
        }
    }
}

/// Format an integer with comma thousands separators
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn recommendation_label(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Buy => "🟢 BUY",
        Recommendation::Sell => "🔴 SELL",
        Recommendation::Hold => "🟡 HOLD",
    }
}

/// Render the chat report for `symbol`
pub fn render_analysis(
    symbol: &str,
    analysis: &ComprehensiveAnalysis,
    language: Language,
    text: &ReportText,
) -> String {
    let quote = &analysis.quote;
    let insight = &analysis.insight;
    let trend = if quote.change >= 0.0 { "📈" } else { "📉" };

    let mut out = String::new();
    let _ = writeln!(out, "📊 **{symbol} Market Analysis** ({language})");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Current Price**: ${:.2}", quote.price);
    let _ = writeln!(
        out,
        "{trend} {:.2} ({:.2}%)",
        quote.change, quote.change_percent
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Trading Insights**: {} - {}% confidence",
        recommendation_label(insight.recommendation),
        insight.confidence
    );
    let _ = writeln!(out, "💡 {}", text.insight);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Market Intelligence**:");
    let _ = writeln!(out, "{}", text.commentary);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Key Metrics**:");
    let _ = writeln!(out, "• High: ${:.2}", quote.high);
    let _ = writeln!(out, "• Low: ${:.2}", quote.low);
    let _ = writeln!(out, "• Volume: {}", format_thousands(quote.volume));
    let _ = writeln!(out, "• Price Target: ${:.2}", insight.price_target);
    let _ = writeln!(out);
    let _ = write!(
        out,
        "📰 **Latest News**: {} recent articles analyzed",
        analysis.news.len()
    );
    for headline in &text.headlines {
        let _ = write!(out, "\n• {headline}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, Quote, Sentiment, TradingInsight};

    fn analysis(change: f64, headlines: &[&str]) -> ComprehensiveAnalysis {
        ComprehensiveAnalysis {
            quote: Quote {
                symbol: "NVDA".to_string(),
                price: 159.34,
                change,
                change_percent: 1.33,
                high: 160.98,
                low: 157.77,
                open: 157.67,
                previous_close: 157.25,
                volume: 22_900_000,
                timestamp: 0,
            },
            candles: Vec::new(),
            line: Vec::new(),
            news: headlines
                .iter()
                .map(|h| NewsItem {
                    headline: (*h).to_string(),
                    summary: String::new(),
                    url: "#".to_string(),
                    source: "Test".to_string(),
                    published_at: 0,
                    sentiment: Sentiment::Neutral,
                })
                .collect(),
            commentary: "Momentum remains positive.".to_string(),
            insight: TradingInsight::placeholder("NVDA", 159.34, "Hold for now.", "n/a"),
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(22_900_000), "22,900,000");
    }

    #[test]
    fn test_report_contents() {
        let analysis = analysis(2.09, &["Chips rally", "Supply improves", "Third story"]);
        let text = ReportText::from_analysis(&analysis);
        let report = render_analysis("NVDA", &analysis, Language::En, &text);

        assert!(report.starts_with("📊 **NVDA Market Analysis** (en)"));
        assert!(report.contains("**Current Price**: $159.34"));
        assert!(report.contains("📈 2.09 (1.33%)"));
        assert!(report.contains("🟡 HOLD - 0% confidence"));
        assert!(report.contains("💡 Hold for now."));
        assert!(report.contains("Momentum remains positive."));
        assert!(report.contains("• Volume: 22,900,000"));
        assert!(report.contains("• Price Target: $159.34"));
        assert!(report.contains("3 recent articles analyzed"));
        assert!(report.contains("• Chips rally"));
        assert!(report.contains("• Supply improves"));
        assert!(!report.contains("Third story"));
    }

    #[test]
    fn test_negative_change_uses_down_arrow() {
        let analysis = analysis(-1.5, &[]);
        let report = render_analysis(
            "NVDA",
            &analysis,
            Language::Hi,
            &ReportText::from_analysis(&analysis),
        );

        assert!(report.contains("📉 -1.50"));
        assert!(report.contains("(hi)"));
        assert!(report.ends_with("0 recent articles analyzed"));
    }
}
