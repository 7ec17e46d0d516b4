//! Prompt templates for the generative-AI calls
//!
//! Templates use MiniJinja syntax (`{{ var }}`, `{% for %}`) and are rendered
//! with a fresh environment per call.

use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

/// A named MiniJinja prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    name: &'static str,
    source: &'static str,
}

impl PromptTemplate {
    const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    /// Template name, used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render the template with `vars`
    pub fn render<S: Serialize>(&self, vars: S) -> Result<String> {
        let mut env = Environment::new();
        env.add_filter("trim", |s: String| s.trim().to_string());
        Ok(env.render_str(self.source, vars)?.trim().to_string())
    }
}

/// Trading insight request: quote JSON plus recent headlines
pub const TRADING_INSIGHT: PromptTemplate = PromptTemplate::new(
    "market.trading_insight",
    r"Analyze the following market data for {{ symbol }} and provide trading insights.

CURRENT PRICE DATA:
{{ quote_json }}

RECENT NEWS ({{ news | length }} articles):
{% for item in news %}- {{ item.headline }}: {{ item.summary }}
{% endfor %}
Please provide:
1. Technical analysis based on the data above
2. Trading recommendation (BUY/SELL/HOLD)
3. Price target based on the current price of ${{ price }}
4. Confidence level (0-100)
5. Key reasoning points

Format the answer as a trading analysis and rely only on the data provided above.",
);

/// Market commentary request sent to the commentary provider
pub const MARKET_COMMENTARY: PromptTemplate = PromptTemplate::new(
    "market.commentary",
    r"Provide current stock market data and analysis for: {{ query }}. Include:
- Current price and daily change
- Market cap and trading volume
- Recent performance (weekly, monthly, yearly)
- Key market developments and news
- Technical analysis and sentiment
- Future outlook and price targets
Format as structured financial analysis with specific numbers and percentages.",
);

/// Commentary query used by the comprehensive analysis
pub const SYMBOL_COMMENTARY_QUERY: PromptTemplate = PromptTemplate::new(
    "market.commentary_query",
    r"Latest market analysis and trends for {{ symbol }} stock. Include recent performance, key factors affecting price, and market sentiment.",
);

/// General finance conversation
pub const CHAT: PromptTemplate = PromptTemplate::new(
    "assistant.chat",
    r#"You are PokeTrade's trading assistant. Answer the user's question about trading, markets, or finance.

Keep answers:
- Informative but concise
- Focused on trading and finance
- Professional but friendly
- Actionable where possible

User question: "{{ query }}""#,
);

/// Ticker extraction from free text
pub const SYMBOL_EXTRACTION: PromptTemplate = PromptTemplate::new(
    "assistant.symbol_extraction",
    r#"Extract the most likely stock ticker symbol from the user's input.

Rules:
1. Look for company names, even misspelled
2. Look for ticker symbols
3. Consider context and intent
4. Return ONLY the ticker symbol in uppercase, or null if no stock is mentioned

Common mappings:
- nvidia/nvida/nvidea -> NVDA
- apple/aple -> AAPL
- tesla/teslla -> TSLA
- microsoft/microsft -> MSFT
- google/gogle/alphabet -> GOOGL
- amazon/amazn -> AMZN
- meta/facebook -> META
- netflix/netlix -> NFLX

User input: "{{ input }}"

Answer with just the ticker symbol (e.g. NVDA) or null."#,
);

/// Translation of financial text
pub const TRANSLATION: PromptTemplate = PromptTemplate::new(
    "assistant.translation",
    r#"You are an expert translator of financial and trading content. Translate the text below to {{ language }} while preserving:

1. Financial terms and concepts
2. Stock symbols (NVDA, AAPL, ...) unchanged
3. Numbers, percentages and currency values unchanged
4. Markdown formatting (**, *, ```)
5. Emojis and special characters
6. Financial abbreviations (RSI, MACD, P/E) in English
{% if context %}
Context: {{ context }}
{% endif %}
Text to translate:
"{{ text }}"

Keep company and product names in English. Reply with the translation only."#,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trading_insight_lists_news() {
        let prompt = TRADING_INSIGHT
            .render(json!({
                "symbol": "NVDA",
                "quote_json": "{\"price\": 159.34}",
                "price": 159.34,
                "news": [
                    {"headline": "Chips rally", "summary": "Demand is strong"},
                    {"headline": "Supply worries", "summary": "Lead times grow"},
                ],
            }))
            .unwrap();

        assert!(prompt.contains("NVDA"));
        assert!(prompt.contains("RECENT NEWS (2 articles)"));
        assert!(prompt.contains("- Chips rally: Demand is strong"));
        assert!(prompt.contains("$159.34"));
    }

    #[test]
    fn test_translation_context_is_optional() {
        let with = TRANSLATION
            .render(json!({"language": "Hindi", "text": "Buy NVDA", "context": "trading chat"}))
            .unwrap();
        assert!(with.contains("Context: trading chat"));

        let without = TRANSLATION
            .render(json!({"language": "Telugu", "text": "Buy NVDA", "context": null}))
            .unwrap();
        assert!(!without.contains("Context:"));
        assert!(without.contains("to Telugu"));
    }

    #[test]
    fn test_commentary_query() {
        let query = SYMBOL_COMMENTARY_QUERY.render(json!({"symbol": "AAPL"})).unwrap();
        assert!(query.starts_with("Latest market analysis and trends for AAPL stock."));
        assert_eq!(SYMBOL_COMMENTARY_QUERY.name(), "market.commentary_query");
    }
}
