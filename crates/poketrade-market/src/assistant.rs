//! Conversational front end: symbol detection, analysis reports and chat

use crate::error::Result;
use crate::models::{AssistantReply, Language};
use crate::prompts::SYMBOL_EXTRACTION;
use crate::report::{ReportText, render_analysis};
use crate::service::MarketService;
use crate::translate::Translator;
use futures::future::join_all;
use poketrade_llm::CompletionRequest;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Inputs shorter than this that open with a greeting carry no symbol
const GREETING_MAX_CHARS: usize = 20;

/// Company names, including common misspellings, in lookup order
const COMPANY_SYMBOLS: &[(&str, &str)] = &[
    ("nvidia", "NVDA"),
    ("nvida", "NVDA"),
    ("nvidea", "NVDA"),
    ("nviadia", "NVDA"),
    ("apple", "AAPL"),
    ("aple", "AAPL"),
    ("appl", "AAPL"),
    ("tesla", "TSLA"),
    ("teslla", "TSLA"),
    ("teslaa", "TSLA"),
    ("microsoft", "MSFT"),
    ("microsft", "MSFT"),
    ("mircosoft", "MSFT"),
    ("google", "GOOGL"),
    ("gogle", "GOOGL"),
    ("googel", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("amazn", "AMZN"),
    ("amazom", "AMZN"),
    ("meta", "META"),
    ("facebook", "META"),
    ("facbook", "META"),
    ("netflix", "NFLX"),
    ("netlix", "NFLX"),
    ("amd", "AMD"),
    ("intel", "INTC"),
    ("intle", "INTC"),
    ("salesforce", "CRM"),
    ("oracle", "ORCL"),
    ("uber", "UBER"),
    ("zoom", "ZM"),
    ("palantir", "PLTR"),
    ("paypal", "PYPL"),
    ("square", "SQ"),
    ("coinbase", "COIN"),
    ("robinhood", "HOOD"),
];

/// Upper-case words that look like tickers but are not
const NON_TICKER_WORDS: &[&str] = &[
    "GET", "ALL", "FOR", "THE", "AND", "BUT", "NOT", "YOU", "CAN", "NEW", "NOW", "OLD", "WAY",
    "WHO", "ITS", "DID", "YES", "HIS", "HER", "HIM", "SHE", "HAS", "HAD", "HOW", "WHY", "PUT",
    "TOO", "TWO", "USE", "OUR", "OUT", "DAY", "MAY", "SAY", "SIR", "TOP", "TRY", "ASK", "OWN",
    "SEE", "BIG", "BOY", "END", "FEW", "GOT", "LET", "MAN", "RUN", "SET", "SIT", "WIN", "YET",
    "HI", "GIVE", "SOME", "NEWS", "SHOW", "TELL",
];

static TICKER_WORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{1,5})\b").ok());

static TICKER_ANSWER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,5}$").ok());

const EXTRACTION_MAX_TOKENS: usize = 10;
const EXTRACTION_TEMPERATURE: f32 = 0.0;

fn is_greeting(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    lower.chars().count() < GREETING_MAX_CHARS && GREETINGS.iter().any(|g| lower.starts_with(g))
}

/// Find a ticker without asking the AI provider.
///
/// Greetings yield nothing; then company names, then upper-case words.
pub fn match_symbol(input: &str) -> Option<String> {
    if is_greeting(input) {
        return None;
    }

    let lower = input.to_lowercase();
    if let Some((_, symbol)) = COMPANY_SYMBOLS.iter().find(|(name, _)| lower.contains(name)) {
        return Some((*symbol).to_string());
    }

    let regex = TICKER_WORD.as_ref()?;
    regex
        .captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|word| !NON_TICKER_WORDS.contains(word))
        .map(str::to_string)
}

/// Normalize a model's answer to a ticker, rejecting anything else
fn ticker_from_answer(answer: &str) -> Option<String> {
    let candidate = answer.trim().trim_matches(['"', '\'', '.']).to_uppercase();
    if candidate == "NULL" || candidate == "NONE" {
        return None;
    }
    let valid = TICKER_ANSWER
        .as_ref()
        .is_some_and(|re| re.is_match(&candidate));
    valid.then_some(candidate)
}

/// Chat assistant over a [`MarketService`] with translated output
#[derive(Debug, Clone)]
pub struct TradingAssistant {
    service: MarketService,
    translator: Translator,
}

impl TradingAssistant {
    /// Create an assistant translating through the service's AI provider
    pub fn new(service: MarketService) -> Self {
        let config = service.config();
        let translator = Translator::new(
            service.ai_provider().cloned(),
            config.ai_model.clone(),
            config.translation_cache_ttl,
        );
        Self {
            service,
            translator,
        }
    }

    /// Create an assistant with an explicit translator
    pub fn with_translator(service: MarketService, translator: Translator) -> Self {
        Self {
            service,
            translator,
        }
    }

    /// The underlying market service
    pub fn service(&self) -> &MarketService {
        &self.service
    }

    /// The translator
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Find the ticker `input` refers to, asking the AI provider as a last resort
    #[instrument(skip(self))]
    pub async fn extract_symbol(&self, input: &str) -> Option<String> {
        if is_greeting(input) {
            debug!("Greeting, no symbol");
            return None;
        }
        if let Some(symbol) = match_symbol(input) {
            return Some(symbol);
        }

        let provider = self.service.ai_provider()?;
        let prompt = match SYMBOL_EXTRACTION.render(json!({ "input": input })) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Symbol extraction prompt failed to render");
                return None;
            }
        };
        let request = CompletionRequest::builder(&self.service.config().ai_model)
            .prompt(prompt)
            .max_tokens(EXTRACTION_MAX_TOKENS)
            .temperature(EXTRACTION_TEMPERATURE)
            .build();

        match provider.complete(request).await.and_then(|r| r.into_text()) {
            Ok(answer) => {
                let symbol = ticker_from_answer(&answer);
                debug!(answer = %answer.trim(), symbol = ?symbol, "AI symbol extraction");
                symbol
            }
            Err(e) => {
                warn!(error = %e, "AI symbol extraction failed");
                None
            }
        }
    }

    /// Answer one chat message in `language`
    #[instrument(skip(self))]
    pub async fn respond(&self, input: &str, language: Language) -> Result<AssistantReply> {
        let Some(symbol) = self.extract_symbol(input).await else {
            info!("No symbol found, answering as chat");
            let answer = self.service.get_chat_response(input).await;
            let text = self
                .translator
                .translate_with_context(&answer, language, Some("chat answer"))
                .await;
            return Ok(AssistantReply::Chat { text });
        };

        info!(symbol = %symbol, "Answering with market analysis");
        let analysis = self.service.get_comprehensive_analysis(&symbol).await?;
        let original = ReportText::from_analysis(&analysis);

        let (insight, commentary, headlines) = tokio::join!(
            self.translator.translate_with_context(
                &original.insight,
                language,
                Some("trading insight")
            ),
            self.translator.translate_with_context(
                &original.commentary,
                language,
                Some("market commentary")
            ),
            join_all(original.headlines.iter().map(|headline| {
                self.translator
                    .translate_with_context(headline, language, Some("news headline"))
            })),
        );

        let text = render_analysis(
            &symbol,
            &analysis,
            language,
            &ReportText {
                insight,
                commentary,
                headlines,
            },
        );

        Ok(AssistantReply::Analysis {
            symbol,
            analysis: Box::new(analysis),
            text,
        })
    }
}
