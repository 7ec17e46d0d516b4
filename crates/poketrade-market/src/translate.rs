//! Translation of assistant output into Hindi and Telugu

use crate::cache::{TranslationCache, TranslationKey};
use crate::error::Result;
use crate::models::Language;
use crate::prompts::TRANSLATION;
use futures::future::try_join_all;
use poketrade_llm::{CompletionRequest, LLMProvider};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Longest piece of text sent in one translation request, in characters
pub const MAX_CHUNK_CHARS: usize = 4000;

const TRANSLATION_MAX_TOKENS: usize = 2048;
const TRANSLATION_TEMPERATURE: f32 = 0.1;

/// Split `text` into pieces of at most `max_chars` characters
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Translator backed by the generative-AI provider, with a timed cache
#[derive(Clone)]
pub struct Translator {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
    cache: TranslationCache,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Create a translator; without a provider every call is a passthrough
    pub fn new(
        provider: Option<Arc<dyn LLMProvider>>,
        model: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            cache: TranslationCache::new(cache_ttl),
        }
    }

    /// The translation cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate `text` into `language`.
    ///
    /// English, blank text or a missing provider return the text unchanged,
    /// and so does any failure.
    pub async fn translate(&self, text: &str, language: Language) -> String {
        self.translate_with_context(text, language, None).await
    }

    /// Translate with a short description of where the text comes from
    #[instrument(skip(self, text), fields(language = %language, chars = text.chars().count()))]
    pub async fn translate_with_context(
        &self,
        text: &str,
        language: Language,
        context: Option<&str>,
    ) -> String {
        let Some(provider) = &self.provider else {
            return text.to_string();
        };
        if language == Language::En || text.trim().is_empty() {
            return text.to_string();
        }

        let key = TranslationKey::new(language, text);
        let result = self
            .cache
            .get_or_fetch(key, || self.translate_uncached(provider, text, language, context))
            .await;

        match result {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "Translation failed, returning original text");
                text.to_string()
            }
        }
    }

    async fn translate_uncached(
        &self,
        provider: &Arc<dyn LLMProvider>,
        text: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        debug!(chunks = chunks.len(), "Translating");

        let translated = try_join_all(
            chunks
                .into_iter()
                .map(|chunk| self.translate_chunk(provider, chunk, language, context)),
        )
        .await?;

        Ok(translated.join(" "))
    }

    async fn translate_chunk(
        &self,
        provider: &Arc<dyn LLMProvider>,
        chunk: &str,
        language: Language,
        context: Option<&str>,
    ) -> Result<String> {
        let prompt = TRANSLATION.render(json!({
            "language": language.name(),
            "text": chunk,
            "context": context,
        }))?;

        let request = CompletionRequest::builder(&self.model)
            .prompt(prompt)
            .max_tokens(TRANSLATION_MAX_TOKENS)
            .temperature(TRANSLATION_TEMPERATURE)
            .build();

        let text = provider.complete(request).await?.into_text()?;
        Ok(text.trim().to_string())
    }
}
