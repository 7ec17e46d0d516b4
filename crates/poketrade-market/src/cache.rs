//! Timed cache for translated text

use crate::models::Language;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for a translation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    /// Target language
    pub language: Language,
    /// Source text
    pub text: String,
}

impl TranslationKey {
    /// Create a new cache key
    pub fn new(language: Language, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }
}

/// Thread-safe cache of successful translations
pub struct TranslationCache {
    cache: Arc<RwLock<TimedCache<TranslationKey, String>>>,
}

impl TranslationCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &TranslationKey) -> Option<String> {
        // TimedCache evicts on read, so lookups need the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: TranslationKey, value: String) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a translation.
    ///
    /// A cached value is returned immediately. Otherwise `fetcher` runs and
    /// its successful result is stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: TranslationKey, fetcher: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<String, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(language = %key.language, "Translation cache hit");
            return Ok(value);
        }

        tracing::debug!(language = %key.language, "Translation cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for TranslationCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = TranslationCache::new(Duration::from_secs(60));
        let key = TranslationKey::new(Language::Hi, "Buy NVDA");

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), "NVDA खरीदें".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("NVDA खरीदें"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_language_is_part_of_key() {
        let cache = TranslationCache::new(Duration::from_secs(60));
        cache
            .insert(TranslationKey::new(Language::Hi, "hello"), "नमस्ते".to_string())
            .await;

        assert!(cache.get(&TranslationKey::new(Language::Te, "hello")).await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_skips_fetch_on_hit() {
        let cache = TranslationCache::new(Duration::from_secs(60));
        let key = TranslationKey::new(Language::Te, "hold");

        let first: Result<String, ()> = cache
            .get_or_fetch(key.clone(), || async { Ok("first".to_string()) })
            .await;
        let second: Result<String, ()> = cache
            .get_or_fetch(key, || async { Ok("second".to_string()) })
            .await;

        assert_eq!(assert_ok!(first), "first");
        assert_eq!(assert_ok!(second), "first");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = TranslationCache::new(Duration::from_secs(60));
        let key = TranslationKey::new(Language::Hi, "sell");

        let failed: Result<String, &str> = cache.get_or_fetch(key.clone(), || async { Err("down") }).await;
        assert_err!(failed);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = TranslationCache::new(Duration::from_millis(20));
        let key = TranslationKey::new(Language::Hi, "buy");
        cache.insert(key.clone(), "खरीदें".to_string()).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get(&key).await.is_none());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
