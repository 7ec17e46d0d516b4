//! Ordered provider fallback with per-attempt timeouts
//!
//! A [`FallbackChain`] holds labelled attempts for one stage (quote, candles,
//! ...). Attempts run one after another, each bounded by the stage timeout,
//! and the first success wins. Failures and timeouts are logged and fall
//! through to the next attempt.

use crate::error::{MarketError, Result};
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

struct Attempt<'a, T> {
    label: &'static str,
    future: BoxFuture<'a, Result<T>>,
}

/// Sequential fallback over labelled async attempts
pub struct FallbackChain<'a, T> {
    stage: &'static str,
    timeout: Duration,
    attempts: Vec<Attempt<'a, T>>,
}

impl<'a, T> FallbackChain<'a, T> {
    /// Create an empty chain for `stage`
    pub fn new(stage: &'static str, timeout: Duration) -> Self {
        Self {
            stage,
            timeout,
            attempts: Vec::new(),
        }
    }

    /// Append an attempt. The future is not polled until its turn.
    pub fn attempt<F>(mut self, label: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        self.attempts.push(Attempt {
            label,
            future: Box::pin(future),
        });
        self
    }

    /// Append an attempt only when `enabled` holds
    pub fn attempt_if<F>(self, enabled: bool, label: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        if enabled {
            self.attempt(label, future)
        } else {
            debug!(stage = self.stage, source = label, "Source not configured, skipping");
            self
        }
    }

    /// Number of queued attempts
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Whether no attempt is queued
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Run the attempts in order and return the first success.
    ///
    /// When every attempt fails, the last error is returned.
    pub async fn first_success(self) -> Result<T> {
        let stage = self.stage;
        let timeout = self.timeout;
        let mut last_error = None;

        for attempt in self.attempts {
            match tokio::time::timeout(timeout, attempt.future).await {
                Ok(Ok(value)) => {
                    debug!(stage, source = attempt.label, "Source succeeded");
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    warn!(stage, source = attempt.label, error = %e, "Source failed, falling back");
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!(
                        stage,
                        source = attempt.label,
                        timeout_secs = timeout.as_secs(),
                        "Source timed out, falling back"
                    );
                    last_error = Some(MarketError::Timeout {
                        stage: format!("{stage} ({})", attempt.label),
                        secs: timeout.as_secs(),
                    });
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MarketError::Other(format!("no {stage} source available"))))
    }

    /// Run the attempts in order, finishing with `terminal` when all fail.
    ///
    /// The terminal step always produces a value, so this never fails.
    pub async fn run_or_else<F>(self, terminal: F) -> T
    where
        F: FnOnce() -> T,
    {
        let stage = self.stage;
        match self.first_success().await {
            Ok(value) => value,
            Err(e) => {
                debug!(stage, error = %e, "All sources exhausted, using terminal step");
                terminal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fail(msg: &str) -> Result<u32> {
        Err(MarketError::ApiError(msg.to_string()))
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let value = FallbackChain::new("quote", Duration::from_secs(1))
            .attempt("primary", async { fail("down") })
            .attempt("secondary", async { Ok(2) })
            .attempt("tertiary", async { Ok(3) })
            .first_success()
            .await
            .unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_later_attempts_are_not_polled() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polled);

        let value = FallbackChain::new("quote", Duration::from_secs(1))
            .attempt("primary", async { Ok(1) })
            .attempt("secondary", async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .first_success()
            .await
            .unwrap();

        assert_eq!(value, 1);
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failures_return_last_error() {
        let err = FallbackChain::new("candles", Duration::from_secs(1))
            .attempt("primary", async { fail("first") })
            .attempt("secondary", async { fail("second") })
            .first_success()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("second"));
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let chain: FallbackChain<'_, u32> = FallbackChain::new("news", Duration::from_secs(1));
        assert!(chain.is_empty());
        assert!(chain.first_success().await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_falls_through() {
        let value = FallbackChain::new("quote", Duration::from_millis(20))
            .attempt("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(1)
            })
            .attempt("fast", async { Ok(2) })
            .first_success()
            .await
            .unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_timeout_error_names_the_source() {
        let err = FallbackChain::new("quote", Duration::from_millis(10))
            .attempt("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(1)
            })
            .first_success()
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::Timeout { ref stage, .. } if stage == "quote (slow)"));
    }

    #[tokio::test]
    async fn test_run_or_else_uses_terminal() {
        let value = FallbackChain::new("quote", Duration::from_secs(1))
            .attempt("primary", async { fail("down") })
            .run_or_else(|| 42)
            .await;

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_attempt_if_skips_disabled_sources() {
        let chain = FallbackChain::new("quote", Duration::from_secs(1))
            .attempt_if(false, "primary", async { Ok(1) })
            .attempt_if(true, "secondary", async { Ok(2) });

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.run_or_else(|| 0).await, 2);
    }
}
