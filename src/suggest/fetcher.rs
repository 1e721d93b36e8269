//! Bounded-time fetch with one soft retry.
//!
//! # Responsibilities
//! - Enforce a hard per-attempt deadline (the in-flight call is dropped on expiry)
//! - Retry exactly once, after a fixed pause, on timeout or network failure
//! - Degrade every other failure to an empty result
//!
//! # Design Decisions
//! - Each attempt gets its own deadline; attempt 1 timing out never shortens attempt 2
//! - Non-2xx and malformed payloads are final: the upstream answered, retrying won't help

use std::time::{Duration, Instant};

use crate::config::SuggestConfig;
use crate::observability::metrics;
use crate::suggest::provider::{FetchError, SuggestionSource};
use crate::suggest::SuggestionQuery;

/// Runs provider attempts under the configured deadline and retry policy.
#[derive(Debug, Clone, Copy)]
pub struct Fetcher {
    timeout: Duration,
    retry_backoff: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration, retry_backoff: Duration) -> Self {
        Self {
            timeout,
            retry_backoff,
        }
    }

    pub fn from_config(config: &SuggestConfig) -> Self {
        Self::new(
            Duration::from_millis(config.timeout_ms),
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Fetch suggestions from `source`. Never fails; failures yield an empty list.
    pub async fn fetch(&self, source: &dyn SuggestionSource, query: &SuggestionQuery) -> Vec<String> {
        let start = Instant::now();

        let outcome = match self.attempt(source, query).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    provider = source.name(),
                    error = %e,
                    delay_ms = self.retry_backoff.as_millis() as u64,
                    "Suggestion provider failed, retrying once"
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.attempt(source, query).await
            }
            other => other,
        };

        match outcome {
            Ok(suggestions) => {
                tracing::debug!(
                    provider = source.name(),
                    count = suggestions.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Suggestion provider answered"
                );
                metrics::record_provider_result(source.name(), suggestions.len(), start);
                suggestions
            }
            Err(e) => {
                tracing::warn!(
                    provider = source.name(),
                    error = %e,
                    "Suggestion provider degraded to empty result"
                );
                metrics::record_provider_failure(source.name(), e.kind(), start);
                Vec::new()
            }
        }
    }

    async fn attempt(
        &self,
        source: &dyn SuggestionSource,
        query: &SuggestionQuery,
    ) -> Result<Vec<String>, FetchError> {
        match tokio::time::timeout(self.timeout, source.request(query)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(FetchError::Timeout),
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::from_config(&SuggestConfig::default())
    }
}
