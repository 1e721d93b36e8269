//! Concurrent fan-out over every provider with ordered dedup.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;

use crate::config::SuggestConfig;
use crate::suggest::fetcher::Fetcher;
use crate::suggest::provider::{HttpProvider, SuggestionSource};
use crate::suggest::{QueryError, SuggestionQuery};

/// Aggregated suggestions for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub query: String,
    pub sources: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Error building an aggregator from config.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Fans a query out to all sources and merges their answers.
#[derive(Clone)]
pub struct Aggregator {
    /// In merge priority order.
    sources: Vec<Arc<dyn SuggestionSource>>,
    fetcher: Fetcher,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn SuggestionSource>>, fetcher: Fetcher) -> Self {
        Self { sources, fetcher }
    }

    /// HTTP providers in the configured order, sharing one client.
    pub fn from_config(config: &SuggestConfig) -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        let mut sources: Vec<Arc<dyn SuggestionSource>> = Vec::new();
        for provider in &config.providers {
            sources.push(Arc::new(HttpProvider::from_config(provider, client.clone())?));
        }

        Ok(Self::new(sources, Fetcher::from_config(config)))
    }

    /// Names of all sources, in merge order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Validate the raw parameters, then aggregate.
    ///
    /// A validation error is returned before any provider is contacted.
    pub async fn aggregate(
        &self,
        keyword: Option<&str>,
        country: Option<&str>,
        market: Option<&str>,
    ) -> Result<Aggregate, QueryError> {
        let query = SuggestionQuery::new(keyword, country, market)?;
        Ok(self.collect(&query).await)
    }

    /// Query every source concurrently and merge in priority order.
    pub async fn collect(&self, query: &SuggestionQuery) -> Aggregate {
        let results = join_all(
            self.sources
                .iter()
                .map(|source| self.fetcher.fetch(source.as_ref(), query)),
        )
        .await;

        let suggestions = merge_unique(results);

        tracing::info!(
            keyword = %query.keyword,
            country = %query.country,
            market = %query.market,
            count = suggestions.len(),
            "Aggregated suggestions"
        );

        Aggregate {
            query: query.keyword.clone(),
            sources: self.source_names(),
            suggestions,
        }
    }
}

/// Concatenate `lists` in order, keeping only the first occurrence of each string.
pub fn merge_unique<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for item in lists.into_iter().flatten() {
        if seen.insert(item.clone()) {
            merged.push(item);
        }
    }
    merged
}
