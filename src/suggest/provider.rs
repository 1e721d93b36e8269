//! Upstream autocomplete providers.
//!
//! Each provider builds its own request URL and unwraps its own response
//! shape into a flat list of suggestion strings. A single call here is one
//! attempt; deadlines and retries belong to the fetcher.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ProviderConfig;
use crate::suggest::{ProviderKind, SuggestionQuery};

/// Why one attempt against a provider produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Only transport-level failures are worth a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// A source of keyword suggestions.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Name reported in responses, logs and metrics.
    fn name(&self) -> &str;

    /// Perform one attempt for `query`.
    async fn request(&self, query: &SuggestionQuery) -> Result<Vec<String>, FetchError>;
}

/// A provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    kind: ProviderKind,
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(kind: ProviderKind, endpoint: Url, client: reqwest::Client) -> Self {
        Self {
            kind,
            endpoint,
            client,
        }
    }

    /// Build a provider from config, sharing `client` across providers.
    pub fn from_config(
        config: &ProviderConfig,
        client: reqwest::Client,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&config.resolved_endpoint())?;
        Ok(Self::new(config.kind, endpoint, client))
    }

    /// The full request URL for `query`.
    pub fn request_url(&self, query: &SuggestionQuery) -> Result<Url, url::ParseError> {
        let mut url = match self.kind {
            ProviderKind::Yahoo => {
                let segment = format!("gossip-{}-ura/", yahoo_region(&query.country));
                directory(&self.endpoint).join(&segment)?
            }
            _ => self.endpoint.clone(),
        };

        {
            let mut pairs = url.query_pairs_mut();
            match self.kind {
                ProviderKind::Bing => {
                    pairs
                        .append_pair("query", &query.keyword)
                        .append_pair("cc", &query.country)
                        .append_pair("mkt", &query.market);
                }
                ProviderKind::DuckDuckGo => {
                    pairs
                        .append_pair("q", &query.keyword)
                        .append_pair("type", "list");
                }
                ProviderKind::Yahoo => {
                    pairs
                        .append_pair("output", "sd1")
                        .append_pair("command", &query.keyword);
                }
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl SuggestionSource for HttpProvider {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn request(&self, query: &SuggestionQuery) -> Result<Vec<String>, FetchError> {
        let url = self
            .request_url(query)
            .map_err(|e| FetchError::Malformed(format!("bad request url: {e}")))?;

        tracing::debug!(provider = self.name(), url = %url, "Querying suggestion provider");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        parse_response(self.kind, &body)
    }
}

/// Unwrap a provider's response body into suggestion strings.
pub fn parse_response(kind: ProviderKind, body: &[u8]) -> Result<Vec<String>, FetchError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    match kind {
        // OpenSearch: ["query", ["s1", "s2", ...], ...]
        ProviderKind::Bing | ProviderKind::DuckDuckGo => value
            .get(1)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .ok_or_else(|| FetchError::Malformed("expected [query, [suggestions]]".into())),

        // {"r": [{"k": "s1"}, ...]}
        ProviderKind::Yahoo => value
            .get("r")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("k").and_then(Value::as_str))
                    .filter(|k| !k.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .ok_or_else(|| FetchError::Malformed("expected {\"r\": [...]}".into())),
    }
}

/// Yahoo's region path segment: lowercase ASCII letters and digits only.
fn yahoo_region(country: &str) -> String {
    let region: String = country
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if region.is_empty() {
        "us".to_string()
    } else {
        region
    }
}

/// `url` with a trailing slash so `join` appends rather than replaces.
fn directory(url: &Url) -> Url {
    let mut dir = url.clone();
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir.set_query(None);
    dir
}
