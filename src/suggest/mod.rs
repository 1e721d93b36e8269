//! Keyword suggestion aggregation.
//!
//! # Data Flow
//! ```text
//! GET /api/domain?keyword=&country=&market=
//!     → SuggestionQuery::new (validation, defaults; no upstream call on error)
//!     → aggregator.rs (concurrent fan-out to every provider)
//!         → fetcher.rs (per-attempt timeout, one retry on network failure)
//!             → provider.rs (build URL, call upstream, unwrap response shape)
//!     → merge in provider priority order, exact-match dedup
//! ```
//!
//! # Design Decisions
//! - Provider failures are absorbed in the fetcher and surface as empty lists
//! - Merge order is the configured provider order, never completion order

pub mod aggregator;
pub mod fetcher;
pub mod provider;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use aggregator::{merge_unique, Aggregate, Aggregator};
pub use fetcher::Fetcher;
pub use provider::{FetchError, HttpProvider, SuggestionSource};

/// Shortest keyword, in UTF-16 code units, that is sent upstream.
pub const MIN_KEYWORD_UNITS: usize = 2;
/// Country used when the request does not name one.
pub const DEFAULT_COUNTRY: &str = "US";
/// Market used when the request does not name one.
pub const DEFAULT_MARKET: &str = "en-US";

/// The upstream search engines we know how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl ProviderKind {
    /// Name reported in the `sources` list and used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
            Self::Yahoo => "yahoo",
        }
    }

    /// Public autocomplete endpoint.
    pub fn default_endpoint(&self) -> String {
        match self {
            Self::Bing => "https://api.bing.com/osjson.aspx",
            Self::DuckDuckGo => "https://duckduckgo.com/ac/",
            Self::Yahoo => "https://search.yahoo.com/sugg/gossip/",
        }
        .to_string()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a suggestion request was refused before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Keyword parameter is required")]
    MissingKeyword,

    #[error("Keyword must be at least 2 characters long")]
    KeywordTooShort,
}

/// A validated suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionQuery {
    pub keyword: String,
    pub country: String,
    pub market: String,
}

impl SuggestionQuery {
    /// Validate the keyword and fill in defaults for blank country/market.
    pub fn new(
        keyword: Option<&str>,
        country: Option<&str>,
        market: Option<&str>,
    ) -> Result<Self, QueryError> {
        let keyword = match keyword {
            Some(k) if !k.is_empty() => k,
            _ => return Err(QueryError::MissingKeyword),
        };
        if keyword.encode_utf16().count() < MIN_KEYWORD_UNITS {
            return Err(QueryError::KeywordTooShort);
        }

        Ok(Self {
            keyword: keyword.to_string(),
            country: or_default(country, DEFAULT_COUNTRY),
            market: or_default(market, DEFAULT_MARKET),
        })
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
