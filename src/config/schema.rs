//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::suggest::ProviderKind;

/// Root configuration for the blog service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BlogConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Shared secret and API token for signed writes.
    pub auth: AuthConfig,

    /// Cross-origin header policy.
    pub cors: CorsConfig,

    /// Upstream suggestion providers.
    pub suggest: SuggestConfig,

    /// Blog record storage.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Credentials for signed write requests.
///
/// Both values are normally supplied through the `SECRET_KEY` and `API_TOKEN`
/// environment variables rather than the config file.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC-SHA256 key shared with the publisher.
    pub secret_key: String,

    /// Bearer token expected in the `Authorization` header.
    pub api_token: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &redacted(&self.secret_key))
            .field("api_token", &redacted(&self.api_token))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// CORS policy applied to every response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins echoed back in `Access-Control-Allow-Origin`.
    pub allowed_origins: Vec<String>,

    /// Origin sent when the request has no `Origin` or an unlisted one.
    pub fallback_origin: String,

    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers`.
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://blogtraffic.vercel.app".to_string(),
            ],
            fallback_origin: "https://blogtraffic.vercel.app".to_string(),
            allow_methods: "GET, POST, PATCH, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}

/// Suggestion aggregation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Providers in merge priority order.
    pub providers: Vec<ProviderConfig>,

    /// Per-attempt upstream timeout in milliseconds.
    pub timeout_ms: u64,

    /// Pause before the single retry after a network failure, in milliseconds.
    pub retry_backoff_ms: u64,

    /// User-Agent sent to upstream providers.
    pub user_agent: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfig::new(ProviderKind::Bing),
                ProviderConfig::new(ProviderKind::DuckDuckGo),
                ProviderConfig::new(ProviderKind::Yahoo),
            ],
            timeout_ms: 5000,
            retry_backoff_ms: 300,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// One upstream suggestion provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Which response contract the provider speaks.
    pub kind: ProviderKind,

    /// Endpoint override. When unset the provider's public endpoint is used.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    /// Provider config pointing at the public endpoint.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            endpoint: None,
        }
    }

    /// Provider config pointing at a custom endpoint.
    pub fn with_endpoint(kind: ProviderKind, endpoint: impl Into<String>) -> Self {
        Self {
            kind,
            endpoint: Some(endpoint.into()),
        }
    }

    /// Endpoint the provider will be queried at.
    pub fn resolved_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the store. Records are kept in memory only when unset.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
