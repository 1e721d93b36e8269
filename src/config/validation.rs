//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Refuse to start without credentials for signed writes
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate or unreachable suggestion providers
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BlogConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("auth.secret_key is empty (set SECRET_KEY)")]
    MissingSecret,

    #[error("auth.api_token is empty (set API_TOKEN)")]
    MissingApiToken,

    #[error("invalid {field}: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("suggest.providers is empty")]
    NoProviders,

    #[error("suggest provider '{0}' is listed more than once")]
    DuplicateProvider(String),

    #[error("invalid endpoint for suggest provider '{provider}': {reason}")]
    InvalidEndpoint { provider: String, reason: String },

    #[error("cors.fallback_origin is empty")]
    MissingFallbackOrigin,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &BlogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.secret_key.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }
    if config.auth.api_token.trim().is_empty() {
        errors.push(ValidationError::MissingApiToken);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.suggest.timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("suggest.timeout_ms"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if config.suggest.providers.is_empty() {
        errors.push(ValidationError::NoProviders);
    }
    let mut seen = HashSet::new();
    for provider in &config.suggest.providers {
        let name = provider.kind.name();
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateProvider(name.to_string()));
        }
        if let Err(e) = url::Url::parse(&provider.resolved_endpoint()) {
            errors.push(ValidationError::InvalidEndpoint {
                provider: name.to_string(),
                reason: e.to_string(),
            });
        }
    }

    if config.cors.fallback_origin.trim().is_empty() {
        errors.push(ValidationError::MissingFallbackOrigin);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
