//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BlogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the HMAC secret.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "API_TOKEN";
/// Environment variable holding the store file path.
pub const ENV_STORE_PATH: &str = "BLOG_STORE_PATH";
/// Environment variable overriding the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: BlogConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a config from defaults plus environment variables only.
pub fn load_from_env() -> Result<BlogConfig, ConfigError> {
    let mut config = BlogConfig::default();

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay secrets and deployment-specific values taken from `lookup`.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a
/// value from the file.
pub fn apply_env_overrides<F>(config: &mut BlogConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(secret) = get(ENV_SECRET_KEY) {
        config.auth.secret_key = secret;
    }
    if let Some(token) = get(ENV_API_TOKEN) {
        config.auth.api_token = token;
    }
    if let Some(path) = get(ENV_STORE_PATH) {
        config.store.path = Some(path);
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SECRET_KEY, "s3cret"),
            (ENV_API_TOKEN, "tok"),
            (ENV_BIND_ADDRESS, ""),
        ]
        .into_iter()
        .collect();

        let mut config = BlogConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.auth.secret_key, "s3cret");
        assert_eq!(config.auth.api_token, "tok");
        // Blank values leave the default alone.
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let raw = r#"
            [auth]
            secret_key = "abc"
            api_token = "def"

            [cors]
            allowed_origins = ["https://example.com"]
            fallback_origin = "https://example.com"

            [[suggest.providers]]
            kind = "yahoo"
            endpoint = "http://127.0.0.1:9999/sugg"

            [[suggest.providers]]
            kind = "bing"
        "#;
        let config: BlogConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.cors.allowed_origins, vec!["https://example.com"]);
        assert_eq!(config.cors.allow_methods, "GET, POST, PATCH, DELETE, OPTIONS");
        assert_eq!(config.suggest.providers.len(), 2);
        assert_eq!(config.suggest.timeout_ms, 5000);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
