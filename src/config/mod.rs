//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize, overlay SECRET_KEY / API_TOKEN / ...)
//!     → validation.rs (semantic checks)
//!     → BlogConfig (validated, immutable)
//!     → shared via AppState with all handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment, never from compiled-in literals

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::BlogConfig;
pub use schema::{
    AuthConfig, CorsConfig, ListenerConfig, ObservabilityConfig, ProviderConfig, SecurityConfig,
    StoreConfig, SuggestConfig, TimeoutConfig,
};
