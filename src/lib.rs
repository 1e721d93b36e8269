//! Blog content API with signed writes and keyword suggestion aggregation.

pub mod auth;
pub mod blog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;
pub mod suggest;

pub use config::schema::BlogConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
