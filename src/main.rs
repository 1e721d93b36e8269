//! blogtraffic server.
//!
//! ```text
//!     Client ──▶ CORS ─▶ request id ─▶ trace ─▶ timeout/limits ─▶ router
//!                                                                 │
//!              ┌──────────────────────────┬──────────────────────┤
//!              ▼                          ▼                      ▼
//!        signed writes              GET /api/blogs         GET /api/domain
//!   (raw bytes → HMAC verify)            │                      │
//!              │                         ▼                      ▼
//!              └──────────────────▶ StoreHandle           Aggregator
//!                                  (lazy, shared)    (bing │ duckduckgo │ yahoo)
//! ```
//!
//! Configuration comes from the TOML file named by `BLOGTRAFFIC_CONFIG`, or
//! from defaults, always overlaid with `SECRET_KEY`, `API_TOKEN`,
//! `BLOG_STORE_PATH` and `BIND_ADDRESS`.

use std::path::Path;

use tokio::net::TcpListener;

use blogtraffic::config::{load_config, load_from_env};
use blogtraffic::http::HttpServer;
use blogtraffic::lifecycle::{terminate_signal, Shutdown};
use blogtraffic::observability::{init_logging, init_metrics};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "BLOGTRAFFIC_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => load_config(Path::new(&path))?,
        _ => load_from_env()?,
    };

    init_logging(&config.observability);
    tracing::info!("blogtraffic v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        providers = config.suggest.providers.len(),
        store_path = config.store.path.as_deref().unwrap_or("<memory>"),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();
    tokio::spawn(async move {
        terminate_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server
        .run(listener, blogtraffic::lifecycle::shutdown::wait(stopped))
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
