//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the application state (authenticator, aggregator, store handle)
//! - Create the Axum router with all handlers
//! - Wire up middleware (CORS, request ID, tracing, timeout, body limit, metrics)
//! - Serve on a listener until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, FromRef, MatchedPath, Request};
use axum::http::header::{HeaderValue, X_CONTENT_TYPE_OPTIONS};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Authenticator;
use crate::config::BlogConfig;
use crate::http::blogs::{create_blog, delete_blog, get_blogs, update_blog, update_blog_by_path};
use crate::http::cors::{cors_middleware, CorsPolicy};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::suggest::domain;
use crate::observability::metrics;
use crate::store::{MemoryConnector, StoreHandle};
use crate::suggest::aggregator::{Aggregator, SetupError};

/// Errors building the server from config.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Suggest(#[from] SetupError),

    #[error("invalid CORS header value: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BlogConfig>,
    pub authenticator: Arc<Authenticator>,
    pub aggregator: Arc<Aggregator>,
    pub store: StoreHandle,
}

impl AppState {
    /// State wired to real providers and the bundled store.
    pub fn from_config(config: BlogConfig) -> Result<Self, ServerError> {
        let aggregator = Aggregator::from_config(&config.suggest)?;
        let store = StoreHandle::new(Arc::new(MemoryConnector::from_config(&config.store)));
        Ok(Self::new(config, aggregator, store))
    }

    pub fn new(config: BlogConfig, aggregator: Aggregator, store: StoreHandle) -> Self {
        Self {
            authenticator: Arc::new(Authenticator::from_config(&config.auth)),
            aggregator: Arc::new(aggregator),
            store,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}

/// HTTP server for the blog API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server from config alone.
    pub fn new(config: BlogConfig) -> Result<Self, ServerError> {
        Self::with_state(AppState::from_config(config)?)
    }

    /// Create a server around prepared state.
    pub fn with_state(state: AppState) -> Result<Self, ServerError> {
        Ok(Self {
            router: build_router(state)?,
        })
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Result<Router, ServerError> {
    let config = state.config.clone();
    let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);

    let router = Router::new()
        .route("/health", get(health))
        .route("/api/domain", get(domain))
        .route(
            "/api/blogs",
            get(get_blogs)
                .post(create_blog)
                .patch(update_blog)
                .delete(delete_blog),
        )
        .route("/api/blogs/add", post(create_blog))
        .route("/api/blogs/{blogId}/update", patch(update_blog_by_path))
        .route("/api/blogs/delete", axum::routing::delete(delete_blog))
        .with_state(state);

    let router = if config.security.enable_headers {
        router.layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
    } else {
        router
    };

    // Outermost layer last: request IDs wrap tracing, CORS wraps everything.
    Ok(router
        .layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %req.request_id(),
            )
        }))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .layer(middleware::from_fn_with_state(cors, cors_middleware)))
}

async fn health() -> &'static str {
    "ok"
}

/// Count and time every request by its matched route.
async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
