//! CORS headers on every response.
//!
//! The allowed origin is echoed back only when it is on the allow-list;
//! anything else gets the fallback origin. `OPTIONS` never reaches a handler.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::config::CorsConfig;

/// Fixed CORS policy, resolved once from config.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    fallback_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, axum::http::header::InvalidHeaderValue> {
        Ok(Self {
            allowed_origins: config.allowed_origins.clone(),
            fallback_origin: HeaderValue::from_str(&config.fallback_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
        })
    }

    /// The `Access-Control-Allow-Origin` value for a request's `Origin`.
    pub fn origin_for(&self, origin: Option<&HeaderValue>) -> HeaderValue {
        origin
            .filter(|o| {
                o.to_str()
                    .map(|o| self.allowed_origins.iter().any(|a| a == o))
                    .unwrap_or(false)
            })
            .cloned()
            .unwrap_or_else(|| self.fallback_origin.clone())
    }

    /// Overwrite the CORS headers in `headers`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin_for(origin));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

/// Middleware: answer `OPTIONS` directly and decorate every other response.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(ORIGIN).cloned();

    let mut response = if req.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::OK;
        preflight
    } else {
        next.run(req).await
    };

    policy.apply(origin.as_ref(), response.headers_mut());
    response
}
