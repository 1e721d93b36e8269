//! Metrics collection and exposition.
//!
//! # Metrics
//! - `blog_requests_total` (counter): requests by method, route, status
//! - `blog_request_duration_seconds` (histogram): request latency by route
//! - `suggest_provider_results_total` (counter): suggestions returned, by provider
//! - `suggest_provider_failures_total` (counter): degraded fetches, by provider and kind
//! - `suggest_provider_duration_seconds` (histogram): fetch latency incl. retry, by provider
//! - `auth_rejections_total` (counter): rejected signed requests, by reason
//! - `store_acquire_failures_total` (counter): failed store connections
//!
//! Recording is a no-op until a recorder is installed by [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "blog_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("blog_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_provider_result(provider: &str, count: usize, start: Instant) {
    counter!("suggest_provider_results_total", "provider" => provider.to_string())
        .increment(count as u64);
    histogram!("suggest_provider_duration_seconds", "provider" => provider.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_provider_failure(provider: &str, kind: &'static str, start: Instant) {
    counter!(
        "suggest_provider_failures_total",
        "provider" => provider.to_string(),
        "kind" => kind
    )
    .increment(1);
    histogram!("suggest_provider_duration_seconds", "provider" => provider.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_rejection(reason: &'static str) {
    counter!("auth_rejections_total", "reason" => reason).increment(1);
}

pub fn record_store_acquire_failure() {
    counter!("store_acquire_failures_total").increment(1);
}
