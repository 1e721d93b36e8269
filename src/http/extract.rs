//! Request extractors.
//!
//! Signed bodies are buffered as raw bytes, authenticated against those exact
//! bytes, and only then parsed as JSON. Query strings are kept as ordered
//! pairs so a repeated key resolves to its first value.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::auth::{now_millis, Authenticator, Credentials, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::http::error::ApiError;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Message returned when an authenticated body is not valid JSON.
pub const INVALID_BODY: &str = "Invalid request processing";

/// Decoded query pairs in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    /// First value given for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self(pairs))
    }
}

/// An authenticated request body, parsed as JSON.
#[derive(Debug, Clone)]
pub struct SignedJson(pub Value);

impl<S> FromRequest<S> for SignedJson
where
    Arc<Authenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<Authenticator>::from_ref(state);

        let request_id = req.request_id().to_string();
        let headers = req.headers().clone();
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let credentials = Credentials {
            authorization: header(axum::http::header::AUTHORIZATION.as_str()),
            signature: header(SIGNATURE_HEADER),
            timestamp: header(TIMESTAMP_HEADER),
        };

        if let Err(rejection) = authenticator.authenticate(&credentials, &body, now_millis()) {
            tracing::warn!(
                request_id = %request_id,
                reason = rejection.reason(),
                "Rejected signed request"
            );
            metrics::record_auth_rejection(rejection.reason());
            return Err(ApiError::from(rejection).into_response());
        }

        let value = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(request_id = %request_id, error = %e, "Signed body is not JSON");
            ApiError::Validation(INVALID_BODY.to_string()).into_response()
        })?;

        Ok(Self(value))
    }
}
