//! Keyword suggestion handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extract::QueryParams;
use crate::http::server::AppState;

#[derive(Debug, Default)]
pub struct DomainParams {
    pub keyword: Option<String>,
    pub country: Option<String>,
    pub market: Option<String>,
}

impl DomainParams {
    pub fn from_query(query: &QueryParams) -> Self {
        let get = |key| query.first(key).map(str::to_string);
        Self {
            keyword: get("keyword"),
            country: get("country"),
            market: get("market"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub success: bool,
    pub query: String,
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
}

/// `GET /api/domain?keyword=&country=&market=`
pub async fn domain(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<DomainResponse>, ApiError> {
    let params = DomainParams::from_query(&query);
    let aggregate = state
        .aggregator
        .aggregate(
            params.keyword.as_deref(),
            params.country.as_deref(),
            params.market.as_deref(),
        )
        .await?;

    Ok(Json(DomainResponse {
        success: true,
        query: aggregate.query,
        sources: aggregate.sources,
        keywords: aggregate.suggestions,
    }))
}
