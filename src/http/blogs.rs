//! Blog CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::blog::{blog_id_of, BlogPatch, NewBlog};
use crate::http::error::ApiError;
use crate::http::extract::{QueryParams, SignedJson};
use crate::http::server::AppState;

/// `GET /api/blogs` lookup parameters; empty values are ignored.
#[derive(Debug, Default)]
pub struct BlogLookup {
    pub blog_id: Option<String>,
    pub slug: Option<String>,
}

impl BlogLookup {
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            blog_id: query.first("blogId").map(str::to_string),
            slug: query.first("slug").map(str::to_string),
        }
    }
}

/// `GET /api/blogs`: one record by `blogId` or `slug`, else all newest-first.
pub async fn get_blogs(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Response, ApiError> {
    let lookup = BlogLookup::from_query(&query);
    let store = state.store.acquire().await?;

    if let Some(blog_id) = lookup.blog_id.filter(|id| !id.is_empty()) {
        let blog = store.get(&blog_id).await?.ok_or(ApiError::NotFound)?;
        return Ok(Json(blog).into_response());
    }

    if let Some(slug) = lookup.slug.filter(|s| !s.is_empty()) {
        let blog = store.find_by_slug(&slug).await?.ok_or(ApiError::NotFound)?;
        return Ok(Json(blog).into_response());
    }

    Ok(Json(store.list().await?).into_response())
}

/// `POST /api/blogs` and `POST /api/blogs/add`.
pub async fn create_blog(
    State(state): State<AppState>,
    SignedJson(body): SignedJson,
) -> Result<Response, ApiError> {
    let new_blog = NewBlog::from_value(&body)?;
    let store = state.store.acquire().await?;

    let blog = store.insert(new_blog.into_blog(Utc::now())).await?;
    tracing::info!(blog_id = %blog.blog_id, slug = %blog.slug, "Blog created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Blog added successfully", "blog": blog })),
    )
        .into_response())
}

/// `PATCH /api/blogs`, target named by the body's `blogId`.
pub async fn update_blog(
    State(state): State<AppState>,
    SignedJson(body): SignedJson,
) -> Result<Response, ApiError> {
    apply_update(state, &body, None).await
}

/// `PATCH /api/blogs/{blogId}/update`, target named by the path.
pub async fn update_blog_by_path(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
    SignedJson(body): SignedJson,
) -> Result<Response, ApiError> {
    apply_update(state, &body, Some(&blog_id)).await
}

async fn apply_update(
    state: AppState,
    body: &serde_json::Value,
    path_id: Option<&str>,
) -> Result<Response, ApiError> {
    let (blog_id, patch) = BlogPatch::from_value(body, path_id)?;
    let store = state.store.acquire().await?;

    let blog = store.update(&blog_id, patch, Utc::now()).await?;
    tracing::info!(blog_id = %blog.blog_id, "Blog updated");

    Ok(Json(json!({ "message": "Blog updated successfully", "blog": blog })).into_response())
}

/// `DELETE /api/blogs` and `DELETE /api/blogs/delete`.
pub async fn delete_blog(
    State(state): State<AppState>,
    SignedJson(body): SignedJson,
) -> Result<Response, ApiError> {
    let blog_id = blog_id_of(&body)?;
    let store = state.store.acquire().await?;

    store.delete(&blog_id).await?;
    tracing::info!(blog_id = %blog_id, "Blog deleted");

    Ok(Json(json!({ "message": "Blog deleted successfully" })).into_response())
}
