//! Blog records and the request payloads that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::blog::keywords::normalize_keywords;

/// A keyword attached to a blog post, with its search volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub name: String,
    #[serde(default)]
    pub volume: i64,
}

impl Keyword {
    pub fn new(name: impl Into<String>, volume: i64) -> Self {
        Self {
            name: name.into(),
            volume,
        }
    }
}

/// A persisted blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub blog_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub thumbnail: String,
    pub slug: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a payload could not be turned into a record or a change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlogError {
    #[error("Invalid request processing")]
    NotAnObject,

    #[error("Missing required core fields")]
    MissingCoreFields,

    #[error("blogId is required")]
    MissingBlogId,

    #[error("Field {0} must not be empty")]
    EmptyField(&'static str),

    #[error("Field {0} must be a string")]
    NotAString(&'static str),
}

/// Validated payload of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlog {
    pub blog_id: String,
    pub title: String,
    pub content: String,
    pub thumbnail: String,
    pub slug: String,
    pub seo_title: String,
    pub seo_description: String,
    pub keywords: Vec<Keyword>,
}

impl NewBlog {
    /// Parse a create body. `blogId`, `title`, `content` and `slug` must be
    /// non-empty strings; the SEO fields and thumbnail default to empty.
    pub fn from_value(body: &Value) -> Result<Self, BlogError> {
        let fields = body.as_object().ok_or(BlogError::NotAnObject)?;

        let core = |name: &str| -> Result<String, BlogError> {
            match fields.get(name) {
                Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
                _ => Err(BlogError::MissingCoreFields),
            }
        };

        Ok(Self {
            blog_id: core("blogId")?,
            title: core("title")?,
            content: core("content")?,
            slug: core("slug")?,
            thumbnail: optional_string(fields, "thumbnail")?.unwrap_or_default(),
            seo_title: optional_string(fields, "seoTitle")?.unwrap_or_default(),
            seo_description: optional_string(fields, "seoDescription")?.unwrap_or_default(),
            keywords: normalize_keywords(fields.get("keywords")),
        })
    }

    /// The record as first stored, stamped with `now`.
    pub fn into_blog(self, now: DateTime<Utc>) -> Blog {
        Blog {
            blog_id: self.blog_id,
            title: self.title,
            content: self.content,
            thumbnail: self.thumbnail,
            slug: self.slug,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            keywords: self.keywords,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    pub slug: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub keywords: Option<Vec<Keyword>>,
}

impl BlogPatch {
    /// Parse an update body into the target `blogId` and the change.
    ///
    /// The target comes from `path_id` when the route names it, else from the
    /// body. A `blogId` in the body never renames the record.
    pub fn from_value(body: &Value, path_id: Option<&str>) -> Result<(String, Self), BlogError> {
        let fields = body.as_object().ok_or(BlogError::NotAnObject)?;

        let blog_id = match path_id {
            Some(id) if !id.is_empty() => id.to_string(),
            Some(_) => return Err(BlogError::MissingBlogId),
            None => blog_id_of(body)?,
        };

        let patch = Self {
            title: required_if_present(fields, "title")?,
            content: required_if_present(fields, "content")?,
            slug: required_if_present(fields, "slug")?,
            thumbnail: optional_string(fields, "thumbnail")?,
            seo_title: optional_string(fields, "seoTitle")?,
            seo_description: optional_string(fields, "seoDescription")?,
            keywords: match fields.get("keywords") {
                None | Some(Value::Null) => None,
                raw => Some(normalize_keywords(raw)),
            },
        };

        Ok((blog_id, patch))
    }

    /// Apply the change to `blog`, bumping `updatedAt` to `now`.
    pub fn apply(self, blog: &mut Blog, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(content) = self.content {
            blog.content = content;
        }
        if let Some(thumbnail) = self.thumbnail {
            blog.thumbnail = thumbnail;
        }
        if let Some(slug) = self.slug {
            blog.slug = slug;
        }
        if let Some(seo_title) = self.seo_title {
            blog.seo_title = seo_title;
        }
        if let Some(seo_description) = self.seo_description {
            blog.seo_description = seo_description;
        }
        if let Some(keywords) = self.keywords {
            blog.keywords = keywords;
        }
        blog.updated_at = now;
    }
}

/// The non-empty `blogId` string of a request body.
pub fn blog_id_of(body: &Value) -> Result<String, BlogError> {
    let fields = body.as_object().ok_or(BlogError::NotAnObject)?;
    match fields.get("blogId") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(BlogError::MissingBlogId),
    }
}

fn optional_string(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, BlogError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(BlogError::NotAString(name)),
    }
}

fn required_if_present(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, BlogError> {
    match optional_string(fields, name)? {
        Some(s) if s.is_empty() => Err(BlogError::EmptyField(name)),
        other => Ok(other),
    }
}
