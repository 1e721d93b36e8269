//! Blog persistence.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → StoreHandle::acquire (lazy, single-flight, failure not cached)
//!         → Connector::connect (opens the backing store once)
//!     → BlogStore operation (atomic per blogId)
//! ```

pub mod handle;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::blog::{Blog, BlogPatch};

pub use handle::{Connector, StoreHandle};
pub use memory::{MemoryConnector, MemoryStore};

/// Errors surfaced by a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Blog with this blogId already exists")]
    Conflict(String),

    #[error("Blog not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to persist store: {0}")]
    Persistence(String),
}

/// Document store keyed by `blogId`.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a new record; `Conflict` if the id is taken. The existing record is untouched.
    async fn insert(&self, blog: Blog) -> Result<Blog, StoreError>;

    async fn get(&self, blog_id: &str) -> Result<Option<Blog>, StoreError>;

    /// Oldest record carrying `slug`.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, StoreError>;

    /// All records, newest `createdAt` first.
    async fn list(&self) -> Result<Vec<Blog>, StoreError>;

    async fn update(
        &self,
        blog_id: &str,
        patch: BlogPatch,
        now: DateTime<Utc>,
    ) -> Result<Blog, StoreError>;

    /// Remove and return the record.
    async fn delete(&self, blog_id: &str) -> Result<Blog, StoreError>;
}
