//! In-process blog store with optional JSON file persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::blog::{Blog, BlogPatch};
use crate::config::StoreConfig;
use crate::store::handle::Connector;
use crate::store::{BlogStore, StoreError};

/// A concurrent map of records, rewritten to `path` after every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blogs: Arc<DashMap<String, Blog>>,
    path: Option<PathBuf>,
    /// Serializes file rewrites.
    save_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// An empty store that never touches disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading it if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let store = Self {
            path: Some(path.clone()),
            ..Self::default()
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let blogs: Vec<Blog> = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Unavailable(format!("{}: {e}", path.display()))
                })?;
                for blog in blogs {
                    store.blogs.insert(blog.blog_id.clone(), blog);
                }
                tracing::info!(
                    path = %path.display(),
                    count = store.blogs.len(),
                    "Loaded blogs from store file"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Store file not found, starting empty");
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!("{}: {e}", path.display())));
            }
        }

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.blogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blogs.is_empty()
    }

    fn snapshot(&self) -> Vec<Blog> {
        let mut blogs: Vec<Blog> = self.blogs.iter().map(|r| r.value().clone()).collect();
        blogs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.blog_id.cmp(&b.blog_id))
        });
        blogs
    }

    /// Rewrite the backing file via a temp file and rename.
    async fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.save_lock.lock().await;
        let json = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), count = self.blogs.len(), "Saved store file");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn insert(&self, blog: Blog) -> Result<Blog, StoreError> {
        match self.blogs.entry(blog.blog_id.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict(blog.blog_id)),
            Entry::Vacant(slot) => {
                slot.insert(blog.clone());
            }
        }
        if let Err(e) = self.save().await {
            self.blogs.remove(&blog.blog_id);
            return Err(e);
        }
        Ok(blog)
    }

    async fn get(&self, blog_id: &str) -> Result<Option<Blog>, StoreError> {
        Ok(self.blogs.get(blog_id).map(|r| r.value().clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, StoreError> {
        Ok(self
            .blogs
            .iter()
            .filter(|r| r.value().slug == slug)
            .map(|r| r.value().clone())
            .min_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.blog_id.cmp(&b.blog_id))
            }))
    }

    async fn list(&self) -> Result<Vec<Blog>, StoreError> {
        Ok(self.snapshot())
    }

    async fn update(
        &self,
        blog_id: &str,
        patch: BlogPatch,
        now: DateTime<Utc>,
    ) -> Result<Blog, StoreError> {
        let (previous, updated) = {
            let mut entry = self.blogs.get_mut(blog_id).ok_or(StoreError::NotFound)?;
            let previous = entry.value().clone();
            patch.apply(entry.value_mut(), now);
            (previous, entry.value().clone())
        };
        if let Err(e) = self.save().await {
            self.blogs.insert(previous.blog_id.clone(), previous);
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete(&self, blog_id: &str) -> Result<Blog, StoreError> {
        let (_, removed) = self.blogs.remove(blog_id).ok_or(StoreError::NotFound)?;
        if let Err(e) = self.save().await {
            self.blogs
                .entry(removed.blog_id.clone())
                .or_insert(removed);
            return Err(e);
        }
        Ok(removed)
    }
}

/// Opens a [`MemoryStore`], from the configured file when there is one.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    path: Option<PathBuf>,
}

impl MemoryConnector {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.as_ref().map(PathBuf::from))
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn BlogStore>, StoreError> {
        let store = match &self.path {
            Some(path) => MemoryStore::open(path.clone()).await?,
            None => MemoryStore::new(),
        };
        Ok(Arc::new(store))
    }
}
