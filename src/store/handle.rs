//! Lazily acquired, shared store handle.
//!
//! # Responsibilities
//! - Connect on first use, not at startup
//! - Serialize concurrent acquisitions so only one connect runs at a time
//! - Cache a successful connection; leave the cache empty after a failure
//! - Allow the cached connection to be dropped with `reset()`

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::store::{BlogStore, StoreError};

/// Opens a connection to the backing store.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn BlogStore>, StoreError>;
}

struct Connected {
    store: Arc<dyn BlogStore>,
}

/// Shared handle passed to every handler through the application state.
#[derive(Clone)]
pub struct StoreHandle {
    connector: Arc<dyn Connector>,
    cached: Arc<ArcSwapOption<Connected>>,
    connecting: Arc<Mutex<()>>,
}

impl StoreHandle {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            cached: Arc::new(ArcSwapOption::empty()),
            connecting: Arc::new(Mutex::new(())),
        }
    }

    /// A handle that is already connected to `store`.
    pub fn with_store(store: Arc<dyn BlogStore>) -> Self {
        let handle = Self::new(Arc::new(Fixed(store.clone())));
        handle.cached.store(Some(Arc::new(Connected { store })));
        handle
    }

    /// The cached store, connecting first if needed.
    pub async fn acquire(&self) -> Result<Arc<dyn BlogStore>, StoreError> {
        if let Some(connected) = self.cached.load_full() {
            return Ok(connected.store.clone());
        }

        let _guard = self.connecting.lock().await;

        // Another task may have connected while we waited.
        if let Some(connected) = self.cached.load_full() {
            return Ok(connected.store.clone());
        }

        match self.connector.connect().await {
            Ok(store) => {
                self.cached.store(Some(Arc::new(Connected {
                    store: store.clone(),
                })));
                tracing::info!("Store connected");
                Ok(store)
            }
            Err(e) => {
                tracing::error!(error = %e, "Store acquisition failed");
                metrics::record_store_acquire_failure();
                Err(e)
            }
        }
    }

    /// Drop the cached connection; the next `acquire` reconnects.
    pub fn reset(&self) {
        if self.cached.swap(None).is_some() {
            tracing::info!("Store handle reset");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.cached.load().is_some()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Always yields the same store.
struct Fixed(Arc<dyn BlogStore>);

#[async_trait]
impl Connector for Fixed {
    async fn connect(&self) -> Result<Arc<dyn BlogStore>, StoreError> {
        Ok(self.0.clone())
    }
}
