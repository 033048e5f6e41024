//! Index storage backends.
//!
//! A store holds one [`DocumentIndex`] per document id. Backends are
//! swappable behind the [`IndexStore`] trait; the crate ships an in-memory
//! implementation suitable for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::index::DocumentIndex;

/// Aggregate counts across every stored index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of documents with a published index.
    pub document_count: usize,
    /// Total chunks across all stored indexes.
    pub chunk_count: usize,
    /// Total indexed tokens across all stored indexes.
    pub token_count: usize,
}

/// Storage for built document indexes.
///
/// Implementations must swap whole indexes atomically: a reader sees either
/// the previous complete index for a document or the new complete index,
/// never a partial one.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Fetch the index for a document, if one has been published.
    async fn get(&self, document_id: &str) -> Result<Option<Arc<DocumentIndex>>>;

    /// Publish an index, replacing any previous index for the same document.
    async fn put(&self, index: Arc<DocumentIndex>) -> Result<()>;

    /// Remove a document's index. Returns `false` if none was stored.
    async fn remove(&self, document_id: &str) -> Result<bool>;

    /// Ids of all documents with a published index, ascending.
    async fn document_ids(&self) -> Result<Vec<String>>;

    /// Drop every stored index.
    async fn clear(&self) -> Result<()>;

    /// Aggregate counts across the store.
    async fn stats(&self) -> Result<StoreStats>;

    /// Whether a document has a published index.
    async fn contains(&self, document_id: &str) -> Result<bool> {
        Ok(self.get(document_id).await?.is_some())
    }
}

/// In-memory index store keyed by document id.
///
/// Indexes are shared out as [`Arc`]s, so queries keep reading the snapshot
/// they fetched even while a rebuild publishes a replacement.
#[derive(Debug, Default)]
pub struct InMemoryIndexStore {
    indexes: RwLock<HashMap<String, Arc<DocumentIndex>>>,
}

impl InMemoryIndexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn get(&self, document_id: &str) -> Result<Option<Arc<DocumentIndex>>> {
        let indexes = self.indexes.read().await;
        Ok(indexes.get(document_id).cloned())
    }

    async fn put(&self, index: Arc<DocumentIndex>) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.insert(index.document_id.clone(), index);
        Ok(())
    }

    async fn remove(&self, document_id: &str) -> Result<bool> {
        let mut indexes = self.indexes.write().await;
        Ok(indexes.remove(document_id).is_some())
    }

    async fn document_ids(&self) -> Result<Vec<String>> {
        let indexes = self.indexes.read().await;
        let mut ids: Vec<String> = indexes.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn clear(&self) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let indexes = self.indexes.read().await;
        let chunk_count = indexes.values().map(|index| index.chunks.len()).sum();
        let token_count = indexes.values().map(|index| index.token_count).sum();
        Ok(StoreStats { document_count: indexes.len(), chunk_count, token_count })
    }
}
