//! Bounded memoization for embedding lookups
//!
//! Embedding is a pure function of its input text, so repeated lookups for
//! the same fact set can be served from a least-recently-used cache keyed
//! by exact text.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use super::TextEmbedder;
use crate::Result;

/// Embedder wrapper with a bounded LRU cache keyed by exact text
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl<E> CachedEmbedder<E> {
    /// Wrap an embedder with a cache of the given capacity
    ///
    /// A capacity of zero is clamped to one.
    pub fn new(inner: E, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl<E: TextEmbedder> TextEmbedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.lock().await.get(text) {
            return Ok(hit.clone());
        }

        let embedding = self.inner.embed(text).await?;
        self.cache
            .lock()
            .await
            .put(text.to_string(), embedding.clone());

        Ok(embedding)
    }
}
