//! Text embedding: trait seam, hosted client, and bounded memoization

mod cache;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

pub use cache::CachedEmbedder;
pub use openai::OpenAiEmbedder;

/// Maps a text string to a fixed-length vector representing its meaning
///
/// The model behind this is a black box; only the text-in, vector-out
/// contract matters to callers.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Generate embedding for a single text
    ///
    /// # Errors
    ///
    /// Returns error if the embedding computation fails
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    ///
    /// # Errors
    ///
    /// Returns error if any embedding computation fails
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl<T: TextEmbedder + ?Sized> TextEmbedder for Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts).await
    }
}
