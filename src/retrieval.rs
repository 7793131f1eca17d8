//! Relevance retrieval over stored facts
//!
//! Selects at most one fact from a candidate set, the one most semantically
//! related to the incoming query, subject to a minimum-confidence threshold.

use crate::embedding::TextEmbedder;

/// Minimum similarity a candidate must strictly exceed to be injected as
/// context
pub const RELEVANCE_THRESHOLD: f32 = 0.7;

/// Compute cosine similarity between two vectors
///
/// Returns a value in `[-1.0, 1.0]` where 1.0 is identical direction.
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    dot / denom
}

/// Stable argmax over embedded candidates
///
/// Returns the candidate text with the highest similarity to the query
/// embedding, provided that similarity strictly exceeds
/// [`RELEVANCE_THRESHOLD`]. On equal maxima the earliest candidate in input
/// order wins. Pure function of its inputs.
#[must_use]
pub fn most_relevant<'a>(
    query_embedding: &[f32],
    candidates: &'a [(String, Vec<f32>)],
) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    let mut best_score = f32::NEG_INFINITY;

    for (text, embedding) in candidates {
        let score = cosine_similarity(query_embedding, embedding);
        // Strict comparison keeps the earliest candidate on ties
        if score > best_score {
            best_score = score;
            best = Some(text);
        }
    }

    if best_score > RELEVANCE_THRESHOLD {
        best
    } else {
        None
    }
}

/// Relevance retriever: embeds a query and its candidates, then selects the
/// single most relevant candidate
#[derive(Debug, Clone)]
pub struct Retriever<E> {
    embedder: E,
}

impl<E: TextEmbedder> Retriever<E> {
    /// Create a new retriever over the given embedder
    pub const fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Retrieve the most relevant candidate for a query, if any clears the
    /// threshold
    ///
    /// Fails closed: an embedding failure for the query or any candidate
    /// logs a warning and yields `None` instead of surfacing an error to
    /// the caller.
    pub async fn retrieve(&self, query: &str, candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }

        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed, skipping retrieval");
                return None;
            }
        };

        let texts: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!(error = %e, "candidate embedding failed, skipping retrieval");
                return None;
            }
        };

        let scored: Vec<(String, Vec<f32>)> =
            candidates.iter().cloned().zip(embeddings).collect();

        most_relevant(&query_embedding, &scored).map(ToString::to_string)
    }
}
