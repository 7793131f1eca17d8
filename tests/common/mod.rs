//! Shared test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recall_gateway::api::{self, ApiState};
use recall_gateway::db::{self, DbPool, FactRepo};
use recall_gateway::embedding::TextEmbedder;
use recall_gateway::extract::FactExtractor;
use recall_gateway::genai::Generator;
use recall_gateway::retrieval::Retriever;
use recall_gateway::{Error, Result};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Embedder returning fixed vectors from a lookup table
///
/// Unknown text gets an all-zero vector, which scores 0.0 against anything.
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new(entries: &[(&str, &[f32])]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, vec)| ((*text).to_string(), vec.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl TextEmbedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0, 0.0, 0.0]))
    }
}

/// Generator returning a canned reply and capturing every prompt it sees
pub struct CapturingGenerator {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CapturingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Generator for CapturingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Generator whose every call fails
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Generation("service unavailable".to_string()))
    }
}

/// Build a test API router over the given doubles
pub fn build_test_router(
    db: DbPool,
    embedder: Arc<dyn TextEmbedder>,
    generator: Arc<dyn Generator>,
) -> axum::Router {
    let fact_repo = FactRepo::new(db.clone());

    let state = Arc::new(ApiState {
        db,
        fact_repo: fact_repo.clone(),
        retriever: Retriever::new(embedder),
        generator: generator.clone(),
        extractor: FactExtractor::new(generator, fact_repo),
        subject_id: None,
    });

    api::router(state, None)
}
