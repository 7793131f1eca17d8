//! Recall Gateway - memory-augmented chat over HTTP
//!
//! This library provides the core functionality for the recall gateway:
//! - An append-only fact store used as conversational memory
//! - Embedding-based relevance retrieval over stored facts
//! - Prompt composition and a hosted generation client
//! - Post-turn fact extraction (rule-based, then LLM-summarized)
//!
//! # Architecture
//!
//! ```text
//! POST /chat
//!     │
//!     ▼
//! ┌──────────────┐   snapshot   ┌────────────┐
//! │ chat handler │◄─────────────│ fact store │
//! └──────┬───────┘              └─────▲──────┘
//!        │ retrieve                   │ persist (≤1 fact/turn)
//!        ▼                            │
//! ┌──────────────┐              ┌─────┴──────┐
//! │  retriever   │              │ extractor  │
//! │ (embeddings) │              └─────▲──────┘
//! └──────┬───────┘                    │
//!        │ compose prompt             │
//!        ▼                            │
//! ┌──────────────┐  reply             │
//! │  generator   │────────────────────┘
//! └──────────────┘
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod genai;
pub mod prompt;
pub mod retrieval;

pub use config::Config;
pub use db::{DbConn, DbPool, Fact, FactRepo};
pub use embedding::{CachedEmbedder, OpenAiEmbedder, TextEmbedder};
pub use error::{Error, Result};
pub use extract::{FactExtractor, extract_name_fact};
pub use genai::{GeminiClient, Generator};
pub use retrieval::{RELEVANCE_THRESHOLD, Retriever, cosine_similarity, most_relevant};
