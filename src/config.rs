//! Configuration management for the recall gateway

use std::path::PathBuf;

use crate::{Error, Result};

/// Default generation model (Google Gemini chat completion)
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// Default embedding model (`OpenAI` embeddings API)
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default capacity for the embedding memoization cache
pub const DEFAULT_EMBED_CACHE_SIZE: usize = 256;

/// Recall gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (fact database)
    pub data_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI), if any
    pub static_dir: Option<PathBuf>,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Generation model identifier
    pub generation_model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Capacity of the bounded embedding cache
    pub embed_cache_size: usize,
}

/// API keys for external services
///
/// Both keys are required: the process fails fast at startup if either
/// is missing.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    /// Google Gemini API key (generation service)
    pub gemini: String,

    /// `OpenAI` API key (hosted embedder)
    pub openai: String,
}

/// Return the default data directory, creating it if needed
///
/// Uses `~/.local/share/recall/` on Linux
#[must_use]
pub fn default_data_dir() -> PathBuf {
    let data_dir = directories::ProjectDirs::from("dev", "recall", "recall")
        .map_or_else(|| PathBuf::from(".recall"), |d| d.data_dir().to_path_buf());

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::warn!(
            path = %data_dir.display(),
            error = %e,
            "failed to create data directory"
        );
    }

    data_dir
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns error if a required credential is absent. This is the
    /// fail-fast startup check: nothing is served without both keys.
    pub fn load(
        port: u16,
        data_dir: Option<PathBuf>,
        static_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let gemini = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY not set".to_string()))?;
        let openai = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY not set".to_string()))?;

        let generation_model = std::env::var("RECALL_GENERATION_MODEL")
            .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string());
        let embedding_model = std::env::var("RECALL_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let embed_cache_size = std::env::var("RECALL_EMBED_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EMBED_CACHE_SIZE);

        Ok(Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            port,
            static_dir,
            api_keys: ApiKeys { gemini, openai },
            generation_model,
            embedding_model,
            embed_cache_size,
        })
    }
}
