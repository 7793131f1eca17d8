//! HTTP API server for the recall gateway

pub mod chat;
pub mod health;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::db::{DbPool, FactRepo};
use crate::embedding::TextEmbedder;
use crate::extract::FactExtractor;
use crate::genai::Generator;
use crate::retrieval::Retriever;

/// Shared state for API handlers
pub struct ApiState {
    pub db: DbPool,
    pub fact_repo: FactRepo,
    pub retriever: Retriever<Arc<dyn TextEmbedder>>,
    pub generator: Arc<dyn Generator>,
    pub extractor: FactExtractor<Arc<dyn Generator>>,
    /// Subject scope for fact reads and writes. `None` keeps the observed
    /// behavior: one globally shared fact set.
    pub subject_id: Option<String>,
}

/// Build the router with all routes
#[must_use]
pub fn router(state: Arc<ApiState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .merge(chat::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state));

    // Serve the web page if configured
    if let Some(dir) = static_dir {
        let index_file = dir.join("index.html");
        let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(&index_file));

        router = router.fallback_service(serve_dir);
        tracing::info!(path = %dir.display(), "serving static files");
    }

    // CORS layer for cross-origin requests from the web page
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create a new API server
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16, static_dir: Option<PathBuf>) -> Self {
        Self {
            state,
            port,
            static_dir,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        let app = router(self.state, self.static_dir.as_deref());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
