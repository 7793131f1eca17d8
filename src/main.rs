use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use recall_gateway::api::{ApiServer, ApiState};
use recall_gateway::db::{self, FactRepo};
use recall_gateway::embedding::{CachedEmbedder, OpenAiEmbedder, TextEmbedder};
use recall_gateway::extract::FactExtractor;
use recall_gateway::genai::{GeminiClient, Generator};
use recall_gateway::retrieval::Retriever;
use recall_gateway::Config;

/// Recall - memory-augmented chat gateway
#[derive(Parser)]
#[command(name = "recall", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "RECALL_PORT", default_value = "18790")]
    port: u16,

    /// Data directory for the fact database
    #[arg(long, env = "RECALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Static files directory for the web page
    #[arg(long, env = "RECALL_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,recall_gateway=info",
        1 => "info,recall_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Fails fast when a required credential is missing
    let config = Config::load(cli.port, cli.data_dir, cli.static_dir)?;

    tracing::info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        generation_model = %config.generation_model,
        embedding_model = %config.embedding_model,
        "starting recall gateway"
    );

    let pool = db::init(config.data_dir.join("recall.db"))?;
    let fact_repo = FactRepo::new(pool.clone());

    let embedder: Arc<dyn TextEmbedder> = Arc::new(CachedEmbedder::new(
        OpenAiEmbedder::new(
            config.api_keys.openai.clone(),
            config.embedding_model.clone(),
        )?,
        config.embed_cache_size,
    ));

    let generator: Arc<dyn Generator> = Arc::new(GeminiClient::new(
        config.api_keys.gemini.clone(),
        config.generation_model.clone(),
    )?);

    let state = Arc::new(ApiState {
        db: pool,
        fact_repo: fact_repo.clone(),
        retriever: Retriever::new(embedder),
        generator: generator.clone(),
        extractor: FactExtractor::new(generator, fact_repo),
        subject_id: None,
    });

    ApiServer::new(state, config.port, config.static_dir.clone())
        .run()
        .await?;

    Ok(())
}
