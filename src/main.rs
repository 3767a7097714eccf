mod config;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use vellum_embed::{EmbeddingService, OllamaEmbedder};
use vellum_gateway::GatewayServer;
use vellum_ingest::{
    ChunkerConfig, DocumentPipeline, DocumentStore, InMemoryDocumentStore, ProcessorFactory,
    TextChunker,
};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let config_path = resolve_config_path();
    let config = Config::load(&config_path)?;

    let chunker = TextChunker::new(ChunkerConfig {
        chunk_size: config.chunking.chunk_size,
        chunk_overlap: config.chunking.chunk_overlap,
        separator: config.chunking.separator.clone(),
    })?;

    // The embedding model is constructed exactly once here and injected;
    // nothing downstream loads or reloads it.
    let embedder = OllamaEmbedder::new(&config.embedding.base_url, config.embedding.model.clone());
    let embeddings = EmbeddingService::new(Box::new(embedder));

    match embeddings.get_embedding("dimension probe").await {
        Ok(vector) => tracing::info!(
            model = %config.embedding.model,
            dimensions = vector.len(),
            "embedding model ready"
        ),
        Err(e) => tracing::warn!("embedding model health check failed: {e:#}"),
    }

    let pipeline = Arc::new(DocumentPipeline::new(
        ProcessorFactory::new(),
        chunker,
        embeddings,
    ));

    // Vector database integration is stubbed; uploads land in process memory.
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());

    let upload_dir = PathBuf::from(&config.server.upload_dir);
    tokio::fs::create_dir_all(&upload_dir).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(
        &config.server.host,
        config.server.port,
        pipeline,
        store,
        upload_dir,
        shutdown_rx,
    )
    .with_max_body_size(config.server.max_upload_bytes)
    .serve()
    .await?;

    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve_config_path() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = args.windows(2).find(|w| w[0] == "--config").map(|w| &w[1]) {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("VELLUM_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}
