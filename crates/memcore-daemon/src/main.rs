//! The memcore service process: loads configuration, opens the shared
//! Postgres pool, and wires up the three background timers (§4.9 worker
//! pool, §4.4 decay sweep, §4.12 usage flush) behind a single shutdown
//! signal.

mod config_loader;

use std::sync::Arc;

use clap::Parser;
use memcore_llm::{EmbeddingProvider, LlmProvider, OpenAiProvider};
use memcore_metering::UsageFlusher;
use memcore_quality::DecayScheduler;
use memcore_storage::{build_pool, TenantStore};
use memcore_worker::WorkerPool;

#[derive(Parser, Debug)]
#[command(name = "memcored", about = "Background service for the memory store")]
struct Cli {
    /// Path to a TOML config file; falls back to built-in defaults when absent.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config_loader::load(cli.config.as_deref())?;
    tracing::info!(app_env = ?config.app_env, "starting memcore daemon");

    let pool = build_pool(&config.storage).await?;
    let store = Arc::new(TenantStore::new(pool));

    let openai_provider = std::env::var("OPENAI_API_KEY").ok().map(|key| {
        Arc::new(OpenAiProvider::new(
            key,
            config.llm.model.clone(),
            config.llm.embedding_model.clone(),
            config.llm.embedding_dimensions,
            config.llm.request_timeout_secs,
        ))
    });
    let llm_provider: Option<Arc<dyn LlmProvider>> = openai_provider.clone().map(|p| p as Arc<dyn LlmProvider>);
    let embedding_provider: Option<Arc<dyn EmbeddingProvider>> = openai_provider.map(|p| p as Arc<dyn EmbeddingProvider>);
    if llm_provider.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, running without an LLM/embedding provider");
    }

    let worker_pool = Arc::new(WorkerPool::new(store.clone(), config.clone(), llm_provider, embedding_provider));
    let decay_scheduler = Arc::new(DecayScheduler::new(store.clone(), config.quality.clone()));
    let usage_flusher = Arc::new(UsageFlusher::new(store.clone(), config.metering.clone()));

    let mut handles = Vec::new();

    if worker_pool.startup_probe_ok().await {
        handles.push(worker_pool.spawn());
    } else {
        tracing::warn!("enrichment worker pool disabled after failed startup probe");
    }
    handles.push(decay_scheduler.spawn());
    handles.push(usage_flusher.spawn());

    tracing::info!("memcore daemon running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping background tasks");

    for handle in handles {
        handle.abort();
    }

    Ok(())
}
