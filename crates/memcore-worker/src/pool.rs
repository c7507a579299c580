//! The enrichment worker pool (§4.9): a fixed-interval timer claiming
//! batches from `enrichment_jobs` and `pending_vectors` with
//! `FOR UPDATE SKIP LOCKED`, retrying failures with exponential backoff,
//! overlap-guarded the same way `DecayScheduler`/`UsageFlusher` are.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use memcore_core::config::MemcoreConfig;
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_llm::{EmbeddingProvider, LlmProvider};
use memcore_storage::queries::{enrichment_ops, metering_ops};
use memcore_storage::TenantStore;

use crate::job::{retry_pending_vector, run_enrichment_job};

const FALLBACK_TIER: &str = "free";

pub struct WorkerPool {
    store: Arc<TenantStore>,
    config: MemcoreConfig,
    llm_provider: Option<Arc<dyn LlmProvider>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    running: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(
        store: Arc<TenantStore>,
        config: MemcoreConfig,
        llm_provider: Option<Arc<dyn LlmProvider>>,
        embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self { store, config, llm_provider, embedding_provider, running: Arc::new(AtomicBool::new(false)) }
    }

    /// Probe `enrichment_jobs` on startup; a missing-relation error means
    /// the tenant schema hasn't been migrated to include the queue yet, so
    /// the pool stays off rather than spinning on a hard failure (§4.9).
    pub async fn startup_probe_ok(&self) -> bool {
        let tenants = match self.store.list_all().await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "worker startup probe failed to list tenants");
                return false;
            }
        };

        for tenant_id in tenants {
            let result = self.store.with_tenant(tenant_id, |tx| Box::pin(async move { enrichment_ops::count_pending(tx).await })).await;
            if let Err(e) = result {
                if e.to_string().contains("does not exist") {
                    tracing::warn!(tenant_id = %tenant_id, "enrichment_jobs table missing, worker pool disabled");
                    return false;
                }
            }
        }

        true
    }

    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_millis(self.config.worker.poll_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_cycle_once().await;
            }
        })
    }

    pub async fn run_cycle_once(&self) {
        if !self.config.worker.enabled {
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("enrichment cycle already running, skipping this tick");
            return;
        }

        if let Err(e) = self.run_all_tenants().await {
            tracing::warn!(error = %e, "enrichment cycle failed");
        }

        self.running.store(false, Ordering::SeqCst);
    }

    async fn run_all_tenants(&self) -> MemcoreResult<()> {
        let tenants = self.store.list_all().await?;
        for tenant_id in tenants {
            if let Err(e) = self.run_tenant(tenant_id).await {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "enrichment cycle failed for tenant");
            }
        }
        Ok(())
    }

    async fn tier_for(&self, tenant_id: uuid::Uuid) -> String {
        match metering_ops::get_tier(self.store.pool(), tenant_id, "system").await {
            Ok(tier) => tier,
            Err(_) => FALLBACK_TIER.to_string(),
        }
    }

    async fn run_tenant(&self, tenant_id: uuid::Uuid) -> MemcoreResult<()> {
        let tier = self.tier_for(tenant_id).await;
        let llm_provider = self.llm_provider.clone();
        let embedding_provider = self.embedding_provider.clone();
        let config = self.config.clone();
        let batch_size = self.config.worker.batch_size;

        self.store
            .with_tenant(tenant_id, |tx| {
                let tier = tier.clone();
                let llm_provider = llm_provider.clone();
                let config = config.clone();
                Box::pin(async move {
                    let jobs = enrichment_ops::claim_batch(tx, batch_size).await?;
                    for job in jobs {
                        let provider_ref = llm_provider.as_deref();
                        let result =
                            run_enrichment_job(tx, &config, provider_ref, tenant_id, &tier, job.write_id, &job.target).await;
                        apply_job_result(tx, &config, job.id, job.attempt_count, result).await?;
                    }
                    Ok::<_, MemcoreError>(())
                })
            })
            .await?;

        self.store
            .with_tenant(tenant_id, |tx| {
                let embedding_provider = embedding_provider.clone();
                Box::pin(async move {
                    let Some(provider) = embedding_provider else { return Ok(()) };
                    let pending = enrichment_ops::claim_pending_vectors(tx, batch_size).await?;
                    for p in pending {
                        match retry_pending_vector(tx, provider.as_ref(), &p).await {
                            Ok(_) => enrichment_ops::mark_pending_vector_done(tx, p.id).await?,
                            Err(e) => {
                                let next_run_at = Utc::now() + chrono::Duration::seconds(60);
                                enrichment_ops::mark_pending_vector_retry(tx, p.id, next_run_at, &e.to_string()).await?
                            }
                        }
                    }
                    Ok::<_, MemcoreError>(())
                })
            })
            .await?;

        Ok(())
    }
}

async fn apply_job_result(
    tx: &mut memcore_storage::tenant::Tx<'_>,
    config: &MemcoreConfig,
    job_id: uuid::Uuid,
    attempt_count: i32,
    result: MemcoreResult<()>,
) -> MemcoreResult<()> {
    match result {
        Ok(()) => enrichment_ops::mark_done(tx, job_id).await,
        Err(e) if !e.is_retryable() || attempt_count + 1 >= config.worker.max_attempts => {
            enrichment_ops::mark_failed(tx, job_id, &e.to_string()).await
        }
        Err(e) => {
            let backoff = config.worker.backoff_for_attempt(attempt_count);
            let next_run_at = Utc::now() + chrono::Duration::seconds(backoff as i64);
            enrichment_ops::mark_retry(tx, job_id, next_run_at, &e.to_string()).await
        }
    }
}
