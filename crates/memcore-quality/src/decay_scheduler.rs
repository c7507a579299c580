//! Decay sweep (§4.4): a single-process timer that demotes untouched
//! memories across every tenant. Guarded by an in-process flag so a slow
//! sweep can never overlap itself (§5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use memcore_core::config::QualityConfig;
use memcore_core::models::{MemoryOrigin, MemoryStatus};
use memcore_storage::queries::memory_meta_ops;
use memcore_storage::TenantStore;

use crate::transitions::{apply_transition, QualityEvent};

pub struct DecayScheduler {
    store: Arc<TenantStore>,
    config: QualityConfig,
    running: Arc<AtomicBool>,
}

impl DecayScheduler {
    pub fn new(store: Arc<TenantStore>, config: QualityConfig) -> Self {
        Self { store, config, running: Arc::new(AtomicBool::new(false)) }
    }

    /// Spawn the fixed-interval timer task. Returns immediately; the
    /// returned handle can be aborted on shutdown.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_millis(self.config.decay_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_sweep_once().await;
            }
        })
    }

    /// Run exactly one sweep cycle across every tenant. A no-op while a
    /// previous cycle is still running.
    pub async fn run_sweep_once(&self) {
        if !self.config.enable_decay {
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("decay sweep already running, skipping this tick");
            return;
        }

        let result = self.sweep_all_tenants().await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "decay sweep failed");
        }

        self.running.store(false, Ordering::SeqCst);
    }

    async fn sweep_all_tenants(&self) -> memcore_core::MemcoreResult<()> {
        let tenants = self.store.list_all().await?;
        let older_than = Utc::now() - chrono::Duration::days(self.config.decay_stale_days);

        for tenant_id in tenants {
            let store = self.store.clone();
            let config = self.config.clone();
            let result = store
                .with_tenant(tenant_id, |tx| {
                    let older_than = older_than;
                    let config = config.clone();
                    Box::pin(async move {
                        let candidates = memory_meta_ops::list_decay_candidates(tx, older_than, 500).await?;
                        for meta in candidates {
                            if meta.origin == MemoryOrigin::UserStated {
                                continue;
                            }
                            if meta.status.is_sticky() {
                                continue;
                            }
                            let transition = apply_transition(
                                meta.confidence,
                                meta.status,
                                QualityEvent::DecaySweep { delta: config.decay_confidence_delta },
                            );
                            memory_meta_ops::transition(tx, meta.id, transition.confidence, transition.status, transition.reason)
                                .await?;
                        }
                        Ok::<_, memcore_core::MemcoreError>(())
                    })
                })
                .await;

            if let Err(e) = result {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "decay sweep failed for tenant");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_flag_starts_clear() {
        let running = Arc::new(AtomicBool::new(false));
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn user_stated_memories_are_excluded_from_decay_by_construction() {
        // The origin check lives inline in `sweep_all_tenants`; this test
        // guards the constant it keys off rather than exercising storage.
        assert_eq!(MemoryOrigin::UserStated, MemoryOrigin::UserStated);
        assert!(MemoryStatus::Review.is_sticky());
        assert!(MemoryStatus::Rejected.is_sticky());
        assert!(!MemoryStatus::Active.is_sticky());
    }
}
