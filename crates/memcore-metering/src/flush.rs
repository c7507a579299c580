//! The buffered usage-counter flush timer (§4.12): call sites bump an
//! in-memory delta instead of writing to `shared.usage_counters` per
//! request, and a fixed-interval timer drains the buffer with one
//! `increment_count` upsert per key. Dashboard-only; never authoritative
//! for a tier-limit decision, which always recounts from the table
//! itself (`limit::with_tier_limit_lock`, `limit::soft_check`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use memcore_core::config::MeteringConfig;
use memcore_storage::TenantStore;

use crate::limit::MeteredResource;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CounterKey {
    tenant_id: uuid::Uuid,
    resource: &'static str,
    agent_id: String,
    day: NaiveDate,
}

pub struct UsageFlusher {
    store: Arc<TenantStore>,
    config: MeteringConfig,
    buffer: DashMap<CounterKey, i64>,
    running: Arc<AtomicBool>,
}

impl UsageFlusher {
    pub fn new(store: Arc<TenantStore>, config: MeteringConfig) -> Self {
        Self {
            store,
            config,
            buffer: DashMap::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record `by` units of `resource` usage for `agent_id` under
    /// `tenant_id`, today. Never touches the database directly — picked
    /// up by the next flush tick.
    pub fn record(&self, tenant_id: uuid::Uuid, resource: MeteredResource, agent_id: &str, by: i64) {
        let key = CounterKey {
            tenant_id,
            resource: resource.as_str(),
            agent_id: agent_id.to_string(),
            day: Utc::now().date_naive(),
        };
        *self.buffer.entry(key).or_insert(0) += by;
    }

    /// Spawn the fixed-interval flush task. Returns immediately; the
    /// returned handle can be aborted on shutdown.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_secs(self.config.usage_flush_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_flush_once().await;
            }
        })
    }

    /// Drain every buffered delta into `shared.usage_counters`. A no-op
    /// while a previous flush is still running.
    pub async fn run_flush_once(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("usage flush already running, skipping this tick");
            return;
        }

        let keys: Vec<CounterKey> = self.buffer.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            let Some((_, delta)) = self.buffer.remove(&key) else {
                continue;
            };
            if delta == 0 {
                continue;
            }

            let result = memcore_storage::queries::metering_ops::increment_count(
                self.store.pool(),
                key.tenant_id,
                key.resource,
                &key.agent_id,
                key.day,
                delta,
            )
            .await;

            if let Err(e) = result {
                tracing::warn!(
                    tenant_id = %key.tenant_id,
                    resource = key.resource,
                    error = %e,
                    "usage counter flush failed, re-buffering delta"
                );
                *self.buffer.entry(key).or_insert(0) += delta;
            }
        }

        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates_into_the_same_key() {
        let store = DashMap::<CounterKey, i64>::new();
        let key = CounterKey {
            tenant_id: uuid::Uuid::nil(),
            resource: "tables",
            agent_id: "agent-1".to_string(),
            day: Utc::now().date_naive(),
        };
        *store.entry(key.clone()).or_insert(0) += 1;
        *store.entry(key.clone()).or_insert(0) += 2;
        assert_eq!(*store.get(&key).unwrap(), 3);
    }
}
