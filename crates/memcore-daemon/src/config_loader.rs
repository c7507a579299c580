//! Config loading: a TOML file for structural defaults, overlaid with the
//! recognized environment variables — `.env` first via `dotenvy`, actual
//! process env always wins.

use std::env;

use memcore_core::config::{AppEnv, MemcoreConfig};

/// Load `path` (if present) as TOML, then apply every recognized env
/// override on top. Missing file or missing vars both fall back silently
/// to struct defaults — there's no required configuration to deploy with.
pub fn load(path: Option<&str>) -> anyhow::Result<MemcoreConfig> {
    dotenvy::dotenv().ok();

    let mut config = match path.and_then(|p| std::fs::read_to_string(p).ok()) {
        Some(toml_str) => MemcoreConfig::from_toml(&toml_str)?,
        None => MemcoreConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut MemcoreConfig) {
    if let Ok(v) = env::var("APP_ENV") {
        config.app_env = match v.to_lowercase().as_str() {
            "production" => AppEnv::Production,
            "staging" => AppEnv::Staging,
            _ => AppEnv::Development,
        };
    }

    if let Ok(v) = env::var("DATABASE_URL") {
        config.storage.database_url = v;
    }

    if let Ok(v) = env::var("OPENAI_API_KEY") {
        // Held only long enough to build a provider; never written back to
        // any config struct that might be logged or serialized.
        env::set_var("OPENAI_API_KEY", v);
    }
    if let Ok(v) = env::var("OPENAI_MODEL") {
        config.llm.model = v;
    }
    if let Ok(v) = env::var("OPENAI_EMBEDDING_MODEL") {
        config.llm.embedding_model = v;
    }

    if let Ok(v) = env::var("NIGHTLY_EXTRACTION_BATCH_SIZE") {
        if let Ok(n) = v.parse() {
            config.extraction.nightly_batch_size = n;
        }
    }
    if let Ok(v) = env::var("LEDGER_WRITE_ENABLED") {
        if let Ok(b) = v.parse() {
            config.ingestion.ledger_write_enabled = b;
        }
    }
    if let Ok(v) = env::var("FEATURE_GRAPH_EDGE_VECTORIZATION") {
        if let Ok(b) = v.parse() {
            config.graph.feature_graph_edge_vectorization = b;
        }
    }
    if let Ok(v) = env::var("CROSS_TYPE_DEDUP_ENABLED") {
        if let Ok(b) = v.parse() {
            config.dedup.cross_type_dedup_enabled = b;
            config.ontology.cross_type_dedup_enabled = b;
        }
    }

    if let Ok(v) = env::var("MEMORY_DECAY_ENABLED") {
        if let Ok(b) = v.parse() {
            config.quality.enable_decay = b;
        }
    }
    if let Ok(v) = env::var("MEMORY_DECAY_STALE_DAYS") {
        if let Ok(n) = v.parse() {
            config.quality.decay_stale_days = n;
        }
    }

    if let Ok(v) = env::var("ENRICHMENT_ENABLED") {
        if let Ok(b) = v.parse() {
            config.worker.enabled = b;
        }
    }
    if let Ok(v) = env::var("ENRICHMENT_POLL_MS") {
        if let Ok(n) = v.parse() {
            config.worker.poll_ms = n;
        }
    }
    if let Ok(v) = env::var("ENRICHMENT_BATCH_SIZE") {
        if let Ok(n) = v.parse() {
            config.worker.batch_size = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load(Some("/nonexistent/path.toml")).unwrap();
        assert_eq!(config.worker.batch_size, 25);
    }

    #[test]
    fn env_override_wins_over_default() {
        env::set_var("NIGHTLY_EXTRACTION_BATCH_SIZE", "250");
        let config = load(None).unwrap();
        env::remove_var("NIGHTLY_EXTRACTION_BATCH_SIZE");
        assert_eq!(config.extraction.nightly_batch_size, 250);
    }
}
