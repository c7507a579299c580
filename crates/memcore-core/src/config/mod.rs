mod consent_config;
mod dedup_config;
mod extraction_config;
mod graph_config;
mod ingestion_config;
mod llm_config;
mod metering_config;
mod ontology_config;
mod quality_config;
mod sandbox_config;
mod storage_config;
mod worker_config;

use serde::{Deserialize, Serialize};

pub use consent_config::ConsentConfig;
pub use dedup_config::DedupConfig;
pub use extraction_config::{ExtractionConfig, ExtractionMethod};
pub use graph_config::GraphConfig;
pub use ingestion_config::IngestionConfig;
pub use llm_config::LlmConfig;
pub use metering_config::{MeteringConfig, TierLimits};
pub use ontology_config::{OntologyConfig, OntologyMode};
pub use quality_config::QualityConfig;
pub use sandbox_config::SandboxConfig;
pub use storage_config::StorageConfig;
pub use worker_config::WorkerConfig;

/// Deployment profile; selects the RFC-8707 `resource` allowlist at the
/// (out-of-scope) OAuth boundary and tunes a handful of defaults here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Production,
    Staging,
    Development,
}

impl Default for AppEnv {
    fn default() -> Self {
        AppEnv::Development
    }
}

/// Top-level configuration aggregating every subsystem config (§6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemcoreConfig {
    pub app_env: AppEnv,
    pub storage: StorageConfig,
    pub sandbox: SandboxConfig,
    pub ontology: OntologyConfig,
    pub quality: QualityConfig,
    pub dedup: DedupConfig,
    pub graph: GraphConfig,
    pub ingestion: IngestionConfig,
    pub worker: WorkerConfig,
    pub extraction: ExtractionConfig,
    pub consent: ConsentConfig,
    pub metering: MeteringConfig,
    pub llm: LlmConfig,
}

impl MemcoreConfig {
    /// Load from a TOML string, falling back to defaults for any field
    /// missing from the document.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
