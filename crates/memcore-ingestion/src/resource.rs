//! The three write destinations a request can target (§4.8).

use memcore_core::models::MemoryOrigin;

#[derive(Debug, Clone)]
pub enum WriteRequest {
    Profile {
        patch: serde_json::Value,
    },
    Table {
        table_name: String,
        fields: serde_json::Value,
    },
    Vector {
        collection: String,
        text: String,
        metadata: serde_json::Value,
    },
}

impl WriteRequest {
    pub fn consent_resource(&self) -> String {
        match self {
            WriteRequest::Profile { .. } => "profile".to_string(),
            WriteRequest::Table { table_name, .. } => format!("tables/{table_name}"),
            WriteRequest::Vector { collection, .. } => format!("vectors/{collection}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Accepted,
    PendingEnrichment,
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub write: WriteRequest,
    pub changed_by: String,
    pub origin: MemoryOrigin,
    pub agent_id: String,
}
