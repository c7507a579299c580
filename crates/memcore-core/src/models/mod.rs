mod audit;
mod consent;
mod edge;
mod entity;
mod enrichment;
mod entity_type;
mod knowledge_claim;
mod memory_meta;
mod profile;
mod table_row;
mod tenant;
mod vector_row;

pub use audit::{AuditEvent, PipelineStage};
pub use consent::{ConsentRule, Permission};
pub use edge::{Edge, EdgeEvidence};
pub use entity::Entity;
pub use entity_type::EntityType;
pub use enrichment::{EnrichmentJob, JobStatus, JobTarget, PendingVector};
pub use knowledge_claim::{ClaimEvent, ClaimStatus, KnowledgeClaim, Subject};
pub use memory_meta::{MemoryOrigin, MemoryStatus, PromoteEvent, SourceRef, SourceType};
pub use profile::ProfileVersion;
pub use table_row::TableRow;
pub use tenant::Tenant;
pub use vector_row::VectorRow;
