//! The shape every extraction method converges on before post-processing
//! (§4.10): a flat candidate list regardless of whether rules or the LLM
//! produced it.

use memcore_core::models::EntityType;
use serde::{Deserialize, Serialize};

/// Where an edge's source resolves to: the tenant's owner entity (the
/// default) or a specific non-owner entity already named in this pass or
/// found by fuzzy lookup (§4.10 `edge.sourceRef`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EdgeSourceRef {
    Owner,
    Named { entity_type: EntityType, name: String },
}

#[derive(Debug, Clone)]
pub struct CandidateEdge {
    pub relation: String,
    pub confidence: f64,
    pub source_ref: EdgeSourceRef,
}

/// One extracted entity mention, prior to dedup resolution.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub entity_type: EntityType,
    pub name: String,
    pub properties: serde_json::Value,
    pub confidence: f64,
    pub evidence_text: Option<String>,
    pub edge: Option<CandidateEdge>,
}

impl Candidate {
    pub fn new(entity_type: EntityType, name: impl Into<String>, confidence: f64) -> Self {
        Self {
            entity_type,
            name: name.into(),
            properties: serde_json::json!({}),
            confidence,
            evidence_text: None,
            edge: None,
        }
    }

    pub fn with_edge(mut self, relation: impl Into<String>, source_ref: EdgeSourceRef) -> Self {
        self.edge = Some(CandidateEdge {
            relation: relation.into(),
            confidence: self.confidence,
            source_ref,
        });
        self
    }

    pub fn with_evidence(mut self, text: impl Into<String>) -> Self {
        self.evidence_text = Some(text.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }
}
