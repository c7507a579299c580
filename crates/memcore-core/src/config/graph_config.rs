use serde::{Deserialize, Serialize};

/// Graph Engine traversal bounds and feature flags (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub default_traversal_depth: u32,
    pub max_traversal_depth: u32,
    pub feature_graph_edge_vectorization: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_traversal_depth: 3,
            max_traversal_depth: 6,
            feature_graph_edge_vectorization: false,
        }
    }
}
