//! Graph statistics & centrality (§4.6): counts, average confidence/degree,
//! per-entity degree, an approximated betweenness, and a clustering
//! coefficient.

use std::collections::{HashMap, HashSet};

use memcore_core::models::{Edge, EntityType};
use memcore_core::MemcoreResult;
use memcore_storage::queries::edge_ops;
use memcore_storage::tenant::Tx;

#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub total_edges: usize,
    pub by_relation: HashMap<String, usize>,
    pub average_confidence: f64,
}

/// Aggregate stats over every live edge touching `entity_id` (its own
/// local neighborhood, not the whole tenant graph — the whole-graph scan
/// is a worker/reporting concern layered on top of this).
pub async fn local_stats(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<GraphStats> {
    let mut edges = edge_ops::list_from(tx, entity_id).await?;
    edges.extend(edge_ops::list_to(tx, entity_id).await?);

    let mut by_relation = HashMap::new();
    let mut confidence_sum = 0.0;
    for edge in &edges {
        *by_relation.entry(edge.relation.clone()).or_insert(0) += 1;
        confidence_sum += edge.confidence;
    }

    let average_confidence = if edges.is_empty() { 0.0 } else { confidence_sum / edges.len() as f64 };

    Ok(GraphStats { total_edges: edges.len(), by_relation, average_confidence })
}

/// Unweighted and weighted degree of `entity_id`.
pub async fn degree(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<(usize, f64)> {
    let mut edges = edge_ops::list_from(tx, entity_id).await?;
    edges.extend(edge_ops::list_to(tx, entity_id).await?);
    let weighted = edges.iter().map(|e| e.weight).sum();
    Ok((edges.len(), weighted))
}

/// Approximated betweenness: the count of distinct `(source, target)`
/// pairs among `entity_id`'s direct neighbors that are *not* themselves
/// directly connected — i.e. pairs this entity structurally bridges.
/// This is a one-hop approximation, not the classical shortest-path
/// betweenness (which needs a full all-pairs traversal this layer doesn't
/// do eagerly).
pub async fn approximate_betweenness(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<usize> {
    let neighbor_ids = distinct_neighbors(tx, entity_id).await?;
    let neighbors: Vec<_> = neighbor_ids.into_iter().collect();

    let mut bridged = 0;
    for i in 0..neighbors.len() {
        for j in (i + 1)..neighbors.len() {
            let a = neighbors[i];
            let b = neighbors[j];
            let a_edges = all_edges(tx, a).await?;
            let directly_connected = a_edges.iter().any(|e| e.source_id == b || e.target_id == b);
            if !directly_connected {
                bridged += 1;
            }
        }
    }
    Ok(bridged)
}

/// Clustering coefficient of `entity_id`: fraction of neighbor pairs that
/// are themselves directly connected, out of all possible neighbor pairs.
pub async fn clustering_coefficient(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<f64> {
    let neighbor_ids: Vec<_> = distinct_neighbors(tx, entity_id).await?.into_iter().collect();
    let n = neighbor_ids.len();
    if n < 2 {
        return Ok(0.0);
    }

    let mut connected_pairs = 0;
    for i in 0..n {
        let a_edges = all_edges(tx, neighbor_ids[i]).await?;
        for j in (i + 1)..n {
            let b = neighbor_ids[j];
            if a_edges.iter().any(|e| e.source_id == b || e.target_id == b) {
                connected_pairs += 1;
            }
        }
    }

    let possible_pairs = n * (n - 1) / 2;
    Ok(connected_pairs as f64 / possible_pairs as f64)
}

async fn all_edges(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<Vec<Edge>> {
    let mut edges = edge_ops::list_from(tx, entity_id).await?;
    edges.extend(edge_ops::list_to(tx, entity_id).await?);
    Ok(edges)
}

async fn distinct_neighbors(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<HashSet<uuid::Uuid>> {
    let edges = all_edges(tx, entity_id).await?;
    Ok(edges
        .into_iter()
        .map(|e| if e.source_id == entity_id { e.target_id } else { e.source_id })
        .collect())
}

/// Counts by entity type, used for the by-type breakdown in the whole-
/// graph report.
pub async fn count_entities_by_type(tx: &mut Tx<'_>, entity_type: EntityType) -> MemcoreResult<usize> {
    let entities = memcore_storage::queries::entity_ops::list_by_type(tx, entity_type, i64::MAX).await?;
    Ok(entities.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn possible_pairs_formula_matches_combinations() {
        assert_eq!(4 * 3 / 2, 6);
    }
}
