//! Entity merge (§4.5): retarget every edge touching the loser onto the
//! winner, collapsing duplicates (summed weight, max confidence, unioned
//! evidence) before the loser is soft-deleted.

use chrono::Utc;
use memcore_core::models::{MemoryOrigin, SourceRef, SourceType};
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_storage::queries::{edge_ops, entity_ops, memory_meta_ops};
use memcore_storage::tenant::Tx;

/// Merge `loser` into `winner`. Rejects a self-merge; everything else
/// (properties/alias union, mention_count sum, confidence max, first_seen
/// min) is delegated to `entity_ops::merge_into` once edges are settled.
pub async fn merge_entities(
    tx: &mut Tx<'_>,
    winner: uuid::Uuid,
    loser: uuid::Uuid,
) -> MemcoreResult<()> {
    if winner == loser {
        return Err(MemcoreError::Validation("cannot merge an entity into itself".into()));
    }

    retarget_edges(tx, winner, loser, true).await?;
    retarget_edges(tx, winner, loser, false).await?;

    entity_ops::merge_into(tx, winner, loser, Utc::now()).await?;
    Ok(())
}

/// Move every edge where `loser` is the source (`outgoing = true`) or
/// target onto `winner`. When the winner already has the identical
/// `(relation, other_end)` edge, collapse into it instead of creating a
/// parallel edge.
async fn retarget_edges(
    tx: &mut Tx<'_>,
    winner: uuid::Uuid,
    loser: uuid::Uuid,
    outgoing: bool,
) -> MemcoreResult<()> {
    let edges = if outgoing {
        edge_ops::list_from(tx, loser).await?
    } else {
        edge_ops::list_to(tx, loser).await?
    };

    for edge in edges {
        let other_end = if outgoing { edge.target_id } else { edge.source_id };
        if other_end == winner {
            // The loser and winner were directly connected; that edge
            // becomes a self-loop once retargeted, so just drop it.
            edge_ops::soft_delete(tx, edge.id).await?;
            continue;
        }

        let existing = if outgoing {
            edge_ops::find_triple(tx, winner, other_end, &edge.relation).await?
        } else {
            edge_ops::find_triple(tx, other_end, winner, &edge.relation).await?
        };

        match existing {
            Some(collapse_into) => {
                // §4.5 scenario 3: summed weight (capped), max confidence,
                // evidence unioned rather than reinforce's fixed +1.0 bump.
                edge_ops::collapse(tx, collapse_into.id, edge.weight, edge.confidence, &edge.evidence).await?;
                edge_ops::soft_delete(tx, edge.id).await?;
            }
            None => {
                let evidence_text = edge.evidence.first().map(|e| e.text.as_str());
                let meta = memory_meta_ops::create(
                    tx,
                    SourceType::Edge,
                    &SourceRef::Edge { edge_id: uuid::Uuid::nil() },
                    MemoryOrigin::System,
                )
                .await?;
                if outgoing {
                    edge_ops::create(tx, winner, other_end, &edge.relation, edge.confidence, evidence_text, None, meta.id).await?;
                } else {
                    edge_ops::create(tx, other_end, winner, &edge.relation, edge.confidence, evidence_text, None, meta.id).await?;
                }
                edge_ops::soft_delete(tx, edge.id).await?;
            }
        }
    }

    Ok(())
}
