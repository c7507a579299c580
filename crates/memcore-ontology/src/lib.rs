//! The entity/relation taxonomy (§4.3): a closed set of entity types (see
//! `memcore_core::models::EntityType`), a closed set of canonical
//! relations with a relation matrix, an alias map normalizing
//! LLM-invented relation names, and the source-precedence order used to
//! resolve profile-sync conflicts.

mod alias;
mod precedence;
mod relation_matrix;
mod validator;

pub use alias::normalize_relation;
pub use precedence::{precedence_rank, source_outranks};
pub use relation_matrix::{allowed_target_types, allowed_source_types, is_known_relation, RelationDef};
pub use validator::{validate_relation, OntologyMode, ValidationOutcome};
