//! # memcore-dedup
//!
//! The six-stage entity deduplication pipeline (§4.5): exact, normalized,
//! fuzzy, alias, and (feature-flagged) cross-type exact/fuzzy matching,
//! plus optional context disambiguation and merge orchestration.

pub mod disambiguate;
pub mod merge;
pub mod normalize;
pub mod stages;

pub use merge::merge_entities;
pub use normalize::{is_prefix_containment, normalize_name};
pub use stages::{find_duplicate, DedupMatch, MatchStage};
