//! # memcore-stores
//!
//! Orchestration for the three user-facing stores (§4.7): Profile (RFC
//! 7396 merge patch plus an identity invariant), dynamic Tables
//! (schema-on-write, write-protection), and Vectors (embedding dedup,
//! cosine-threshold search). Builds on `memcore-storage`'s query modules;
//! the merge-patch algebra itself is pure logic with no storage dependency.

pub mod merge_patch;
pub mod profile_store;
pub mod table_store;
pub mod vector_store;

pub use merge_patch::{apply_merge_patch, changed_paths, restated_paths};
pub use profile_store::{update_profile, ProfileUpdateOutcome};
pub use table_store::{delete_row as delete_table_row, insert_row as insert_table_row, update_row as update_table_row};
pub use vector_store::{insert_text as insert_vector_text, search as search_vectors, SearchHit, VectorWriteOutcome};
