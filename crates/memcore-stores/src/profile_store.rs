//! The Profile store (§4.7): a single append-only document, updated via
//! RFC 7396 merge patches, guarded by an identity invariant on `profile.name`.

use memcore_core::models::{MemoryMeta, MemoryOrigin, SourceRef, SourceType};
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_storage::queries::{memory_meta_ops, profile_ops};
use memcore_storage::tenant::Tx;

use crate::merge_patch::{apply_merge_patch, changed_paths, empty_document, restated_paths};

pub struct ProfileUpdateOutcome {
    pub document: serde_json::Value,
    pub version: i64,
    pub meta: MemoryMeta,
    pub changed_fields: Vec<String>,
    pub restated_fields: Vec<String>,
}

/// Apply `patch` to the current profile document and persist a new
/// version (§4.7). `changed_by` is `"user"` or an agent id; only `"user"`
/// (or an explicit `override_reason`) may rename `profile.name` to a known
/// family member's name.
pub async fn update_profile(
    tx: &mut Tx<'_>,
    patch: &serde_json::Value,
    changed_by: &str,
    origin: MemoryOrigin,
    override_reason: Option<&str>,
) -> MemcoreResult<ProfileUpdateOutcome> {
    let current = profile_ops::latest(tx).await?;
    let before = current.as_ref().map(|v| v.document.clone()).unwrap_or_else(empty_document);

    enforce_identity_invariant(&before, patch, changed_by, override_reason)?;

    let changed = changed_paths(&before, patch);
    let restated = restated_paths(&before, patch);

    if let Some(ref current_version) = current {
        if !restated.is_empty() {
            memory_meta_ops::record_access(tx, current_version.meta_id).await?;
        }
    }

    let document = apply_merge_patch(&before, patch);
    let next_version = current.as_ref().map(|v| v.version + 1).unwrap_or(1);

    let meta = memory_meta_ops::create(
        tx,
        SourceType::Profile,
        &SourceRef::Profile { version: next_version, path: "$".into() },
        origin,
    )
    .await?;

    let version = profile_ops::append(tx, &document, &changed, changed_by, meta.id).await?;

    if let Some(ref current_version) = current {
        if !changed.is_empty() {
            memory_meta_ops::append_contradiction(tx, meta.id, current_version.meta_id).await?;
        }
    }

    Ok(ProfileUpdateOutcome {
        document,
        version: version.version,
        meta,
        changed_fields: changed,
        restated_fields: restated,
    })
}

/// Names of known family members drawn from `profile.family`, an array of
/// `{name, aliases?}` objects, case-folded.
fn known_family_names(document: &serde_json::Value) -> Vec<String> {
    let Some(family) = document.get("family").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    family
        .iter()
        .flat_map(|member| {
            let mut names = Vec::new();
            if let Some(name) = member.get("name").and_then(|v| v.as_str()) {
                names.push(name.to_lowercase());
            }
            if let Some(aliases) = member.get("aliases").and_then(|v| v.as_array()) {
                names.extend(aliases.iter().filter_map(|a| a.as_str().map(|s| s.to_lowercase())));
            }
            names
        })
        .collect()
}

fn enforce_identity_invariant(
    before: &serde_json::Value,
    patch: &serde_json::Value,
    changed_by: &str,
    override_reason: Option<&str>,
) -> MemcoreResult<()> {
    if changed_by == "user" || override_reason.is_some() {
        return Ok(());
    }

    let Some(new_name) = patch.get("name").and_then(|v| v.as_str()) else {
        return Ok(());
    };

    let family_names = known_family_names(before);
    let candidate = new_name.to_lowercase();
    let first_name = candidate.split_whitespace().next().unwrap_or(&candidate).to_string();

    if family_names.contains(&candidate) || family_names.contains(&first_name) {
        return Err(MemcoreError::IdentityViolation {
            field: "profile.name".into(),
            value: new_name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocks_renaming_to_a_known_family_member_without_override() {
        let before = json!({"family": [{"name": "Sarah Jones", "aliases": ["sal"]}]});
        let patch = json!({"name": "Sarah"});
        let result = enforce_identity_invariant(&before, &patch, "agent-123", None);
        assert!(result.is_err());
    }

    #[test]
    fn user_initiated_rename_bypasses_the_invariant() {
        let before = json!({"family": [{"name": "Sarah Jones"}]});
        let patch = json!({"name": "Sarah"});
        assert!(enforce_identity_invariant(&before, &patch, "user", None).is_ok());
    }

    #[test]
    fn override_reason_bypasses_the_invariant() {
        let before = json!({"family": [{"name": "Sarah Jones"}]});
        let patch = json!({"name": "Sarah"});
        assert!(enforce_identity_invariant(&before, &patch, "agent-123", Some("user confirmed rename")).is_ok());
    }

    #[test]
    fn unrelated_rename_is_allowed() {
        let before = json!({"family": [{"name": "Sarah Jones"}]});
        let patch = json!({"name": "Alex"});
        assert!(enforce_identity_invariant(&before, &patch, "agent-123", None).is_ok());
    }
}
