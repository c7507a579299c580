//! Fixed alias map normalizing LLM-invented relation names before
//! ontology validation (§4.3). Unknown input passes through unchanged —
//! the relation matrix, not this map, decides whether a relation is
//! recognized.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("spouse", "married_to"),
        ("husband", "married_to"),
        ("wife", "married_to"),
        ("married", "married_to"),
        ("has_author", "created"),
        ("authored", "created"),
        ("wrote", "created"),
        ("employed_by", "works_at"),
        ("works_for", "works_at"),
        ("lives_at", "lives_in"),
        ("resides_in", "lives_in"),
        ("goes_to", "attends"),
        ("studies_at", "attends"),
        ("likes", "prefers"),
        ("loves", "prefers"),
        ("enjoys", "prefers"),
        ("dislikes", "avoids"),
        ("hates", "avoids"),
        ("is_friend_of", "friend_of"),
        ("friends_with", "friend_of"),
        ("part_of_category", "category"),
        ("is_a", "category"),
        ("similar", "similar_to"),
        ("related", "related_to"),
    ])
});

/// Map a raw relation string to its canonical form, lowercasing first.
/// Relations not present in the map pass through untouched.
pub fn normalize_relation(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    ALIASES.get(lower.as_str()).map(|s| s.to_string()).unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_aliases() {
        assert_eq!(normalize_relation("spouse"), "married_to");
        assert_eq!(normalize_relation("has_author"), "created");
        assert_eq!(normalize_relation("Employed_By"), "works_at");
    }

    #[test]
    fn passes_through_unknown() {
        assert_eq!(normalize_relation("lives_near"), "lives_near");
    }
}
