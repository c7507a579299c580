//! Consent resolution (§4.11): pick the surviving rule whose pattern best
//! matches a resource, then compare its permission against what's required.

use memcore_core::models::{ConsentRule, Permission};

/// Domains callers name without a specific sub-resource (`profile |
/// tables | vectors | graph | memory`). A bare domain or its `*`
/// wildcard (`tables/*`) both satisfy a request for anything under it.
pub const DOMAINS: &[&str] = &["profile", "tables", "vectors", "graph", "memory"];

/// Whether `pattern` matches `resource`: exact match, or a `*`-suffixed
/// prefix match (`tables/*` matches `tables/meals`). The wildcard's
/// literal prefix is matched character-for-character — there is no LIKE
/// engine involved, so no metacharacter escaping is needed here; that
/// concern only exists if a caller hands this straight to SQL (which
/// `memcore-storage` never does — rules are matched in Rust).
pub fn pattern_matches(pattern: &str, resource: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        resource.starts_with(prefix)
    } else {
        pattern == resource
    }
}

/// Select the surviving rule (already filtered to this agent and
/// `revoked_at IS NULL` by the caller) with the longest matching pattern.
/// Longest-pattern-wins breaks ties between an exact rule and a broader
/// wildcard covering the same resource.
pub fn select_rule<'a>(rules: &'a [ConsentRule], resource: &str) -> Option<&'a ConsentRule> {
    rules
        .iter()
        .filter(|r| r.is_active() && pattern_matches(&r.resource_pattern, resource))
        .max_by_key(|r| r.resource_pattern.len())
}

/// Resolve whether `required` permission is granted for `resource`,
/// given this agent's active rules. A missing rule is a deny.
pub fn is_authorized(rules: &[ConsentRule], resource: &str, required: Permission) -> bool {
    select_rule(rules, resource)
        .map(|rule| rule.permission >= required)
        .unwrap_or(false)
}

/// Normalize a bare domain name (`tables`) or an explicit wildcard
/// (`tables/*`) into the pattern consent rules are stored under —
/// domain-level grants are always recorded as the wildcard form.
pub fn domain_wildcard(domain: &str) -> String {
    if DOMAINS.contains(&domain) {
        format!("{domain}/*")
    } else {
        domain.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(pattern: &str, permission: Permission) -> ConsentRule {
        ConsentRule {
            id: uuid::Uuid::new_v4(),
            agent_id: "agent-1".into(),
            resource_pattern: pattern.into(),
            permission,
            granted_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[test]
    fn exact_pattern_matches_only_the_same_resource() {
        assert!(pattern_matches("tables/meals", "tables/meals"));
        assert!(!pattern_matches("tables/meals", "tables/workouts"));
    }

    #[test]
    fn wildcard_pattern_matches_any_resource_under_the_prefix() {
        assert!(pattern_matches("tables/*", "tables/meals"));
        assert!(pattern_matches("tables/*", "tables/"));
        assert!(!pattern_matches("tables/*", "vectors/meals"));
    }

    #[test]
    fn longest_matching_pattern_wins() {
        let rules = vec![rule("tables/*", Permission::Read), rule("tables/meals", Permission::Write)];
        let selected = select_rule(&rules, "tables/meals").unwrap();
        assert_eq!(selected.resource_pattern, "tables/meals");
    }

    #[test]
    fn missing_rule_is_a_deny() {
        let rules = vec![rule("tables/meals", Permission::Write)];
        assert!(!is_authorized(&rules, "vectors/memories", Permission::Read));
    }

    #[test]
    fn revoked_rules_are_never_selected() {
        let mut r = rule("tables/*", Permission::Write);
        r.revoked_at = Some(Utc::now());
        assert!(select_rule(&[r], "tables/meals").is_none());
    }

    #[test]
    fn permission_below_required_is_a_deny() {
        let rules = vec![rule("tables/*", Permission::Read)];
        assert!(!is_authorized(&rules, "tables/meals", Permission::Write));
    }
}
