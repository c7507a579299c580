//! Natural-language pattern queries (§4.6): a small, closed set of shapes
//! parsed into parameterized graph queries. Not a general NLU layer —
//! just enough to answer the handful of question forms the product
//! supports.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::traversal::Direction;
use memcore_ontology::normalize_relation;

/// A parsed pattern query, ready to drive `traversal::neighbors` (or a
/// by-type entity scan for `LikesWhatType`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPattern {
    /// "who do I `<verb>` `<X>` with?" — direction outbound from the
    /// owner, filtered to the alias-normalized relation for `<verb>`.
    WhoDoIVerbWith { relation: String, object: String },
    /// "what `<type>` do I like?" — entities of `<type>` reached via a
    /// preference-style relation from the owner.
    WhatTypeDoILike { entity_type: String },
    /// "where do I `<verb>`?" — direction outbound, relation normalized
    /// from `<verb>`, restricted to place-typed targets by convention.
    WhereDoIVerb { relation: String },
}

static WHO_DO_I: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^who do i (\w+) (.+?) with\??$").unwrap());
static WHAT_TYPE_DO_I_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^what (\w+) do i like\??$").unwrap());
static WHERE_DO_I: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^where do i (\w+)\??$").unwrap());

/// Direction every parsed pattern implies — always outbound from the
/// owner entity in the supported shapes.
pub const PATTERN_DIRECTION: Direction = Direction::Outbound;

/// Try each supported shape in turn; `None` if the text matches none of
/// them (the caller should fall back to a vector-search answer).
pub fn parse(question: &str) -> Option<ParsedPattern> {
    let trimmed = question.trim();

    if let Some(caps) = WHO_DO_I.captures(trimmed) {
        let relation = normalize_relation(&caps[1]);
        let object = caps[2].trim().to_string();
        return Some(ParsedPattern::WhoDoIVerbWith { relation, object });
    }

    if let Some(caps) = WHAT_TYPE_DO_I_LIKE.captures(trimmed) {
        return Some(ParsedPattern::WhatTypeDoILike { entity_type: caps[1].to_lowercase() });
    }

    if let Some(caps) = WHERE_DO_I.captures(trimmed) {
        let relation = normalize_relation(&caps[1]);
        return Some(ParsedPattern::WhereDoIVerb { relation });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_who_do_i_verb_with() {
        let parsed = parse("who do I go to the gym with?").unwrap();
        assert_eq!(
            parsed,
            ParsedPattern::WhoDoIVerbWith { relation: "go".into(), object: "to the gym".into() }
        );
    }

    #[test]
    fn parses_what_type_do_i_like() {
        let parsed = parse("what food do I like?").unwrap();
        assert_eq!(parsed, ParsedPattern::WhatTypeDoILike { entity_type: "food".into() });
    }

    #[test]
    fn parses_where_do_i_verb() {
        let parsed = parse("where do I eat?").unwrap();
        assert_eq!(parsed, ParsedPattern::WhereDoIVerb { relation: "eat".into() });
    }

    #[test]
    fn unmatched_shapes_return_none() {
        assert!(parse("tell me a story").is_none());
    }
}
