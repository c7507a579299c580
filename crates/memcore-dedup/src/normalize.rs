//! Pure string normalization used by dedup stage 2 (§4.5).

const CORPORATE_SUFFIXES: &[&str] = &[
    " inc", " inc.", " llc", " llc.", " ltd", " ltd.", " corp", " corp.", " co", " co.",
    " company", " corporation", " incorporated", " limited",
];

fn strip_corporate_suffix(name: &str) -> String {
    let lower = name.to_lowercase();
    for suffix in CORPORATE_SUFFIXES {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.trim().to_string();
        }
    }
    lower
}

/// Singularize a plural-looking word: `ies`→`y`; `ses`/`xes`/`zes`/`ches`/
/// `shes`→ strip 2; trailing `s`→ strip 1 unless it's a double-s.
fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Normalize a name for stage-2 comparison: lowercase, strip a trailing
/// corporate suffix (organizations only get any benefit from this; it's a
/// no-op for names without one), singularize each whitespace-separated
/// token.
pub fn normalize_name(name: &str) -> String {
    let stripped = strip_corporate_suffix(name);
    stripped
        .split_whitespace()
        .map(singularize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the shorter of two strings is a prefix of the longer one *and*
/// at least 60% of its length (§4.5 stage 2).
pub fn is_prefix_containment(a: &str, b: &str) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() || !longer.starts_with(shorter) {
        return false;
    }
    (shorter.len() as f64) >= 0.6 * (longer.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_corporate_suffixes() {
        assert_eq!(normalize_name("Acme Corp"), "acme");
        assert_eq!(normalize_name("Acme Inc."), "acme");
    }

    #[test]
    fn singularizes_plurals() {
        assert_eq!(normalize_name("pizzas"), "pizza");
        assert_eq!(normalize_name("boxes"), "box");
        assert_eq!(normalize_name("puppies"), "puppy");
        assert_eq!(normalize_name("glass"), "glass");
    }

    #[test]
    fn prefix_containment_requires_sixty_percent_overlap() {
        assert!(is_prefix_containment("sar", "sarah"));
        assert!(!is_prefix_containment("s", "sarah"));
    }
}
