//! Source precedence (§4.3): a total order over `MemoryOrigin` used to
//! resolve profile-sync conflicts. Higher always wins.

use memcore_core::models::MemoryOrigin;

pub fn precedence_rank(origin: MemoryOrigin) -> i32 {
    match origin {
        MemoryOrigin::UserTyped => 100,
        MemoryOrigin::UserStated => 90,
        MemoryOrigin::Imported => 70,
        MemoryOrigin::System => 50,
        MemoryOrigin::AiStated => 40,
        MemoryOrigin::AiInferred => 30,
        MemoryOrigin::AiPattern => 20,
        MemoryOrigin::Contradicted => 0,
    }
}

/// Whether `candidate` outranks `incumbent` and may overwrite a field it
/// already set.
pub fn source_outranks(candidate: MemoryOrigin, incumbent: MemoryOrigin) -> bool {
    precedence_rank(candidate) > precedence_rank(incumbent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_typed_outranks_everything() {
        for origin in [
            MemoryOrigin::UserStated,
            MemoryOrigin::Imported,
            MemoryOrigin::System,
            MemoryOrigin::AiStated,
            MemoryOrigin::AiInferred,
            MemoryOrigin::AiPattern,
        ] {
            assert!(source_outranks(MemoryOrigin::UserTyped, origin));
            assert!(!source_outranks(origin, MemoryOrigin::UserTyped));
        }
    }

    #[test]
    fn equal_rank_does_not_outrank() {
        assert!(!source_outranks(MemoryOrigin::UserTyped, MemoryOrigin::UserTyped));
    }
}
