//! Transitions are pure functions of `(confidence, status, event)` (§4.4).
//! Nothing here touches storage — `memcore-ingestion` and
//! `memcore-worker` apply the result via `memcore_storage::queries::memory_meta_ops::transition`.

use memcore_core::models::{MemoryOrigin, MemoryStatus};

/// How a `review`-status row was resolved by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirm,
    Reject,
    KeepBoth,
}

#[derive(Debug, Clone, Copy)]
pub enum QualityEvent {
    Create { origin: MemoryOrigin },
    Access { access_count: i64 },
    Reaffirm,
    Contradict { other_confidence: f64 },
    DecaySweep { delta: f64 },
    UserResolve { resolution: Resolution },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub confidence: f64,
    pub status: MemoryStatus,
    pub reason: &'static str,
    /// True if this contradiction should also demote/flag the *other* side
    /// (§4.4 contradict row: "if both sides confident and gap < 0.3 → both
    /// go to review; else older is demoted").
    pub demote_other: bool,
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Apply `event` to a memory-meta row currently at `(confidence, status)`.
/// Sticky terminal states (`review`, `rejected`) only ever leave via
/// `UserResolve` — every other event on a sticky row is a no-op that
/// preserves the current confidence/status.
pub fn apply_transition(confidence: f64, status: MemoryStatus, event: QualityEvent) -> Transition {
    if status.is_sticky() && !matches!(event, QualityEvent::UserResolve { .. }) {
        return Transition { confidence, status, reason: "sticky_noop", demote_other: false };
    }

    match event {
        QualityEvent::Create { origin } => {
            let c = origin.initial_confidence();
            Transition { confidence: c, status: MemoryStatus::from_confidence(c), reason: "create", demote_other: false }
        }
        QualityEvent::Access { access_count } => {
            let delta = if access_count < 5 { 0.02 } else { 0.0 };
            let c = clamp01(confidence + delta);
            Transition { confidence: c, status: MemoryStatus::from_confidence(c), reason: "access", demote_other: false }
        }
        QualityEvent::Reaffirm => {
            let c = clamp01(confidence + 0.07);
            // Decayed memories can re-enter unvetted/active; active crosses
            // into trusted once it clears 0.8 — both are just
            // `from_confidence` applied to the bumped value.
            Transition { confidence: c, status: MemoryStatus::from_confidence(c), reason: "mention", demote_other: false }
        }
        QualityEvent::Contradict { other_confidence } => {
            let c = (confidence - 0.3).max(0.1);
            let gap = (confidence - other_confidence).abs();
            let both_confident = confidence >= 0.5 && other_confidence >= 0.5;
            if both_confident && gap < 0.3 {
                Transition { confidence: c, status: MemoryStatus::Review, reason: "contradict_both_confident", demote_other: true }
            } else {
                Transition { confidence: c, status: MemoryStatus::from_confidence(c), reason: "contradict_demoted", demote_other: false }
            }
        }
        QualityEvent::DecaySweep { delta } => {
            let c = clamp01(confidence - delta);
            let status = if c < 0.3 { MemoryStatus::Decayed } else { MemoryStatus::from_confidence(c) };
            Transition { confidence: c, status, reason: "decay", demote_other: false }
        }
        QualityEvent::UserResolve { resolution } => match resolution {
            Resolution::Confirm => Transition { confidence: 0.95, status: MemoryStatus::Trusted, reason: "user_confirm", demote_other: false },
            Resolution::Reject => Transition { confidence: 0.0, status: MemoryStatus::Rejected, reason: "user_reject", demote_other: false },
            Resolution::KeepBoth => Transition { confidence: 0.65, status: MemoryStatus::Active, reason: "user_keep_both", demote_other: false },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_maps_origin_to_initial_confidence_and_status() {
        let t = apply_transition(0.0, MemoryStatus::Unvetted, QualityEvent::Create { origin: MemoryOrigin::UserTyped });
        assert_eq!(t.confidence, 0.95);
        assert_eq!(t.status, MemoryStatus::Trusted);

        let t = apply_transition(0.0, MemoryStatus::Unvetted, QualityEvent::Create { origin: MemoryOrigin::AiPattern });
        assert_eq!(t.confidence, 0.30);
        assert_eq!(t.status, MemoryStatus::Unvetted);
    }

    #[test]
    fn access_bumps_below_five_only() {
        let t = apply_transition(0.5, MemoryStatus::Active, QualityEvent::Access { access_count: 4 });
        assert!((t.confidence - 0.52).abs() < 1e-9);

        let t = apply_transition(0.5, MemoryStatus::Active, QualityEvent::Access { access_count: 5 });
        assert_eq!(t.confidence, 0.5);
    }

    #[test]
    fn reaffirm_can_promote_active_to_trusted() {
        let t = apply_transition(0.75, MemoryStatus::Active, QualityEvent::Reaffirm);
        assert!((t.confidence - 0.82).abs() < 1e-9);
        assert_eq!(t.status, MemoryStatus::Trusted);
    }

    #[test]
    fn contradiction_between_two_confident_close_rows_sends_both_to_review() {
        let t = apply_transition(0.6, MemoryStatus::Active, QualityEvent::Contradict { other_confidence: 0.55 });
        assert_eq!(t.status, MemoryStatus::Review);
        assert!(t.demote_other);
    }

    #[test]
    fn contradiction_with_a_clear_gap_just_demotes() {
        let t = apply_transition(0.6, MemoryStatus::Active, QualityEvent::Contradict { other_confidence: 0.1 });
        assert!(!t.demote_other);
        assert!((t.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn contradiction_confidence_floor_is_point_one() {
        let t = apply_transition(0.2, MemoryStatus::Unvetted, QualityEvent::Contradict { other_confidence: 0.1 });
        assert_eq!(t.confidence, 0.1);
    }

    #[test]
    fn decay_below_threshold_becomes_decayed() {
        let t = apply_transition(0.35, MemoryStatus::Active, QualityEvent::DecaySweep { delta: 0.10 });
        assert_eq!(t.status, MemoryStatus::Decayed);
    }

    #[test]
    fn sticky_statuses_ignore_non_resolve_events() {
        let t = apply_transition(0.1, MemoryStatus::Rejected, QualityEvent::Access { access_count: 0 });
        assert_eq!(t.status, MemoryStatus::Rejected);
        assert_eq!(t.confidence, 0.1);

        let t = apply_transition(0.4, MemoryStatus::Review, QualityEvent::Reaffirm);
        assert_eq!(t.status, MemoryStatus::Review);
    }

    #[test]
    fn user_resolve_escapes_sticky_states() {
        let t = apply_transition(0.4, MemoryStatus::Review, QualityEvent::UserResolve { resolution: Resolution::Confirm });
        assert_eq!(t.status, MemoryStatus::Trusted);
        assert_eq!(t.confidence, 0.95);
    }
}
