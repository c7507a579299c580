//! The Memory-Quality Engine (§4.4): a pure confidence/status state
//! machine over `memory_meta` rows, a context-budget ranking score, and a
//! decay scheduler that sweeps every tenant on a fixed interval.

pub mod context_budget;
pub mod decay_scheduler;
pub mod transitions;

pub use context_budget::context_budget_score;
pub use decay_scheduler::DecayScheduler;
pub use transitions::{apply_transition, QualityEvent, Resolution, Transition};
