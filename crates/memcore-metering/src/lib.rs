//! # memcore-metering
//!
//! Tier-limit enforcement (§4.12): a locking check for request paths that
//! must reject synchronously, a non-locking check for background tasks,
//! and a buffered usage-counter flush timer that feeds dashboard
//! analytics without ever gating a write itself.

pub mod flush;
pub mod limit;

pub use flush::UsageFlusher;
pub use limit::{soft_check, with_tier_limit_lock, MeteredResource};
