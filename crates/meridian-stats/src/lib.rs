//! # meridian-stats
//!
//! Rolling agent statistics for Meridian.
//!
//! Two independent aggregators consume workflow outcomes as side effects:
//! `ReviewerStats` tracks review counts and the running average score,
//! `CuratorStats` tracks searches and cumulative datasets found. Both are
//! plain injected structs with `reset()` for test isolation.

mod aggregators;

pub use aggregators::{CuratorActivity, CuratorStats, ReviewerActivity, ReviewerStats};
