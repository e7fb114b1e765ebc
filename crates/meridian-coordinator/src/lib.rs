//! # meridian-coordinator
//!
//! Job ledger and workflow coordination. The `ResearchCoordinator` drives
//! the review -> curate -> fund pipeline, tracking every delegated step as
//! a ledger job and recording activity to a JSON-lines log.

mod activity_log;
mod coordinator;
mod ledger;

pub use activity_log::{ActivityEntry, ActivityKind, ActivityLog};
pub use coordinator::ResearchCoordinator;
pub use ledger::JobLedger;
