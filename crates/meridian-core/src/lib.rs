//! # meridian-core
//!
//! Core types for the Meridian research workflow coordinator.
//!
//! Meridian coordinates a multi-agent research pipeline: a hypothesis is
//! peer-reviewed, approved hypotheses get dataset curation, and hypotheses
//! ready for funding get an on-chain proposal. Every delegated step is
//! tracked as a Job with a strict status lifecycle.
//!
//! ## Core Paradigm
//!
//! - Every external call IS a Job (pending -> in_progress -> terminal)
//! - The approval gate (overall review score >= 7.0) decides whether
//!   curation runs
//! - `ready_for_funding` implies `approved`, always

mod config;
mod error;
pub mod fail_open;
mod types;

pub use config::{
    CurationConfig, FundingConfig, HealthConfig, MeridianConfig, PaymentConfig, ReviewConfig,
};
pub use error::{MeridianError, Result};
pub use types::*;
