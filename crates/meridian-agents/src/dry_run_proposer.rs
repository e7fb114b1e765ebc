//! Dry-run proposal collaborator
//!
//! Fabricates a submission receipt without touching a chain. Used when no
//! wallet is configured; real submission lives behind the same `Proposer`
//! trait in a deployment-specific crate.

use crate::traits::Proposer;
use async_trait::async_trait;
use chrono::Utc;
use meridian_core::{ProposalReceipt, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Proposer that records nothing on-chain and returns a synthetic receipt
#[derive(Default)]
pub struct DryRunProposer {
    counter: AtomicU64,
}

impl DryRunProposer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Proposer for DryRunProposer {
    async fn create_proposal(
        &self,
        hypothesis_id: &str,
        funding_goal_eth: &str,
        duration_days: u32,
    ) -> Result<ProposalReceipt> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now().timestamp_millis();

        tracing::info!(
            "Dry-run proposal for {} (goal: {} ETH, duration: {} days)",
            hypothesis_id,
            funding_goal_eth,
            duration_days
        );

        Ok(ProposalReceipt {
            proposal_id: id.to_string(),
            tx_hash: format!("0x{:016x}{:048x}", now, id),
            block_number: 0,
        })
    }
}
