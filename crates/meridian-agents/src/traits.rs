//! Collaborator contracts for the workflow coordinator
//!
//! The coordinator only ever sees these traits. Each external capability
//! (peer review, dataset curation, proposal submission) sits behind one,
//! so tests can inject deterministic fakes and the coordinator never
//! touches HTTP or chain plumbing.

use async_trait::async_trait;
use meridian_core::{DatasetSearch, HypothesisReview, ProposalReceipt, Result};

/// Peer-review collaborator: scores a hypothesis on four criteria and
/// decides approval against the configured threshold
#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review_hypothesis(
        &self,
        hypothesis_id: &str,
        hypothesis: &str,
        methodology: &str,
        field: &str,
    ) -> Result<HypothesisReview>;
}

/// Dataset curation collaborator: returns at most `max_results` datasets
/// relevant to the hypothesis
#[async_trait]
pub trait Curator: Send + Sync {
    async fn find_datasets(
        &self,
        hypothesis: &str,
        field: &str,
        max_results: usize,
    ) -> Result<DatasetSearch>;
}

/// Proposal collaborator: submits a funding proposal for an approved
/// hypothesis and returns the submission receipt
#[async_trait]
pub trait Proposer: Send + Sync {
    async fn create_proposal(
        &self,
        hypothesis_id: &str,
        funding_goal_eth: &str,
        duration_days: u32,
    ) -> Result<ProposalReceipt>;
}
