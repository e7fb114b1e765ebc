//! Research workflow coordinator
//!
//! Runs the fixed pipeline for one hypothesis per invocation:
//! review -> approval gate -> curation (if approved) -> result assembly ->
//! proposal attempt (if ready for funding). Every delegated step is tracked
//! as a ledger job; statistics are updated as each step completes.
//!
//! Failure policy (one place, by construction):
//! - review or curation failure is fatal to the invocation
//! - proposal failure is logged and swallowed
//! - the coordinator never retries; retry is the operation loop's job

use crate::activity_log::{ActivityKind, ActivityLog};
use crate::ledger::JobLedger;
use meridian_agents::{Curator, Proposer, Reviewer};
use meridian_core::{
    Dataset, HypothesisReview, HypothesisSubmission, Job, JobId, JobOutcome, JobParams, JobStatus,
    MeridianConfig, MeridianError, Result, WorkflowResult,
};
use meridian_stats::{CuratorStats, ReviewerStats};
use tracing::{error, info, warn};

const REQUESTOR: &str = "research_agent";
const REVIEW_PROVIDER: &str = "peer_reviewer";
const CURATION_PROVIDER: &str = "data_curator";

/// Coordinates the multi-step research workflow across collaborator agents
///
/// Owns the job ledger and both statistics aggregators; a workflow
/// invocation takes `&mut self`, so sequential use is safe by construction.
/// Callers wanting concurrent invocations must wrap the coordinator in a
/// mutex.
pub struct ResearchCoordinator<R, C, P> {
    reviewer: R,
    curator: C,
    proposer: P,
    config: MeridianConfig,
    ledger: JobLedger,
    reviewer_stats: ReviewerStats,
    curator_stats: CuratorStats,
    activity_log: Option<ActivityLog>,
}

impl<R: Reviewer, C: Curator, P: Proposer> ResearchCoordinator<R, C, P> {
    pub fn new(reviewer: R, curator: C, proposer: P, config: MeridianConfig) -> Self {
        Self {
            reviewer,
            curator,
            proposer,
            config,
            ledger: JobLedger::new(),
            reviewer_stats: ReviewerStats::new(),
            curator_stats: CuratorStats::new(),
            activity_log: None,
        }
    }

    /// Enable activity logging to `<data_dir>/activity.jsonl`
    pub fn with_activity_log(mut self, data_dir: std::path::PathBuf) -> Self {
        self.activity_log = Some(ActivityLog::new(data_dir));
        self
    }

    /// Request peer review for a hypothesis, tracked as a ledger job
    pub async fn request_peer_review(
        &mut self,
        submission: &HypothesisSubmission,
    ) -> Result<HypothesisReview> {
        let job_id = self.ledger.create_job(
            REQUESTOR,
            REVIEW_PROVIDER,
            JobParams::ReviewHypothesis {
                hypothesis_id: submission.hypothesis_id.clone(),
                hypothesis: submission.hypothesis.clone(),
                methodology: submission.methodology.clone(),
                field: submission.field.clone(),
            },
            self.config.payments.review.clone(),
        );
        info!("Job created: {} (peer review)", job_id);

        self.ledger
            .transition(&job_id, JobStatus::InProgress, None)?;

        match self
            .reviewer
            .review_hypothesis(
                &submission.hypothesis_id,
                &submission.hypothesis,
                &submission.methodology,
                &submission.field,
            )
            .await
        {
            Ok(review) => {
                self.ledger.transition(
                    &job_id,
                    JobStatus::Completed,
                    Some(JobOutcome::ReviewHypothesis(review.clone())),
                )?;
                self.reviewer_stats
                    .record_review(review.overall_score, review.approved);

                info!(
                    "Job completed: {} (overall: {}, approved: {})",
                    job_id, review.overall_score, review.approved
                );
                self.log_activity(
                    ActivityKind::PeerReview,
                    format!(
                        "Peer review completed for {}",
                        submission.hypothesis_id
                    ),
                    Some(serde_json::json!({
                        "hypothesis_id": submission.hypothesis_id,
                        "field": submission.field,
                        "overall_score": review.overall_score,
                        "novelty_score": review.scores.novelty,
                        "feasibility_score": review.scores.feasibility,
                        "impact_score": review.scores.impact,
                        "rigor_score": review.scores.rigor,
                        "approved": review.approved,
                    })),
                    Some("PeerReviewAgent"),
                )
                .await;

                Ok(review)
            }
            Err(e) => {
                self.ledger.transition(&job_id, JobStatus::Failed, None)?;
                error!("Job failed: {} ({})", job_id, e);
                Err(MeridianError::ReviewFailed(e.to_string()))
            }
        }
    }

    /// Request dataset curation for a hypothesis, tracked as a ledger job
    pub async fn request_data_curation(
        &mut self,
        hypothesis: &str,
        field: &str,
    ) -> Result<Vec<Dataset>> {
        let max_results = self.config.curation.max_results;
        let job_id = self.ledger.create_job(
            REQUESTOR,
            CURATION_PROVIDER,
            JobParams::FindDatasets {
                hypothesis: hypothesis.to_string(),
                field: field.to_string(),
                max_results,
            },
            self.config.payments.curation.clone(),
        );
        info!("Job created: {} (data curation)", job_id);

        self.ledger
            .transition(&job_id, JobStatus::InProgress, None)?;

        match self.curator.find_datasets(hypothesis, field, max_results).await {
            Ok(search) => {
                let datasets = search.datasets.clone();
                self.ledger.transition(
                    &job_id,
                    JobStatus::Completed,
                    Some(JobOutcome::FindDatasets(search.clone())),
                )?;
                self.curator_stats.record_search(search.total_found as u64);

                info!(
                    "Job completed: {} ({} datasets found)",
                    job_id, search.total_found
                );
                self.log_activity(
                    ActivityKind::DataCuration,
                    format!("Found {} relevant datasets", search.total_found),
                    Some(serde_json::json!({
                        "field": field,
                        "datasets": datasets.iter().map(|d| d.name.clone()).collect::<Vec<_>>(),
                    })),
                    Some("DataCuratorAgent"),
                )
                .await;

                Ok(datasets)
            }
            Err(e) => {
                self.ledger.transition(&job_id, JobStatus::Failed, None)?;
                error!("Job failed: {} ({})", job_id, e);
                Err(MeridianError::CurationFailed(e.to_string()))
            }
        }
    }

    /// Run the complete research workflow for one hypothesis
    ///
    /// Flow: peer review -> (if approved) dataset curation -> result
    /// assembly -> (if ready for funding) automatic proposal creation.
    pub async fn coordinate_research(
        &mut self,
        submission: &HypothesisSubmission,
    ) -> Result<WorkflowResult> {
        info!(
            "Starting research workflow for {} (field: {})",
            submission.hypothesis_id, submission.field
        );

        // Step 1: peer review. Failure is fatal to the invocation.
        let peer_review = self.request_peer_review(submission).await?;

        // Step 2: approval gate
        let datasets = if peer_review.approved {
            info!("Hypothesis approved, requesting dataset curation");
            Some(
                self.request_data_curation(&submission.hypothesis, &submission.field)
                    .await?,
            )
        } else {
            info!(
                "Hypothesis not approved (score {}), skipping curation",
                peer_review.overall_score
            );
            None
        };

        // Step 3: result assembly. Approval alone makes a hypothesis
        // fundable; curation output does not gate funding.
        let result = WorkflowResult {
            hypothesis_id: submission.hypothesis_id.clone(),
            approved: peer_review.approved,
            ready_for_funding: peer_review.approved,
            peer_review,
            datasets,
        };

        // Step 4: automatic proposal. Failure here is non-fatal; the
        // caller retries proposal creation out-of-band.
        if result.ready_for_funding {
            self.submit_proposal(submission).await;
        } else {
            info!("Workflow complete: not ready for funding");
        }

        Ok(result)
    }

    async fn submit_proposal(&mut self, submission: &HypothesisSubmission) {
        let goal = self.config.funding.goal_eth.clone();
        let duration = self.config.funding.duration_days;

        info!(
            "Creating funding proposal for {} ({} ETH, {} days)",
            submission.hypothesis_id, goal, duration
        );

        match self
            .proposer
            .create_proposal(&submission.hypothesis_id, &goal, duration)
            .await
        {
            Ok(receipt) => {
                info!(
                    "Proposal {} created (tx: {})",
                    receipt.proposal_id, receipt.tx_hash
                );
                self.log_activity(
                    ActivityKind::ProposalCreated,
                    format!("Created proposal {}", receipt.proposal_id),
                    Some(serde_json::json!({
                        "proposal_id": receipt.proposal_id,
                        "hypothesis_id": submission.hypothesis_id,
                        "funding_goal_eth": goal,
                        "duration_days": duration,
                        "tx_hash": receipt.tx_hash,
                        "block_number": receipt.block_number,
                    })),
                    None,
                )
                .await;
            }
            Err(e) => {
                warn!(
                    "Proposal creation failed for {}, workflow still succeeds: {}",
                    submission.hypothesis_id, e
                );
                self.log_activity(
                    ActivityKind::WorkflowError,
                    format!(
                        "Proposal creation failed for {}: {}",
                        submission.hypothesis_id, e
                    ),
                    None,
                    None,
                )
                .await;
            }
        }
    }

    async fn log_activity(
        &self,
        kind: ActivityKind,
        message: String,
        data: Option<serde_json::Value>,
        agent: Option<&str>,
    ) {
        if let Some(log) = &self.activity_log {
            log.record(kind, message, data, agent).await;
        }
    }

    // Read accessors

    pub fn get_job(&self, job_id: &JobId) -> Option<&Job> {
        self.ledger.get(job_id)
    }

    pub fn list_jobs(&self) -> Vec<&Job> {
        self.ledger.list()
    }

    pub fn list_jobs_by_status(&self, status: JobStatus) -> Vec<&Job> {
        self.ledger.list_by_status(status)
    }

    pub fn reviewer_stats(&self) -> &ReviewerStats {
        &self.reviewer_stats
    }

    pub fn curator_stats(&self) -> &CuratorStats {
        &self.curator_stats
    }

    /// Reset both aggregators (test isolation)
    pub fn reset_stats(&mut self) {
        self.reviewer_stats.reset();
        self.curator_stats.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_core::{DatasetSearch, ProposalReceipt, ReviewScores, TaskKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubReviewer {
        scores: ReviewScores,
        fail: bool,
    }

    #[async_trait]
    impl Reviewer for StubReviewer {
        async fn review_hypothesis(
            &self,
            hypothesis_id: &str,
            _hypothesis: &str,
            _methodology: &str,
            _field: &str,
        ) -> Result<HypothesisReview> {
            if self.fail {
                return Err(MeridianError::Api("reviewer unavailable".to_string()));
            }
            Ok(HypothesisReview::from_scores(hypothesis_id, self.scores, 7.0))
        }
    }

    struct StubCurator {
        count: usize,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Curator for StubCurator {
        async fn find_datasets(
            &self,
            _hypothesis: &str,
            _field: &str,
            max_results: usize,
        ) -> Result<DatasetSearch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MeridianError::Api("curator unavailable".to_string()));
            }
            let datasets: Vec<Dataset> = meridian_agents::builtin_catalog()
                .into_iter()
                .take(self.count.min(max_results))
                .collect();
            let total_found = datasets.len();
            Ok(DatasetSearch {
                datasets,
                total_found,
            })
        }
    }

    struct StubProposer {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Proposer for StubProposer {
        async fn create_proposal(
            &self,
            _hypothesis_id: &str,
            _funding_goal_eth: &str,
            _duration_days: u32,
        ) -> Result<ProposalReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MeridianError::ProposalFailed("rpc down".to_string()));
            }
            Ok(ProposalReceipt {
                proposal_id: "1".to_string(),
                tx_hash: "0xabc".to_string(),
                block_number: 42,
            })
        }
    }

    fn submission() -> HypothesisSubmission {
        HypothesisSubmission {
            hypothesis_id: "H1".to_string(),
            hypothesis: "NAD+ decline drives cellular aging".to_string(),
            methodology: "Longitudinal metabolite cohort study".to_string(),
            field: "aging".to_string(),
        }
    }

    fn approved_scores() -> ReviewScores {
        ReviewScores {
            novelty: 8.0,
            feasibility: 7.0,
            impact: 9.0,
            rigor: 8.0,
        }
    }

    fn rejected_scores() -> ReviewScores {
        ReviewScores {
            novelty: 3.0,
            feasibility: 4.0,
            impact: 5.0,
            rigor: 4.0,
        }
    }

    fn coordinator(
        reviewer: StubReviewer,
        curator: StubCurator,
        proposer: StubProposer,
    ) -> ResearchCoordinator<StubReviewer, StubCurator, StubProposer> {
        ResearchCoordinator::new(reviewer, curator, proposer, MeridianConfig::default())
    }

    #[tokio::test]
    async fn test_approved_workflow_creates_both_jobs() {
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: false,
            },
            StubCurator {
                count: 2,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        let result = coordinator.coordinate_research(&submission()).await.unwrap();

        assert_eq!(result.peer_review.overall_score, 8.0);
        assert!(result.approved);
        assert!(result.ready_for_funding);
        assert_eq!(result.datasets.as_ref().unwrap().len(), 2);

        let jobs = coordinator.list_jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].task, TaskKind::ReviewHypothesis);
        assert_eq!(jobs[1].task, TaskKind::FindDatasets);
        assert!(jobs.iter().all(|j| j.status == JobStatus::Completed));
    }

    #[tokio::test]
    async fn test_rejected_workflow_skips_curation() {
        let curator_calls = Arc::new(AtomicUsize::new(0));
        let mut coordinator = coordinator(
            StubReviewer {
                scores: rejected_scores(),
                fail: false,
            },
            StubCurator {
                count: 2,
                fail: false,
                calls: curator_calls.clone(),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        let result = coordinator.coordinate_research(&submission()).await.unwrap();

        assert_eq!(result.peer_review.overall_score, 4.0);
        assert!(!result.approved);
        assert!(!result.ready_for_funding);
        assert!(result.datasets.is_none());

        // Exactly one job total; the curator was never called
        assert_eq!(coordinator.list_jobs().len(), 1);
        assert_eq!(curator_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_review_failure_creates_no_curation_job() {
        let curator_calls = Arc::new(AtomicUsize::new(0));
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: true,
            },
            StubCurator {
                count: 2,
                fail: false,
                calls: curator_calls.clone(),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        let result = coordinator.coordinate_research(&submission()).await;
        assert!(matches!(result, Err(MeridianError::ReviewFailed(_))));

        let jobs = coordinator.list_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Failed);
        assert_eq!(curator_calls.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.reviewer_stats().reviews_completed, 0);
    }

    #[tokio::test]
    async fn test_curation_failure_fails_whole_workflow() {
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: false,
            },
            StubCurator {
                count: 0,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        let result = coordinator.coordinate_research(&submission()).await;
        assert!(matches!(result, Err(MeridianError::CurationFailed(_))));

        let failed = coordinator.list_jobs_by_status(JobStatus::Failed);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].task, TaskKind::FindDatasets);
    }

    #[tokio::test]
    async fn test_proposal_failure_is_swallowed() {
        let proposer_calls = Arc::new(AtomicUsize::new(0));
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: false,
            },
            StubCurator {
                count: 1,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: true,
                calls: proposer_calls.clone(),
            },
        );

        let result = coordinator.coordinate_research(&submission()).await.unwrap();

        assert!(result.ready_for_funding);
        assert_eq!(proposer_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_proposal_attempt_when_rejected() {
        let proposer_calls = Arc::new(AtomicUsize::new(0));
        let mut coordinator = coordinator(
            StubReviewer {
                scores: rejected_scores(),
                fail: false,
            },
            StubCurator {
                count: 1,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: false,
                calls: proposer_calls.clone(),
            },
        );

        coordinator.coordinate_research(&submission()).await.unwrap();
        assert_eq!(proposer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ready_for_funding_implies_approved() {
        for scores in [approved_scores(), rejected_scores()] {
            let mut coordinator = coordinator(
                StubReviewer {
                    scores,
                    fail: false,
                },
                StubCurator {
                    count: 0,
                    fail: false,
                    calls: Arc::new(AtomicUsize::new(0)),
                },
                StubProposer {
                    fail: false,
                    calls: Arc::new(AtomicUsize::new(0)),
                },
            );

            let result = coordinator.coordinate_research(&submission()).await.unwrap();
            assert!(!result.ready_for_funding || result.approved);
        }
    }

    #[tokio::test]
    async fn test_stats_updated_as_side_effect() {
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: false,
            },
            StubCurator {
                count: 2,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        coordinator.coordinate_research(&submission()).await.unwrap();

        assert_eq!(coordinator.reviewer_stats().reviews_completed, 1);
        assert_eq!(coordinator.reviewer_stats().approved_count, 1);
        assert!((coordinator.reviewer_stats().average_score - 8.0).abs() < 1e-9);
        assert_eq!(coordinator.curator_stats().searches_performed, 1);
        assert_eq!(coordinator.curator_stats().datasets_found, 2);

        coordinator.reset_stats();
        assert_eq!(coordinator.reviewer_stats().reviews_completed, 0);
        assert_eq!(coordinator.curator_stats().searches_performed, 0);
    }

    #[tokio::test]
    async fn test_no_job_left_pending_after_workflow() {
        let mut coordinator = coordinator(
            StubReviewer {
                scores: approved_scores(),
                fail: false,
            },
            StubCurator {
                count: 1,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            StubProposer {
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        coordinator.coordinate_research(&submission()).await.unwrap();

        assert!(coordinator.list_jobs_by_status(JobStatus::Pending).is_empty());
        assert!(coordinator
            .list_jobs_by_status(JobStatus::InProgress)
            .is_empty());
    }
}
