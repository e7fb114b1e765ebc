//! Core type definitions for Meridian workflow coordination

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tasks that can be delegated to a collaborator agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    ReviewHypothesis,
    FindDatasets,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReviewHypothesis => write!(f, "review_hypothesis"),
            Self::FindDatasets => write!(f, "find_datasets"),
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "review_hypothesis" => Ok(Self::ReviewHypothesis),
            "find_datasets" => Ok(Self::FindDatasets),
            _ => Err(format!("Invalid task kind: {}", s)),
        }
    }
}

/// Job status lifecycle: pending -> in_progress -> {completed | failed}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and Failed are terminal; Pending and InProgress are transient
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Job identifier
///
/// Format: job_{unix-millis}_{counter} (e.g. job_1717020000000_3).
/// The counter is per-ledger, so ids are collision-free within a process
/// even when two jobs land on the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(timestamp_millis: i64, counter: u64) -> Self {
        Self(format!("job_{}_{}", timestamp_millis, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters for a delegated task, keyed by task kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum JobParams {
    ReviewHypothesis {
        hypothesis_id: String,
        hypothesis: String,
        methodology: String,
        field: String,
    },
    FindDatasets {
        hypothesis: String,
        field: String,
        max_results: usize,
    },
}

impl JobParams {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::ReviewHypothesis { .. } => TaskKind::ReviewHypothesis,
            Self::FindDatasets { .. } => TaskKind::FindDatasets,
        }
    }
}

/// Result payload attached to a completed job, keyed by task kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum JobOutcome {
    ReviewHypothesis(HypothesisReview),
    FindDatasets(DatasetSearch),
}

/// One tracked invocation of an external capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    /// Requesting party (e.g. "research_agent")
    pub requestor: String,
    /// Serving party (e.g. "peer_reviewer", "data_curator")
    pub provider: String,
    pub task: TaskKind,
    pub parameters: JobParams,
    /// Payment amount in nominal tokens. String-typed: never arithmetic.
    pub payment: String,
    pub status: JobStatus,
    pub result: Option<JobOutcome>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The four review sub-scores, each on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewScores {
    pub novelty: f64,
    pub feasibility: f64,
    pub impact: f64,
    pub rigor: f64,
}

impl ReviewScores {
    /// Mean of the four sub-scores, rounded to one decimal
    pub fn overall(&self) -> f64 {
        let mean = (self.novelty + self.feasibility + self.impact + self.rigor) / 4.0;
        (mean * 10.0).round() / 10.0
    }
}

/// Peer-review outcome for one hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisReview {
    pub hypothesis_id: String,
    pub scores: ReviewScores,
    /// Rounded mean of the four sub-scores
    pub overall_score: f64,
    /// overall_score >= approval threshold (7.0 by default)
    pub approved: bool,
    pub feedback: String,
    pub reviewer_confidence: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl HypothesisReview {
    /// Build a review from sub-scores, applying the approval threshold to
    /// the rounded overall score
    pub fn from_scores(
        hypothesis_id: impl Into<String>,
        scores: ReviewScores,
        threshold: f64,
    ) -> Self {
        let overall = scores.overall();
        Self {
            hypothesis_id: hypothesis_id.into(),
            scores,
            overall_score: overall,
            approved: overall >= threshold,
            feedback: String::new(),
            reviewer_confidence: 0.0,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Dataset access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Restricted,
    Request,
}

/// Metadata for one curated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub source: String,
    pub url: String,
    pub description: String,
    pub size: String,
    pub format: String,
    pub relevance_score: f64,
    pub access: AccessLevel,
}

/// Outcome of one dataset curation search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSearch {
    pub datasets: Vec<Dataset>,
    pub total_found: usize,
}

/// Receipt returned by the proposal collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalReceipt {
    pub proposal_id: String,
    pub tx_hash: String,
    pub block_number: u64,
}

/// One hypothesis submitted to the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSubmission {
    pub hypothesis_id: String,
    pub hypothesis: String,
    pub methodology: String,
    pub field: String,
}

/// Outcome of one full pipeline run for one hypothesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub hypothesis_id: String,
    pub peer_review: HypothesisReview,
    /// Present only when the approval gate passed and curation ran
    pub datasets: Option<Vec<Dataset>>,
    pub approved: bool,
    /// Invariant: ready_for_funding implies approved
    pub ready_for_funding: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_format() {
        let id = JobId::new(1717020000000, 3);
        assert_eq!(id.to_string(), "job_1717020000000_3");
    }

    #[test]
    fn test_job_status_roundtrip() {
        let status: JobStatus = "in_progress".parse().unwrap();
        assert_eq!(status, JobStatus::InProgress);
        assert_eq!(status.to_string(), "in_progress");
        assert!(!status.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_task_kind_parsing() {
        let kind: TaskKind = "review_hypothesis".parse().unwrap();
        assert_eq!(kind, TaskKind::ReviewHypothesis);
        assert_eq!(TaskKind::FindDatasets.to_string(), "find_datasets");
        assert!("curate".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_overall_score_rounds_to_one_decimal() {
        let scores = ReviewScores {
            novelty: 8.0,
            feasibility: 7.0,
            impact: 9.0,
            rigor: 8.0,
        };
        assert_eq!(scores.overall(), 8.0);

        let scores = ReviewScores {
            novelty: 7.0,
            feasibility: 7.0,
            impact: 7.0,
            rigor: 6.5,
        };
        // Mean is 6.875, rounds to 6.9
        assert_eq!(scores.overall(), 6.9);
    }

    #[test]
    fn test_approval_threshold_boundary() {
        let at_threshold = ReviewScores {
            novelty: 7.0,
            feasibility: 7.0,
            impact: 7.0,
            rigor: 7.0,
        };
        let review = HypothesisReview::from_scores("h-1", at_threshold, 7.0);
        assert_eq!(review.overall_score, 7.0);
        assert!(review.approved);

        let below = ReviewScores {
            novelty: 7.0,
            feasibility: 7.0,
            impact: 7.0,
            rigor: 6.6,
        };
        let review = HypothesisReview::from_scores("h-2", below, 7.0);
        assert_eq!(review.overall_score, 6.9);
        assert!(!review.approved);
    }

    #[test]
    fn test_job_params_tagged_serialization() {
        let params = JobParams::FindDatasets {
            hypothesis: "NAD+ supplementation slows aging".to_string(),
            field: "longevity".to_string(),
            max_results: 3,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"task\":\"find_datasets\""));

        let parsed: JobParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind(), TaskKind::FindDatasets);
    }
}
