//! Rolling statistics for the reviewer and curator agents
//!
//! Both aggregators use the O(1) incremental mean identity
//! `new_avg = (old_avg * old_count + x) / (old_count + 1)` so averages are
//! never recomputed from history. Instances are dependency-injected (the
//! coordinator owns one of each) rather than process globals, so tests get
//! isolated state for free.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reviewer activity status
///
/// Kept distinct from `CuratorActivity` even though the values overlap
/// textually; the two lifecycles are unrelated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerActivity {
    #[default]
    Idle,
    Active,
}

/// Curator activity status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuratorActivity {
    #[default]
    Idle,
    Active,
}

/// Rolling aggregate of peer-review outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerStats {
    pub reviews_completed: u64,
    /// Incremental mean of all recorded overall scores
    pub average_score: f64,
    pub approved_count: u64,
    pub rejected_count: u64,
    pub status: ReviewerActivity,
    pub last_review: DateTime<Utc>,
}

impl ReviewerStats {
    pub fn new() -> Self {
        Self {
            reviews_completed: 0,
            average_score: 0.0,
            approved_count: 0,
            rejected_count: 0,
            status: ReviewerActivity::Idle,
            last_review: Utc::now(),
        }
    }

    /// Record one review outcome. O(1).
    pub fn record_review(&mut self, score: f64, approved: bool) {
        let total = self.average_score * self.reviews_completed as f64;
        self.reviews_completed += 1;
        self.average_score = (total + score) / self.reviews_completed as f64;

        if approved {
            self.approved_count += 1;
        } else {
            self.rejected_count += 1;
        }

        self.last_review = Utc::now();
        self.status = ReviewerActivity::Active;

        debug!(
            "Recorded review (score: {}, approved: {}), average now {:.2}",
            score, approved, self.average_score
        );
    }

    /// Discard all recorded state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ReviewerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling aggregate of dataset curation outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorStats {
    pub searches_performed: u64,
    /// Cumulative count across all searches
    pub datasets_found: u64,
    /// Known data-source names, fixed at construction
    pub sources: Vec<String>,
    pub status: CuratorActivity,
    pub last_search: DateTime<Utc>,
}

impl CuratorStats {
    pub fn new() -> Self {
        Self::with_sources(default_sources())
    }

    pub fn with_sources(sources: Vec<String>) -> Self {
        Self {
            searches_performed: 0,
            datasets_found: 0,
            sources,
            status: CuratorActivity::Idle,
            last_search: Utc::now(),
        }
    }

    /// Record one curation search and the number of datasets it found. O(1).
    pub fn record_search(&mut self, datasets_found: u64) {
        self.searches_performed += 1;
        self.datasets_found += datasets_found;
        self.last_search = Utc::now();
        self.status = CuratorActivity::Active;

        debug!(
            "Recorded search ({} datasets), totals: {} searches / {} datasets",
            datasets_found, self.searches_performed, self.datasets_found
        );
    }

    /// Discard all recorded state, keeping the source list
    pub fn reset(&mut self) {
        let sources = std::mem::take(&mut self.sources);
        *self = Self::with_sources(sources);
    }
}

impl Default for CuratorStats {
    fn default() -> Self {
        Self::new()
    }
}

fn default_sources() -> Vec<String> {
    vec![
        "Kaggle".to_string(),
        "UCI ML".to_string(),
        "PubMed Central".to_string(),
        "data.gov".to_string(),
    ]
}
