//! Job ledger: the indexed store of every delegated unit of work
//!
//! Jobs are retained for the ledger's lifetime (no eviction) so they can be
//! listed and audited after the fact. The ledger trusts its callers to
//! transition forward only; lifecycle legality is guaranteed by the
//! coordinator's construction, not re-validated here.

use chrono::Utc;
use meridian_core::{Job, JobId, JobOutcome, JobParams, JobStatus, MeridianError, Result};
use std::collections::HashMap;

/// Indexed store of jobs with insertion-ordered listing
pub struct JobLedger {
    jobs: HashMap<JobId, Job>,
    /// Insertion order for `list()`
    order: Vec<JobId>,
    counter: u64,
}

impl JobLedger {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            order: Vec::new(),
            counter: 0,
        }
    }

    /// Allocate a fresh job id: wall-clock millis plus a per-ledger counter
    fn next_id(&mut self) -> JobId {
        self.counter += 1;
        JobId::new(Utc::now().timestamp_millis(), self.counter)
    }

    /// Create a pending job and return its id
    pub fn create_job(
        &mut self,
        requestor: impl Into<String>,
        provider: impl Into<String>,
        parameters: JobParams,
        payment: impl Into<String>,
    ) -> JobId {
        let job_id = self.next_id();
        let job = Job {
            job_id: job_id.clone(),
            requestor: requestor.into(),
            provider: provider.into(),
            task: parameters.kind(),
            parameters,
            payment: payment.into(),
            status: JobStatus::Pending,
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        self.jobs.insert(job_id.clone(), job);
        self.order.push(job_id.clone());
        job_id
    }

    /// Overwrite a job's status, attaching the result and completion time
    /// when moving to a terminal state
    pub fn transition(
        &mut self,
        job_id: &JobId,
        status: JobStatus,
        result: Option<JobOutcome>,
    ) -> Result<()> {
        let job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| MeridianError::UnknownJob(job_id.to_string()))?;

        job.status = status;
        if status.is_terminal() {
            job.completed_at = Some(Utc::now());
            if result.is_some() {
                job.result = result;
            }
        }

        Ok(())
    }

    pub fn get(&self, job_id: &JobId) -> Option<&Job> {
        self.jobs.get(job_id)
    }

    /// All jobs in insertion order
    pub fn list(&self) -> Vec<&Job> {
        self.order.iter().filter_map(|id| self.jobs.get(id)).collect()
    }

    pub fn list_by_status(&self, status: JobStatus) -> Vec<&Job> {
        self.list()
            .into_iter()
            .filter(|job| job.status == status)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobLedger {
    fn default() -> Self {
        Self::new()
    }
}
