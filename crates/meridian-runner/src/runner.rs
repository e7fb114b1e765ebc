//! Operation loop
//!
//! Drives the workflow coordinator once, N times, or indefinitely on an
//! interval. Retry lives here and only here: the coordinator propagates step
//! failures, and the loop decides whether an iteration gets another attempt.

use crate::health::run_health_check;
use crate::metrics::IterationMetrics;
use crate::source::HypothesisSource;
use meridian_agents::{Curator, Proposer, Reviewer};
use meridian_coordinator::ResearchCoordinator;
use meridian_core::{Result, WorkflowResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Retries per iteration after the initial attempt
const MAX_RETRIES: u32 = 3;
/// Backoff before retry n (1-based) is BASE_DELAY_SECS * 2^(n-1): 1s, 2s, 4s
const BASE_DELAY_SECS: u64 = 1;
/// Granularity of the interruptible inter-iteration wait
const WAIT_SLICE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// One iteration, then exit; failure is fatal
    Single,
    /// Iterate on an interval until shutdown
    Continuous,
    /// A fixed number of back-to-back iterations
    Test,
}

#[derive(Debug, Clone)]
pub struct OperationConfig {
    pub mode: OperationMode,
    pub interval_minutes: u64,
    /// 0 means unlimited (continuous mode only)
    pub max_iterations: u64,
    pub enable_health_checks: bool,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            mode: OperationMode::Single,
            interval_minutes: 60,
            max_iterations: 0,
            enable_health_checks: true,
        }
    }
}

/// Sleep for `interval`, polling the shutdown flag every slice
///
/// Returns true if the wait was cut short by shutdown.
pub async fn wait_interruptible(interval: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    while Instant::now() < deadline {
        if shutdown.load(Ordering::SeqCst) {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(remaining.min(WAIT_SLICE)).await;
    }
    shutdown.load(Ordering::SeqCst)
}

/// Runs coordinator iterations under an `OperationConfig`
pub struct OperationLoop<R, C, P, S> {
    coordinator: ResearchCoordinator<R, C, P>,
    source: S,
    config: OperationConfig,
    shutdown: Arc<AtomicBool>,
    metrics: IterationMetrics,
}

impl<R, C, P, S> OperationLoop<R, C, P, S>
where
    R: Reviewer,
    C: Curator,
    P: Proposer,
    S: HypothesisSource,
{
    pub fn new(
        coordinator: ResearchCoordinator<R, C, P>,
        source: S,
        config: OperationConfig,
    ) -> Self {
        Self {
            coordinator,
            source,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            metrics: IterationMetrics::new(),
        }
    }

    /// Flag checked at iteration boundaries and during the interval wait
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn metrics(&self) -> &IterationMetrics {
        &self.metrics
    }

    pub fn coordinator(&self) -> &ResearchCoordinator<R, C, P> {
        &self.coordinator
    }

    /// Run to completion per the configured mode
    pub async fn run(&mut self, config: &meridian_core::MeridianConfig) -> Result<()> {
        if self.config.enable_health_checks {
            run_health_check(config).await?;
        } else {
            info!("Health checks disabled, skipping");
        }

        match self.config.mode {
            OperationMode::Single => {
                info!("Running a single iteration");
                self.run_iteration_with_retry().await.map(|_| ())
            }
            OperationMode::Test => {
                let count = if self.config.max_iterations == 0 {
                    3
                } else {
                    self.config.max_iterations
                };
                info!("Running {} test iterations", count);
                for i in 1..=count {
                    if self.shutdown.load(Ordering::SeqCst) {
                        info!("Shutdown requested, stopping after {} iterations", i - 1);
                        break;
                    }
                    info!("=== Test iteration {} of {} ===", i, count);
                    if let Err(e) = self.run_iteration_with_retry().await {
                        warn!("Iteration {} failed: {}", i, e);
                    }
                }
                Ok(())
            }
            OperationMode::Continuous => {
                info!(
                    "Running continuously (interval: {} minutes)",
                    self.config.interval_minutes
                );
                let interval = Duration::from_secs(self.config.interval_minutes * 60);
                let mut iteration: u64 = 0;
                loop {
                    if self.shutdown.load(Ordering::SeqCst) {
                        info!("Shutdown requested, exiting loop");
                        break;
                    }
                    iteration += 1;
                    if self.config.max_iterations > 0 && iteration > self.config.max_iterations {
                        info!("Reached max iterations ({})", self.config.max_iterations);
                        break;
                    }
                    info!("=== Iteration {} ===", iteration);
                    if let Err(e) = self.run_iteration_with_retry().await {
                        warn!("Iteration {} failed: {}", iteration, e);
                    }
                    if wait_interruptible(interval, &self.shutdown).await {
                        info!("Wait interrupted by shutdown");
                        break;
                    }
                }
                Ok(())
            }
        }
    }

    /// One iteration: pull a submission, run the workflow, retry on failure
    ///
    /// Retries up to 3 times with 1s/2s/4s backoff. Exhausted retries count
    /// the iteration as failed and return the last error.
    async fn run_iteration_with_retry(&mut self) -> Result<WorkflowResult> {
        let submission = self.source.next_submission()?;
        let started = Instant::now();

        let mut attempt: u32 = 0;
        loop {
            match self.coordinator.coordinate_research(&submission).await {
                Ok(result) => {
                    let datasets_found =
                        result.datasets.as_ref().map(|d| d.len() as u64).unwrap_or(0);
                    self.metrics.record_iteration(
                        started.elapsed().as_secs_f64(),
                        true,
                        datasets_found,
                    );
                    info!(
                        "Iteration complete for {} (approved: {}, funding: {})",
                        result.hypothesis_id, result.approved, result.ready_for_funding
                    );
                    return Ok(result);
                }
                Err(e) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    let delay = Duration::from_secs(BASE_DELAY_SECS << (attempt - 1));
                    warn!(
                        "Workflow failed (attempt {} of {}), retrying in {:?}: {}",
                        attempt,
                        MAX_RETRIES + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.metrics
                        .record_iteration(started.elapsed().as_secs_f64(), false, 0);
                    error!(
                        "Iteration failed after {} attempts: {}",
                        MAX_RETRIES + 1,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Render the final state printed on completion or shutdown
    pub fn render_final_state(&self) -> String {
        let reviewer = self.coordinator.reviewer_stats();
        let curator = self.coordinator.curator_stats();
        let mut out = self.metrics.render_summary();
        out.push_str(&format!(
            "Reviews:            {} ({} approved, {} rejected, avg {:.1})\n",
            reviewer.reviews_completed,
            reviewer.approved_count,
            reviewer.rejected_count,
            reviewer.average_score
        ));
        out.push_str(&format!(
            "Searches:           {} ({} datasets)\n",
            curator.searches_performed, curator.datasets_found
        ));
        out
    }
}
