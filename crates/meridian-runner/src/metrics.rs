//! Per-run iteration metrics
//!
//! Accumulated by the operation loop across iterations, displayed on exit.
//! Never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rolling metrics for one runner process
#[derive(Debug, Clone, Serialize)]
pub struct IterationMetrics {
    pub started_at: DateTime<Utc>,
    pub iterations_completed: u64,
    pub successes: u64,
    pub failures: u64,
    pub hypotheses_processed: u64,
    pub datasets_found: u64,
    /// Incremental mean over all completed iterations, in seconds
    pub average_iteration_secs: f64,
    pub last_iteration_secs: f64,
    /// Resident set size at the last sample, in MB (0 off Linux)
    pub memory_mb: f64,
}

impl Default for IterationMetrics {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            iterations_completed: 0,
            successes: 0,
            failures: 0,
            hypotheses_processed: 0,
            datasets_found: 0,
            average_iteration_secs: 0.0,
            last_iteration_secs: 0.0,
            memory_mb: 0.0,
        }
    }
}

impl IterationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished iteration
    ///
    /// The mean is updated incrementally so it never needs the per-iteration
    /// history: `new_avg = (old_avg * n + x) / (n + 1)`.
    pub fn record_iteration(&mut self, duration_secs: f64, succeeded: bool, datasets_found: u64) {
        let n = self.iterations_completed as f64;
        self.average_iteration_secs = (self.average_iteration_secs * n + duration_secs) / (n + 1.0);
        self.last_iteration_secs = duration_secs;
        self.iterations_completed += 1;
        self.hypotheses_processed += 1;
        if succeeded {
            self.successes += 1;
            self.datasets_found += datasets_found;
        } else {
            self.failures += 1;
        }
        self.memory_mb = sample_memory_mb();
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Render the summary block printed on completion and shutdown
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Run Metrics ===\n");
        out.push_str(&format!("Uptime:             {}s\n", self.uptime_secs()));
        out.push_str(&format!(
            "Iterations:         {} ({} ok, {} failed)\n",
            self.iterations_completed, self.successes, self.failures
        ));
        out.push_str(&format!(
            "Hypotheses:         {}\n",
            self.hypotheses_processed
        ));
        out.push_str(&format!("Datasets found:     {}\n", self.datasets_found));
        out.push_str(&format!(
            "Avg iteration:      {:.2}s (last {:.2}s)\n",
            self.average_iteration_secs, self.last_iteration_secs
        ));
        out.push_str(&format!("Memory:             {:.1} MB\n", self.memory_mb));
        out
    }
}

/// Sample VmRSS from /proc/self/status; other platforms report 0
#[cfg(target_os = "linux")]
pub fn sample_memory_mb() -> f64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return 0.0;
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            if let Some(kb) = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<f64>().ok())
            {
                return kb / 1024.0;
            }
        }
    }
    0.0
}

#[cfg(not(target_os = "linux"))]
pub fn sample_memory_mb() -> f64 {
    0.0
}
