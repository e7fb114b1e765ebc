//! # meridian-runner
//!
//! The operation loop that drives the coordinator: single, continuous, and
//! test modes, startup health checks, per-iteration retry with exponential
//! backoff, iteration metrics, and interruptible waits for graceful
//! shutdown.

mod health;
mod metrics;
mod runner;
mod source;

pub use health::{run_health_check, HealthReport};
pub use metrics::{sample_memory_mb, IterationMetrics};
pub use runner::{wait_interruptible, OperationConfig, OperationLoop, OperationMode};
pub use source::{HypothesisSource, RotatingSource, SourceEntry};
