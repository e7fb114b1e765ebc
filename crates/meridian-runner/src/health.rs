//! Startup health checks
//!
//! Verifies credentials and endpoint reachability before the loop does any
//! work. A required failure aborts the run; it is fatal, never retried.

use meridian_core::{MeridianConfig, MeridianError, Result};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub credentials_ok: bool,
    pub endpoint_ok: bool,
}

impl HealthReport {
    pub fn healthy(&self) -> bool {
        self.credentials_ok && self.endpoint_ok
    }
}

/// Run all startup checks, returning `HealthCheck` on any required failure
pub async fn run_health_check(config: &MeridianConfig) -> Result<HealthReport> {
    info!("Running startup health checks");

    let credentials_ok = std::env::var(&config.review.api_key_env)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    if !credentials_ok {
        return Err(MeridianError::HealthCheck(format!(
            "missing credential: {} is not set",
            config.review.api_key_env
        )));
    }
    info!("Credential check passed ({})", config.review.api_key_env);

    let endpoint_ok = probe_endpoint(
        &config.health.probe_url,
        Duration::from_secs(config.health.probe_timeout_secs),
    )
    .await;
    if !endpoint_ok {
        return Err(MeridianError::HealthCheck(format!(
            "endpoint unreachable: {}",
            config.health.probe_url
        )));
    }
    info!("Endpoint check passed ({})", config.health.probe_url);

    Ok(HealthReport {
        credentials_ok,
        endpoint_ok,
    })
}

async fn probe_endpoint(url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(e) => {
            warn!("Health probe client build failed: {}", e);
            return false;
        }
    };
    match client.get(url).send().await {
        // Any response counts as reachable; auth errors still mean the
        // endpoint is up.
        Ok(_) => true,
        Err(e) => {
            warn!("Health probe failed for {}: {}", url, e);
            false
        }
    }
}
