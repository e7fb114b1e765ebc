//! Configuration management for Meridian
//!
//! Loads coordinator and runner settings from `meridian.toml`, including
//! per-task payment amounts, the approval threshold, proposal funding
//! defaults, and health-check endpoints.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Top-level Meridian configuration
///
/// Loaded from `meridian.toml` in the working directory, or defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeridianConfig {
    #[serde(default)]
    pub payments: PaymentConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub curation: CurationConfig,

    #[serde(default)]
    pub funding: FundingConfig,

    #[serde(default)]
    pub health: HealthConfig,
}

/// Payment amounts per delegated task, in nominal tokens
///
/// String-typed because payments are recorded, never computed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_review_payment")]
    pub review: String,

    #[serde(default = "default_curation_payment")]
    pub curation: String,
}

/// Peer-review settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Minimum overall score for approval
    #[serde(default = "default_approval_threshold")]
    pub approval_threshold: f64,

    /// Environment variable holding the reviewer API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint for the reviewer model
    #[serde(default = "default_review_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_review_model")]
    pub model: String,
}

/// Dataset curation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Maximum datasets returned per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Funding proposal defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Funding goal in ETH, passed through to the proposal collaborator
    #[serde(default = "default_funding_goal")]
    pub goal_eth: String,

    /// Proposal duration in days
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

/// Startup health check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Endpoint probed for reachability at startup
    #[serde(default = "default_probe_url")]
    pub probe_url: String,

    /// Probe timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

// Default value providers
fn default_review_payment() -> String {
    "5".to_string()
}

fn default_curation_payment() -> String {
    "10".to_string()
}

fn default_approval_threshold() -> f64 {
    7.0
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_review_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_review_model() -> String {
    "gpt-4".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_funding_goal() -> String {
    "0.1".to_string()
}

fn default_duration_days() -> u32 {
    30
}

fn default_probe_url() -> String {
    "https://api.openai.com/v1/models".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

impl MeridianConfig {
    /// Load configuration from `meridian.toml` under `dir`, or use defaults
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join("meridian.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::MeridianError::Config(format!("Failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `meridian.toml` under `dir`
    pub fn write_default(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let config_path = dir.join("meridian.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::MeridianError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            review: default_review_payment(),
            curation: default_curation_payment(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            approval_threshold: default_approval_threshold(),
            api_key_env: default_api_key_env(),
            api_url: default_review_api_url(),
            model: default_review_model(),
        }
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            goal_eth: default_funding_goal(),
            duration_days: default_duration_days(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_url: default_probe_url(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MeridianConfig::default();
        assert_eq!(config.payments.review, "5");
        assert_eq!(config.payments.curation, "10");
        assert_eq!(config.review.approval_threshold, 7.0);
        assert_eq!(config.curation.max_results, 3);
        assert_eq!(config.funding.goal_eth, "0.1");
        assert_eq!(config.funding.duration_days, 30);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = MeridianConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.funding.duration_days, 30);
    }

    #[test]
    fn test_write_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        MeridianConfig::write_default(temp_dir.path()).unwrap();

        let config = MeridianConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.payments.review, "5");
        assert_eq!(config.review.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("meridian.toml"),
            "[funding]\ngoal_eth = \"0.5\"\n",
        )
        .unwrap();

        let config = MeridianConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.funding.goal_eth, "0.5");
        assert_eq!(config.funding.duration_days, 30);
        assert_eq!(config.payments.review, "5");
    }
}
