//! Activity log: append-only JSON-lines record of research activity
//!
//! Each workflow step appends a structured entry the out-of-scope dashboard
//! layer can tail and render. Writes are fire-and-forget: a logging failure
//! never fails the workflow.

use chrono::{DateTime, Utc};
use meridian_core::fail_open::fail_open;
use meridian_core::{MeridianError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Activity categories rendered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PeerReview,
    DataCuration,
    ProposalCreated,
    WorkflowError,
    Info,
}

/// One structured activity entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Append-only activity sink writing JSON lines to `activity.jsonl`
pub struct ActivityLog {
    output_path: PathBuf,
}

impl ActivityLog {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            output_path: data_dir.join("activity.jsonl"),
        }
    }

    /// Record an activity entry
    ///
    /// This operation is fail-open - logging failures won't fail the workflow
    pub async fn record(
        &self,
        kind: ActivityKind,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
        agent: Option<&str>,
    ) {
        let entry = ActivityEntry {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            data,
            agent: agent.map(String::from),
        };

        fail_open("activity_log::record", || self.append(&entry)).await;
    }

    async fn append(&self, entry: &ActivityEntry) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MeridianError::Io)?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await
            .map_err(MeridianError::Io)?;

        file.write_all(line.as_bytes())
            .await
            .map_err(MeridianError::Io)?;
        file.flush().await.map_err(MeridianError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_entries_append_as_json_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = ActivityLog::new(temp_dir.path().to_path_buf());

        log.record(
            ActivityKind::PeerReview,
            "Peer review completed for h-1",
            Some(serde_json::json!({ "overall_score": 8.0, "approved": true })),
            Some("PeerReviewAgent"),
        )
        .await;
        log.record(ActivityKind::Info, "Workflow complete", None, None)
            .await;

        let content = fs::read_to_string(temp_dir.path().join("activity.jsonl"))
            .await
            .unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ActivityEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.kind, ActivityKind::PeerReview);
        assert_eq!(first.agent.as_deref(), Some("PeerReviewAgent"));
        assert_eq!(first.data.unwrap()["overall_score"], 8.0);

        let second: ActivityEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.kind, ActivityKind::Info);
        assert!(second.agent.is_none());
    }

    #[tokio::test]
    async fn test_missing_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("data").join("logs");
        let log = ActivityLog::new(nested.clone());

        log.record(ActivityKind::Info, "first entry", None, None).await;

        assert!(nested.join("activity.jsonl").exists());
    }
}
