//! Hypothesis sources
//!
//! The loop needs one submission per iteration. `RotatingSource` cycles
//! through a fixed list, either the built-in set or one loaded from a TOML
//! file.

use meridian_core::{HypothesisSubmission, MeridianError, Result};
use serde::Deserialize;
use std::path::Path;

/// Supplies one hypothesis submission per loop iteration
pub trait HypothesisSource: Send {
    fn next_submission(&mut self) -> Result<HypothesisSubmission>;
}

/// Cycles through a fixed list of submissions, assigning fresh ids
pub struct RotatingSource {
    entries: Vec<SourceEntry>,
    cursor: usize,
    issued: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub hypothesis: String,
    pub methodology: String,
    pub field: String,
}

#[derive(Deserialize)]
struct SourceFile {
    hypotheses: Vec<SourceEntry>,
}

impl RotatingSource {
    pub fn new(entries: Vec<SourceEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(MeridianError::Config(
                "hypothesis source has no entries".to_string(),
            ));
        }
        Ok(Self {
            entries,
            cursor: 0,
            issued: 0,
        })
    }

    /// Load `[[hypotheses]]` entries from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: SourceFile = toml::from_str(&content)
            .map_err(|e| MeridianError::Config(format!("invalid hypothesis file: {}", e)))?;
        Self::new(file.hypotheses)
    }

    pub fn builtin() -> Self {
        let entries = vec![
            SourceEntry {
                hypothesis: "Senolytic compounds reduce inflammatory markers in aged tissue"
                    .to_string(),
                methodology: "Randomized controlled trial with quarterly biomarker panels"
                    .to_string(),
                field: "aging".to_string(),
            },
            SourceEntry {
                hypothesis: "Gut microbiome diversity predicts healthspan independent of diet"
                    .to_string(),
                methodology: "Longitudinal cohort study with metagenomic sequencing".to_string(),
                field: "microbiome".to_string(),
            },
            SourceEntry {
                hypothesis: "Intermittent mTOR inhibition extends median lifespan in mammals"
                    .to_string(),
                methodology: "Dose-interval sweep in heterogeneous mouse populations".to_string(),
                field: "longevity".to_string(),
            },
        ];
        Self {
            entries,
            cursor: 0,
            issued: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HypothesisSource for RotatingSource {
    fn next_submission(&mut self) -> Result<HypothesisSubmission> {
        let entry = &self.entries[self.cursor];
        self.cursor = (self.cursor + 1) % self.entries.len();
        self.issued += 1;
        Ok(HypothesisSubmission {
            hypothesis_id: format!("hyp_{}", self.issued),
            hypothesis: entry.hypothesis.clone(),
            methodology: entry.methodology.clone(),
            field: entry.field.clone(),
        })
    }
}
