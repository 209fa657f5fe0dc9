//! Build result types.
//!
//! Contains types for representing the outcome of stage and pipeline runs.

use crate::build::Stage;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage completed
    Success,
    /// Stage not run (dry run)
    Skipped,
    /// Stage failed with error
    Failed(String),
}

impl StageStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, StageStatus::Success | StageStatus::Skipped)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, StageStatus::Failed(_))
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Success => write!(f, "success"),
            StageStatus::Skipped => write!(f, "skipped"),
            StageStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of one stage invocation.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage that ran
    pub stage: Stage,
    /// Outcome
    pub status: StageStatus,
    /// Files written (or, for cleanBuild, removed roots)
    pub outputs: Vec<PathBuf>,
    /// Stage duration
    pub duration: Duration,
    /// Non-fatal notes such as "no sources matched"
    pub warnings: Vec<String>,
}

impl StageResult {
    /// Create a successful result.
    pub fn success(stage: Stage, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { stage, status: StageStatus::Success, outputs, duration, warnings: vec![] }
    }

    /// Create a skipped result.
    pub fn skipped(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            outputs: vec![],
            duration: Duration::ZERO,
            warnings: vec![],
        }
    }

    /// Create a failed result.
    pub fn failed(stage: Stage, error: String, duration: Duration) -> Self {
        Self { stage, status: StageStatus::Failed(error), outputs: vec![], duration, warnings: vec![] }
    }

    /// Add warnings to the result.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each stage that ran, in order
    pub stages: Vec<StageResult>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage result.
    pub fn add_result(&mut self, result: StageResult) {
        self.stages.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Result for a given stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageResult> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Get the number of failed stages.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all outputs produced.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.stages.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    /// Get all warnings, prefixed with their stage.
    pub fn all_warnings(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| format!("{}: {}", r.stage, w)))
            .collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        match self.stages.iter().find(|r| r.status.is_failure()) {
            Some(failed) => {
                let completed = self.stages.iter().filter(|r| r.is_success()).count();
                lines.push(format!(
                    "Build failed at '{}' after {} completed stage{}",
                    failed.stage,
                    completed,
                    if completed == 1 { "" } else { "s" }
                ));
                lines.push(format!("  - {}: {}", failed.stage, failed.status));
            }
            None => {
                let stages: Vec<&str> = self.stages.iter().map(|r| r.stage.name()).collect();
                lines.push(format!(
                    "Build succeeded: {} file{} written by {} in {:?}",
                    self.all_outputs().len(),
                    if self.all_outputs().len() == 1 { "" } else { "s" },
                    stages.join(" → "),
                    self.total_duration
                ));
            }
        }

        let warnings = self.all_warnings();
        if !warnings.is_empty() {
            lines.push(format!("Warnings ({}): ", warnings.len()));
            for warning in warnings.iter().take(5) {
                lines.push(format!("  - {}", warning));
            }
            if warnings.len() > 5 {
                lines.push(format!("  ... and {} more", warnings.len() - 5));
            }
        }

        lines.join("\n")
    }
}
