//! Build pipeline orchestration.
//!
//! The pipeline runs [`Stage::BUILD_ORDER`] one stage at a time on the
//! calling thread and stops at the first failure.

use crate::build::{BuildContext, BuildResult, Stage, StageError, StageResult, StageRunner};
use std::time::Instant;
use thiserror::Error;

/// Error that halted a pipeline run.
///
/// Carries the results of the stages that completed before the failure,
/// with the failed stage recorded last.
#[derive(Debug, Error)]
#[error("Stage '{stage}' failed: {source}")]
pub struct PipelineError {
    /// Stage that failed
    pub stage: Stage,
    /// Underlying stage error
    #[source]
    pub source: StageError,
    /// Partial result up to and including the failed stage
    pub result: BuildResult,
}

/// Build pipeline for executing the full build.
#[derive(Debug)]
pub struct Pipeline {
    /// Runner for the individual stages
    runner: StageRunner,
    /// Whether to do a dry run (don't actually build)
    dry_run: bool,
}

impl Pipeline {
    /// Create a pipeline over the given runner.
    pub fn new(runner: StageRunner) -> Self {
        Self { runner, dry_run: false }
    }

    /// Create a pipeline with the bundled transforms and no observer.
    pub fn from_context(context: BuildContext) -> Self {
        Self::new(StageRunner::new(context))
    }

    /// Set dry-run mode (list stages without running them).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stages in the order [`Pipeline::run`] executes them.
    pub fn stages(&self) -> &'static [Stage] {
        &Stage::BUILD_ORDER
    }

    /// Run every stage in order.
    ///
    /// Outputs written by completed stages stay in place when a later stage
    /// fails.
    pub fn run(&self) -> Result<BuildResult, PipelineError> {
        let start = Instant::now();
        let mut result = BuildResult::new();

        tracing::debug!(
            "Build plan: {}",
            self.stages().iter().map(Stage::name).collect::<Vec<_>>().join(" → ")
        );

        for &stage in self.stages() {
            if self.dry_run {
                result.add_result(StageResult::skipped(stage));
                continue;
            }

            tracing::info!("Starting '{}'...", stage);
            let stage_start = Instant::now();
            match self.runner.run(stage) {
                Ok(stage_result) => {
                    tracing::info!("Finished '{}' after {:?}", stage, stage_result.duration);
                    result.add_result(stage_result);
                }
                Err(source) => {
                    tracing::error!("'{}' errored after {:?}: {}", stage, stage_start.elapsed(), source);
                    result.add_result(StageResult::failed(
                        stage,
                        source.to_string(),
                        stage_start.elapsed(),
                    ));
                    result.total_duration = start.elapsed();
                    return Err(PipelineError { stage, source, result });
                }
            }
        }

        Ok(result.with_duration(start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{RecordingObserver, StageEvent, StageStatus};
    use crate::config::default_config;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_skips_every_stage() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("build")).unwrap();
        let ctx = BuildContext::new(default_config(), temp.path().to_path_buf());

        let result = Pipeline::from_context(ctx).with_dry_run(true).run().unwrap();
        assert_eq!(result.stages.len(), Stage::BUILD_ORDER.len());
        assert!(result.stages.iter().all(|r| r.status == StageStatus::Skipped));
        assert!(temp.path().join("build").exists());
    }

    #[test]
    fn test_run_follows_build_order() {
        let temp = TempDir::new().unwrap();
        let recorder = Arc::new(RecordingObserver::new());
        let ctx = BuildContext::new(default_config(), temp.path().to_path_buf());
        let runner = StageRunner::new(ctx).with_observer(recorder.clone());

        let result = Pipeline::new(runner).run().unwrap();
        assert!(result.is_success());
        assert_eq!(recorder.started(), Stage::BUILD_ORDER.to_vec());
    }

    #[test]
    fn test_failure_halts_remaining_stages() {
        let temp = TempDir::new().unwrap();
        let css_dir = temp.path().join("app/styles/CSS");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("bad.css"), "h1(>h1) { color: red; }").unwrap();

        let recorder = Arc::new(RecordingObserver::new());
        let ctx = BuildContext::new(default_config(), temp.path().to_path_buf());
        let runner = StageRunner::new(ctx).with_observer(recorder.clone());

        let err = Pipeline::new(runner).run().unwrap_err();
        assert_eq!(err.stage, Stage::Css);
        assert!(err.source.is_transform());
        assert!(err.to_string().starts_with("Stage 'css' failed"));
        assert_eq!(err.result.failed_count(), 1);
        assert!(!recorder.started().contains(&Stage::Js));
        assert!(matches!(recorder.events().last(), Some(StageEvent::Failed { stage: Stage::Css, .. })));
    }
}
