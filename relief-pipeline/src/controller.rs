//! Pipeline controller.
//!
//! Sequences the stages strictly one after another:
//!
//! `Init -> Cleaned -> Reconstructed -> QualityChecked -> Meshed ->
//! ArtifactSelected -> Converted | Skipped -> Done`
//!
//! Any fatal error moves the controller to `Failed` and stops the run. The
//! quality gate never blocks; a missing mesh artifact only skips conversion.

use crate::artifact::{ArtifactSelection, inspect_artifact, select_artifact};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::quality::{QualityReport, check_quality};
use crate::runner::{StageRunner, preflight};
use crate::stages::{ConvertedArtifacts, run_conversion, run_meshing, run_reconstruction};
use crate::summary::RunSummary;
use crate::workspace::SceneLayout;
use serde::Serialize;
use std::fs;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Cleaned,
    Reconstructed,
    QualityChecked,
    Meshed,
    ArtifactSelected,
    Converted,
    Skipped,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub layout: SceneLayout,
    pub input_images: usize,
    pub quality: QualityReport,
    pub artifact: ArtifactSelection,
    pub converted: Option<ConvertedArtifacts>,
}

/// Drives one scene through every stage with the given runner.
pub struct Pipeline<R: StageRunner> {
    config: PipelineConfig,
    runner: R,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<R: StageRunner> Pipeline<R> {
    pub fn new(config: PipelineConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            state: PipelineState::Init,
            history: vec![PipelineState::Init],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited so far, starting with `Init`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn transition(&mut self, next: PipelineState) {
        info!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Run every stage. On error the controller ends in `Failed`.
    pub fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        match self.run_stages() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Pipeline failed in state {:?}: {}", self.state, e);
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&mut self) -> Result<PipelineOutcome, PipelineError> {
        let scene = &self.config.scene_dir;
        if !scene.is_dir() {
            return Err(PipelineError::SceneNotFound(scene.clone()));
        }
        let root = fs::canonicalize(scene).map_err(|source| PipelineError::Workspace {
            path: scene.clone(),
            source,
        })?;
        let layout = SceneLayout::new(&root);
        info!("Scene directory: {}", root.display());

        if self.config.preflight {
            preflight(&self.config.tools)?;
        }
        let input_images = layout.count_input_images()?;

        layout.clean()?;
        self.transition(PipelineState::Cleaned);

        run_reconstruction(&mut self.runner, &self.config.tools, &layout)?;
        self.transition(PipelineState::Reconstructed);

        let quality = check_quality(&layout.sparse_dir())?;
        self.transition(PipelineState::QualityChecked);

        run_meshing(&mut self.runner, &self.config.tools, &layout)?;
        self.transition(PipelineState::Meshed);

        let artifact = select_artifact(&layout.mvs_dir());
        inspect_artifact(&artifact);
        self.transition(PipelineState::ArtifactSelected);

        let converted = match artifact.path() {
            Some(path) => {
                let converted = run_conversion(&mut self.runner, &self.config.tools, path)?;
                self.transition(PipelineState::Converted);
                Some(converted)
            }
            None => {
                info!("Skipping format conversion: no mesh artifact");
                self.transition(PipelineState::Skipped);
                None
            }
        };

        let summary = RunSummary {
            scene_dir: root.clone(),
            input_images,
            low_visibility_warning: quality.has_advisory(),
            artifact: RunSummary::artifact_record(&artifact),
            converted: converted
                .as_ref()
                .map(|c| c.outputs.clone())
                .unwrap_or_default(),
            final_state: PipelineState::Done,
        };
        summary.write(&layout.summary_path())?;
        self.transition(PipelineState::Done);

        Ok(PipelineOutcome {
            layout,
            input_images,
            quality,
            artifact,
            converted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::RecordingRunner;

    #[test]
    fn test_missing_scene_fails_before_any_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(dir.path().join("absent")).with_preflight(false);
        let mut runner = RecordingRunner::default();
        let mut pipeline = Pipeline::new(config, &mut runner);

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, PipelineError::SceneNotFound(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert!(pipeline.state().is_terminal());
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_no_images_leaves_outputs_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sparse")).unwrap();
        let config = PipelineConfig::new(dir.path()).with_preflight(false);
        let mut runner = RecordingRunner::default();
        let mut pipeline = Pipeline::new(config, &mut runner);

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, PipelineError::NoInputImages(_)));
        assert_eq!(pipeline.history(), &[PipelineState::Init, PipelineState::Failed]);
        assert!(dir.path().join("sparse").exists());
    }

    #[test]
    fn test_reconstruction_without_model_fails_in_quality_gate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        let config = PipelineConfig::new(dir.path()).with_preflight(false);
        let mut runner = RecordingRunner::default();
        let mut pipeline = Pipeline::new(config, &mut runner);

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
        assert_eq!(
            pipeline.history(),
            &[
                PipelineState::Init,
                PipelineState::Cleaned,
                PipelineState::Reconstructed,
                PipelineState::Failed,
            ]
        );
        assert_eq!(runner.calls.len(), 1);
    }
}
