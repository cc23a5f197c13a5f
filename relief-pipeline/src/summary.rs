//! Run summary written next to the mesh outputs.

use crate::artifact::{ArtifactSelection, MeshTier};
use crate::controller::PipelineState;
use crate::error::PipelineError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub tier: MeshTier,
    pub path: PathBuf,
}

/// What a completed run delivered. Visibility statistics are not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scene_dir: PathBuf,
    pub input_images: usize,
    pub low_visibility_warning: bool,
    pub artifact: Option<ArtifactRecord>,
    pub converted: Vec<PathBuf>,
    pub final_state: PipelineState,
}

impl RunSummary {
    pub fn artifact_record(selection: &ArtifactSelection) -> Option<ArtifactRecord> {
        Some(ArtifactRecord {
            tier: selection.tier()?,
            path: selection.path()?.to_path_buf(),
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Workspace {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PipelineError::Workspace {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Run summary saved: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ArtifactSelection::RefinedOnly(PathBuf::from("/s/mesh/mvs/r.ply"));
        let summary = RunSummary {
            scene_dir: PathBuf::from("/s"),
            input_images: 12,
            low_visibility_warning: true,
            artifact: RunSummary::artifact_record(&artifact),
            converted: vec![PathBuf::from("/s/mesh/mvs/r.usd")],
            final_state: PipelineState::Done,
        };
        let path = dir.path().join("mesh/run_summary.json");
        summary.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["artifact"]["tier"], "refined");
        assert_eq!(value["final_state"], "done");
        assert_eq!(value["input_images"], 12);
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_no_artifact_record() {
        assert!(RunSummary::artifact_record(&ArtifactSelection::None).is_none());
    }
}
