//! Mesh to interchange format conversion stage.

use super::{float_arg, CONVERT_STAGE};
use crate::config::ToolCommands;
use crate::constants::{
    CONVERTED_EXTENSIONS, CONVERT_COLLISION_APPROXIMATION, CONVERT_DYNAMIC_FRICTION,
    CONVERT_RESTITUTION, CONVERT_STATIC_FRICTION,
};
use crate::error::PipelineError;
use crate::runner::{StageInvocation, StageRunner};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Files produced from one mesh artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedArtifacts {
    pub source: PathBuf,
    /// One sibling per interchange format, in `CONVERTED_EXTENSIONS` order.
    pub outputs: Vec<PathBuf>,
}

impl ConvertedArtifacts {
    /// Expected outputs: the source path with its extension swapped.
    pub fn expected_for(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            outputs: CONVERTED_EXTENSIONS
                .iter()
                .map(|ext| source.with_extension(ext))
                .collect(),
        }
    }

    pub fn missing(&self) -> impl Iterator<Item = &PathBuf> {
        self.outputs.iter().filter(|p| !p.is_file())
    }
}

pub fn conversion_invocation(tools: &ToolCommands, artifact: &Path) -> StageInvocation {
    StageInvocation::new(CONVERT_STAGE, tools.convert.program.clone())
        .args(tools.convert.leading_args())
        .arg("--input")
        .arg(artifact.to_string_lossy())
        .arg("--export_both")
        .args(["--collision_approximation", CONVERT_COLLISION_APPROXIMATION])
        .args([
            "--static_friction".to_string(),
            float_arg(CONVERT_STATIC_FRICTION),
        ])
        .args([
            "--dynamic_friction".to_string(),
            float_arg(CONVERT_DYNAMIC_FRICTION),
        ])
        .args(["--restitution".to_string(), float_arg(CONVERT_RESTITUTION)])
        .working_dir(&tools.working_dir)
}

/// Convert the selected artifact into both interchange formats at once.
/// Outputs the converter did not produce are reported but not fatal.
#[tracing::instrument(skip_all, fields(artifact = %artifact.display()))]
pub fn run_conversion<R: StageRunner>(
    runner: &mut R,
    tools: &ToolCommands,
    artifact: &Path,
) -> Result<ConvertedArtifacts, PipelineError> {
    info!(
        "Converting mesh (collision: {}, friction: {}/{}, restitution: {})",
        CONVERT_COLLISION_APPROXIMATION,
        CONVERT_STATIC_FRICTION,
        CONVERT_DYNAMIC_FRICTION,
        CONVERT_RESTITUTION
    );
    runner.run(&conversion_invocation(tools, artifact))?;

    let converted = ConvertedArtifacts::expected_for(artifact);
    for path in &converted.outputs {
        if path.is_file() {
            info!("Converted artifact: {}", path.display());
        } else {
            warn!("Converter did not produce {}", path.display());
        }
    }
    Ok(converted)
}
