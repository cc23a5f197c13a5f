//! Densification and meshing stage.
//!
//! How far the external tool gets (dense cloud, refined mesh, textured mesh)
//! is not reported back; it can only be observed afterwards by probing
//! `scene/mesh/mvs`.

use super::MESH_STAGE;
use crate::config::ToolCommands;
use crate::constants::{MESH_MAX_FACE_AREA, MESH_REFINE_SCALES};
use crate::error::PipelineError;
use crate::runner::{StageInvocation, StageRunner};
use crate::workspace::SceneLayout;
use tracing::info;

pub fn meshing_invocation(tools: &ToolCommands, layout: &SceneLayout) -> StageInvocation {
    StageInvocation::new(MESH_STAGE, tools.mesh.program.clone())
        .args(tools.mesh.leading_args())
        .arg("--scene_dir")
        .arg(layout.root().to_string_lossy())
        .args(["--max_face_area".to_string(), MESH_MAX_FACE_AREA.to_string()])
        .args(["--refine_scales", MESH_REFINE_SCALES])
        .working_dir(&tools.working_dir)
}

#[tracing::instrument(skip_all)]
pub fn run_meshing<R: StageRunner>(
    runner: &mut R,
    tools: &ToolCommands,
    layout: &SceneLayout,
) -> Result<(), PipelineError> {
    info!("Densifying and meshing from {}", layout.sparse_dir().display());
    runner.run(&meshing_invocation(tools, layout))?;
    info!("Mesh stage finished, output in {}", layout.mvs_dir().display());
    Ok(())
}
