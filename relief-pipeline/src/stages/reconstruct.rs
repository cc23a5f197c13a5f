//! Pose and point estimation stage.

use super::{float_arg, RECONSTRUCT_STAGE};
use crate::config::ToolCommands;
use crate::constants::{
    RECON_MAX_QUERY_PTS, RECON_MAX_REPROJ_ERROR, RECON_QUERY_FRAME_NUM, RECON_VIS_THRESH,
};
use crate::error::PipelineError;
use crate::runner::{StageInvocation, StageRunner};
use crate::workspace::SceneLayout;
use tracing::info;

pub fn reconstruction_invocation(tools: &ToolCommands, layout: &SceneLayout) -> StageInvocation {
    StageInvocation::new(RECONSTRUCT_STAGE, tools.reconstruct.program.clone())
        .args(tools.reconstruct.leading_args())
        .arg("--scene_dir")
        .arg(layout.root().to_string_lossy())
        .arg("--use_ba")
        .arg("--shared_camera")
        .args(["--vis_thresh".to_string(), float_arg(RECON_VIS_THRESH)])
        .args([
            "--query_frame_num".to_string(),
            RECON_QUERY_FRAME_NUM.to_string(),
        ])
        .args(["--max_query_pts".to_string(), RECON_MAX_QUERY_PTS.to_string()])
        .arg("--fine_tracking")
        .args([
            "--max_reproj_error".to_string(),
            float_arg(RECON_MAX_REPROJ_ERROR),
        ])
        .working_dir(&tools.working_dir)
}

/// Run the estimation stage; it writes its model into `scene/sparse`.
#[tracing::instrument(skip_all)]
pub fn run_reconstruction<R: StageRunner>(
    runner: &mut R,
    tools: &ToolCommands,
    layout: &SceneLayout,
) -> Result<(), PipelineError> {
    info!("Estimating camera poses and sparse points");
    runner.run(&reconstruction_invocation(tools, layout))?;
    info!("Sparse reconstruction written to {}", layout.sparse_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::RecordingRunner;

    #[test]
    fn test_fixed_parameters() {
        let layout = SceneLayout::new("/data/scene");
        let inv = reconstruction_invocation(&ToolCommands::default(), &layout);

        assert_eq!(inv.name, RECONSTRUCT_STAGE);
        assert_eq!(inv.program, "python3");
        assert_eq!(
            inv.args,
            vec![
                "vggt/demo_colmap.py",
                "--scene_dir",
                "/data/scene",
                "--use_ba",
                "--shared_camera",
                "--vis_thresh",
                "0.2",
                "--query_frame_num",
                "8",
                "--max_query_pts",
                "4096",
                "--fine_tracking",
                "--max_reproj_error",
                "8.0",
            ]
        );
    }

    #[test]
    fn test_failure_propagates() {
        let mut runner = RecordingRunner {
            fail_on: Some((RECONSTRUCT_STAGE.to_string(), 1)),
            ..Default::default()
        };
        let err = run_reconstruction(
            &mut runner,
            &ToolCommands::default(),
            &SceneLayout::new("/data/scene"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Stage(_)));
        assert_eq!(runner.calls.len(), 1);
    }
}
