//! Relief Pipeline Crate
//!
//! Controller for the image-to-mesh pipeline. It cleans the scene, runs the
//! external reconstruction, meshing and conversion stages in sequence, checks
//! the sparse reconstruction's multi-view quality, and picks the best mesh
//! artifact the meshing stage managed to produce.
//!
//! ## Modules
//!
//! - [`workspace`]: scene layout, cleanup and input inventory
//! - [`runner`]: the [`StageRunner`] capability and its process-backed implementation
//! - [`stages`]: reconstruction, meshing and conversion invocations
//! - [`quality`]: advisory multi-view quality gate
//! - [`artifact`]: priority-ordered mesh artifact selection
//! - [`controller`]: the stage state machine

pub mod artifact;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod quality;
pub mod runner;
pub mod stages;
pub mod summary;
pub mod workspace;

pub use artifact::{ArtifactSelection, MeshTier, select_artifact};
pub use config::{LoggingConfig, PipelineConfig, ToolCommand, ToolCommands};
pub use controller::{Pipeline, PipelineOutcome, PipelineState};
pub use error::{PipelineError, StageError};
pub use quality::{LowVisibilityAdvisory, QualityReport, Remediation, check_quality};
pub use runner::{ProcessRunner, StageInvocation, StageRunner};
pub use stages::ConvertedArtifacts;
pub use workspace::SceneLayout;
