//! Error types for pipeline operations.

use crate::constants::IMAGE_EXTENSIONS;
use relief_data::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit code for an empty reconstruction.
pub const EXIT_EMPTY_RECONSTRUCTION: i32 = 2;
/// Process exit code for every other fatal error.
pub const EXIT_FAILURE: i32 = 1;

/// Errors raised while launching or waiting on an external stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Failed to launch stage '{stage}' ({program}): {source}")]
    Spawn {
        stage: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage '{stage}' exited with {}", describe_exit(.code))]
    Exit { stage: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl StageError {
    pub fn stage(&self) -> &str {
        match self {
            StageError::Spawn { stage, .. } | StageError::Exit { stage, .. } => stage,
        }
    }
}

/// Fatal pipeline errors. Anything that is not fatal is logged instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Reconstruction in {0} contains no 3D points")]
    EmptyReconstruction(PathBuf),

    #[error("Failed to load sparse model: {0}")]
    Model(#[from] ModelError),

    #[error("Required tools not found: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error(
        "No input images found in {} (accepted extensions: {})",
        .0.display(),
        IMAGE_EXTENSIONS.join(", ")
    )]
    NoInputImages(PathBuf),

    #[error("Scene directory not found: {0}")]
    SceneNotFound(PathBuf),

    #[error("Workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write run summary: {0}")]
    Summary(String),
}

impl PipelineError {
    /// Process exit code for this error. An empty reconstruction is reported
    /// distinctly from ordinary failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::EmptyReconstruction(_) => EXIT_EMPTY_RECONSTRUCTION,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Summary(err.to_string())
    }
}
