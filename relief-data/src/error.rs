//! Error types for model and artifact parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading reconstruction data from disk.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No sparse model found in {0}")]
    ModelNotFound(PathBuf),

    #[error("Missing model file: {0}")]
    MissingFile(PathBuf),

    #[error("Unexpected end of data in {file} while reading {what}")]
    Truncated { file: &'static str, what: &'static str },

    #[error("Point {point_id} in points3D.bin has no observations")]
    EmptyTrack { point_id: u64 },

    #[error("Unknown camera model: {0}")]
    UnknownCameraModel(String),

    #[error("Parse error in {file} line {line}: {message}")]
    Parse {
        file: &'static str,
        line: usize,
        message: String,
    },

    #[error("Invalid PLY header: {0}")]
    PlyHeader(String),
}

impl ModelError {
    pub(crate) fn parse(file: &'static str, line: usize, message: impl Into<String>) -> Self {
        ModelError::Parse {
            file,
            line,
            message: message.into(),
        }
    }
}
