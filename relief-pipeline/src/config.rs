//! Pipeline configuration.

use std::path::{Path, PathBuf};

/// Scene directory used when none is given.
pub const DEFAULT_SCENE_DIR: &str = "scene";

/// How to launch one external collaborator: a program, optionally followed
/// by a script path passed as its first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub script: Option<PathBuf>,
}

impl ToolCommand {
    pub fn program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            script: None,
        }
    }

    pub fn script(program: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: Some(script.into()),
        }
    }

    /// Leading arguments before the stage's own parameters.
    pub fn leading_args(&self) -> Vec<String> {
        self.script
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }
}

/// Commands for every external stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommands {
    pub reconstruct: ToolCommand,
    pub mesh: ToolCommand,
    pub convert: ToolCommand,
    /// Working directory for every stage invocation.
    pub working_dir: PathBuf,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            reconstruct: ToolCommand::script("python3", "vggt/demo_colmap.py"),
            mesh: ToolCommand::script("python3", "scripts/convert_colmap2mesh.py"),
            convert: ToolCommand::script("python3", "scripts/convert_mesh2usd.py"),
            working_dir: PathBuf::from("."),
        }
    }
}

impl ToolCommands {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ToolCommand)> {
        [
            ("reconstruct", &self.reconstruct),
            ("mesh", &self.mesh),
            ("convert", &self.convert),
        ]
        .into_iter()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub scene_dir: PathBuf,
    pub tools: ToolCommands,
    pub logging: LoggingConfig,
    /// Resolve every tool before touching the scene.
    pub preflight: bool,
}

impl PipelineConfig {
    pub fn new(scene_dir: impl AsRef<Path>) -> Self {
        Self {
            scene_dir: scene_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_tools(mut self, tools: ToolCommands) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    pub fn with_preflight(mut self, enabled: bool) -> Self {
        self.preflight = enabled;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scene_dir: PathBuf::from(DEFAULT_SCENE_DIR),
            tools: ToolCommands::default(),
            logging: LoggingConfig::default(),
            preflight: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.scene_dir, PathBuf::from("scene"));
        assert_eq!(config.logging.level, "info");
        assert!(config.preflight);
        assert_eq!(config.tools.iter().count(), 3);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new("/data/garden")
            .with_log_level("debug")
            .with_preflight(false);
        assert_eq!(config.scene_dir, PathBuf::from("/data/garden"));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.preflight);
    }

    #[test]
    fn test_leading_args() {
        assert_eq!(
            ToolCommand::script("python3", "a/b.py").leading_args(),
            vec!["a/b.py".to_string()]
        );
        assert!(ToolCommand::program("TextureMesh").leading_args().is_empty());
    }
}
