//! External stage invocation.
//!
//! Every collaborator is launched through [`StageRunner`], so the controller
//! only sees a name, an argument list and a working directory, and a
//! uniform success/failure result.

use crate::config::ToolCommands;
use crate::error::{PipelineError, StageError};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A fully described external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    /// Human-readable stage name used in logs and errors.
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl StageInvocation {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: PathBuf::from("."),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Shell-like rendering for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for anything that can run an external stage to completion.
///
/// Implementations block until the stage terminates. Success means the
/// stage exited with status zero; nothing else is inspected.
pub trait StageRunner {
    fn run(&mut self, invocation: &StageInvocation) -> Result<(), StageError>;
}

impl<R: StageRunner + ?Sized> StageRunner for &mut R {
    fn run(&mut self, invocation: &StageInvocation) -> Result<(), StageError> {
        (**self).run(invocation)
    }
}

/// Runs stages as child processes, inheriting stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl StageRunner for ProcessRunner {
    #[tracing::instrument(skip_all, fields(stage = %invocation.name))]
    fn run(&mut self, invocation: &StageInvocation) -> Result<(), StageError> {
        info!("Running: {}", invocation.command_line());
        info!("Working directory: {}", invocation.working_dir.display());

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()
            .map_err(|source| StageError::Spawn {
                stage: invocation.name.clone(),
                program: invocation.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(StageError::Exit {
                stage: invocation.name.clone(),
                code: status.code(),
            });
        }
        debug!("Stage '{}' exited successfully", invocation.name);
        Ok(())
    }
}

/// Resolve a program the way a shell would: paths containing a separator
/// are taken as-is, bare names are searched on `PATH`.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

/// Check that every configured program and script exists before any stage
/// runs. Reports everything missing at once.
pub fn preflight(tools: &ToolCommands) -> Result<(), PipelineError> {
    let mut missing = Vec::new();

    for (stage, tool) in tools.iter() {
        if resolve_program(&tool.program).is_none() {
            missing.push(format!("{} ({})", tool.program, stage));
        }
        if let Some(script) = &tool.script {
            let resolved = if script.is_absolute() {
                script.clone()
            } else {
                tools.working_dir.join(script)
            };
            if !resolved.is_file() {
                missing.push(format!("{} ({})", resolved.display(), stage));
            }
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::MissingTools(missing));
    }
    debug!("All external tools resolved");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ToolCommand;
    use std::fs;

    /// Records invocations and replays scripted outcomes.
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub calls: Vec<StageInvocation>,
        pub fail_on: Option<(String, i32)>,
    }

    impl StageRunner for RecordingRunner {
        fn run(&mut self, invocation: &StageInvocation) -> Result<(), StageError> {
            self.calls.push(invocation.clone());
            match &self.fail_on {
                Some((stage, code)) if *stage == invocation.name => Err(StageError::Exit {
                    stage: stage.clone(),
                    code: Some(*code),
                }),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_invocation_builder() {
        let inv = StageInvocation::new("mesh", "python3")
            .arg("convert.py")
            .args(["--max_face_area", "16"])
            .working_dir("/work");
        assert_eq!(inv.command_line(), "python3 convert.py --max_face_area 16");
        assert_eq!(inv.working_dir, PathBuf::from("/work"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_exit_status() {
        let mut runner = ProcessRunner;
        runner
            .run(&StageInvocation::new("ok", "sh").args(["-c", "exit 0"]))
            .unwrap();

        let err = runner
            .run(&StageInvocation::new("bad", "sh").args(["-c", "exit 3"]))
            .unwrap_err();
        assert!(matches!(err, StageError::Exit { code: Some(3), .. }));
    }

    #[test]
    fn test_process_runner_spawn_failure() {
        let mut runner = ProcessRunner;
        let err = runner
            .run(&StageInvocation::new("ghost", "definitely-not-a-real-program-xyz"))
            .unwrap_err();
        assert!(matches!(err, StageError::Spawn { .. }));
    }

    #[test]
    fn test_preflight_reports_all_missing() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolCommands {
            reconstruct: ToolCommand::program("no-such-tool-a"),
            mesh: ToolCommand::program("no-such-tool-b"),
            convert: ToolCommand::program("no-such-tool-c"),
            working_dir: dir.path().to_path_buf(),
        };
        match preflight(&tools).unwrap_err() {
            PipelineError::MissingTools(missing) => assert_eq!(missing.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_preflight_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("tool");
        fs::write(&tool, b"").unwrap();
        fs::write(dir.path().join("stage.py"), b"").unwrap();
        let program = tool.to_string_lossy().into_owned();

        let tools = ToolCommands {
            reconstruct: ToolCommand::script(program.clone(), "stage.py"),
            mesh: ToolCommand::program(program.clone()),
            convert: ToolCommand::script(program, "missing.py"),
            working_dir: dir.path().to_path_buf(),
        };
        match preflight(&tools).unwrap_err() {
            PipelineError::MissingTools(missing) => {
                assert_eq!(missing.len(), 1);
                assert!(missing[0].contains("missing.py"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
