//! External build tool invocation.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

/// Build invocation error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The build command could not be started at all.
    #[error("failed to start build command `{command}`: {source}")]
    Spawn {
        /// Command that was attempted.
        command: String,
        /// Underlying I/O error, typically "not found".
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one build run.
///
/// Lives only for the build cycle that produced it.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Everything the tool wrote to stdout.
    pub stdout: String,
    /// Everything the tool wrote to stderr.
    pub stderr: String,
    /// How the process ended.
    pub status: ExitStatus,
}

impl BuildOutcome {
    /// Whether the build exited successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, if the process exited normally.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Runs the configured documentation build tool.
#[derive(Debug, Clone)]
pub struct BuildRunner {
    command: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl BuildRunner {
    /// Create a runner for `command` with `args`, executed in `working_dir`.
    #[must_use]
    pub fn new(command: String, args: Vec<String>, working_dir: PathBuf) -> Self {
        Self {
            command,
            args,
            working_dir,
        }
    }

    /// Command name, for operator messages.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the build tool to completion, capturing both output streams.
    ///
    /// The command runs without a shell; arguments are passed verbatim.
    /// stdin is closed so tools that prompt fail fast instead of hanging
    /// the build cycle.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Spawn`] when the command cannot be started,
    /// typically because the executable is not installed.
    pub async fn run(&self) -> Result<BuildOutcome, BuildError> {
        tracing::debug!(command = %self.command, args = ?self.args, "running build tool");

        let output = Command::new(&self.command)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        Ok(BuildOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        })
    }
}
