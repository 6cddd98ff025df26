//! Synchronous external process invocation.
//!
//! Every supervisor operation is a blocking call to either `supervisord` or
//! `supervisorctl`. [`CommandRunner`] is the seam that lets the dispatcher be
//! exercised without those binaries installed.
use std::{
    ffi::OsString,
    fmt, io,
    path::Path,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::error::{Result, SupmanError};

/// A program plus its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// Arguments passed after the program, kept as OS strings so paths reach the
    /// child byte for byte.
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Starts an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends `-c <path>`, the flag both supervisor programs use for their config.
    pub fn config(self, path: &Path) -> Self {
        self.arg("-c").arg(path)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Whether the child's output is collected or shown directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr into [`CommandOutput`].
    Capture,
    /// Let the child write straight to this process's terminal.
    Inherit,
}

/// Result of a finished invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured stdout; empty in [`OutputMode::Inherit`].
    pub stdout: String,
    /// Captured stderr; empty in [`OutputMode::Inherit`].
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into [`SupmanError::SupervisorCommand`].
    pub fn check(self, invocation: &Invocation) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(SupmanError::SupervisorCommand {
                command: invocation.to_string(),
                code: self.code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external programs to completion.
pub trait CommandRunner {
    /// Runs `invocation` and waits for it to exit. A non-zero exit is not an error
    /// at this level; only a failure to start the program is.
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<CommandOutput> {
        debug!("Running `{invocation}`");
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());

        let spawn_error = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                SupmanError::ExecutableNotFound {
                    program: invocation.program.clone(),
                }
            } else {
                SupmanError::Spawn {
                    program: invocation.program.clone(),
                    source,
                }
            }
        };

        let output = match mode {
            OutputMode::Capture => {
                let output = command.output().map_err(spawn_error)?;
                CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            OutputMode::Inherit => {
                let status = command.status().map_err(spawn_error)?;
                CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                }
            }
        };

        debug!("`{}` exited with {:?}", invocation.program, output.code);
        Ok(output)
    }
}
