//! Subprocess execution of engine commands.
//!
//! This is the only place engine failures are classified: a missing
//! executable, a non-zero exit, and (when configured) a timeout.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::command::EngineCommand;
use crate::error::{Error, Result};

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs engine commands.
#[async_trait]
pub trait EngineRunner: Send + Sync {
    /// Execute the command to completion. Non-zero exits are errors.
    async fn run(&self, command: &EngineCommand) -> Result<EngineOutput>;
}

/// How the executable is launched. The argument list is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Exec the program directly.
    Direct,
    /// Go through `cmd /C`, needed when the engine is installed as a
    /// shell-resolved wrapper (npm shims on Windows).
    ///
    /// cmd.exe ends the command line at the first line break and expands
    /// `%VAR%` references, so arguments containing line breaks are refused
    /// and `%` in patterns or rules may be rewritten by the shell.
    Shell,
}

impl Dispatch {
    pub fn for_platform() -> Self {
        if cfg!(windows) {
            Dispatch::Shell
        } else {
            Dispatch::Direct
        }
    }

    fn command(&self, engine: &EngineCommand) -> Result<Command> {
        match self {
            Dispatch::Direct => {
                let mut cmd = Command::new(&engine.program);
                cmd.args(&engine.args);
                Ok(cmd)
            }
            Dispatch::Shell => {
                if engine.args.iter().any(|a| a.contains(['\n', '\r'])) {
                    return Err(Error::invalid_parameter(
                        "Multi-line arguments cannot be passed through cmd /C; \
                         put the rule on a single line using YAML flow style",
                    ));
                }
                let mut cmd = Command::new("cmd");
                cmd.arg("/C").arg(&engine.program).args(&engine.args);
                Ok(cmd)
            }
        }
    }
}

/// Runs the engine as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    dispatch: Dispatch,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            dispatch: Dispatch::for_platform(),
            timeout,
        }
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    async fn spawn_and_wait(&self, engine: &EngineCommand) -> Result<std::process::Output> {
        let mut cmd = self.dispatch.command(engine)?;
        cmd.stdin(if engine.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ExecutableNotFound(engine.program.clone()),
            _ => Error::Io(e),
        })?;

        // Feed stdin from its own task so a chatty engine cannot block on a
        // full stdout pipe while we are still writing.
        let writer = match (child.stdin.take(), engine.stdin.clone()) {
            (Some(mut stdin), Some(input)) => Some(tokio::spawn(async move {
                let result = stdin.write_all(input.as_bytes()).await;
                drop(stdin);
                result
            })),
            _ => None,
        };

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => return Err(Error::Io(e)),
                Ok(_) => {}
                Err(e) => warn!("stdin writer task failed: {}", e),
            }
        }

        Ok(output)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl EngineRunner for ProcessRunner {
    async fn run(&self, command: &EngineCommand) -> Result<EngineOutput> {
        debug!("Running engine: {:?}", command.argv());

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.spawn_and_wait(command))
                .await
                .map_err(|_| Error::Timeout {
                    seconds: limit.as_secs(),
                })??,
            None => self.spawn_and_wait(command).await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(
            "Engine exited with {} ({} bytes stdout, {} bytes stderr)",
            output.status,
            stdout.len(),
            stderr.len()
        );

        if !output.status.success() {
            return Err(Error::engine_failed(
                command.argv(),
                output.status.code(),
                &stderr,
            ));
        }

        Ok(EngineOutput { stdout, stderr })
    }
}
