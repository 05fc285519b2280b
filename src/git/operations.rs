//! Git and shell command execution with a per-command timeout

use std::io;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Captured result of a command that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// How a command ended
///
/// A timeout is an ordinary outcome, not an error: the child is killed and
/// the caller decides how to report it.
#[derive(Debug)]
pub enum CommandOutcome {
    Completed(CommandOutput),
    TimedOut(Duration),
    /// The process could not be started or waited on
    Failed(io::Error),
}

impl CommandOutcome {
    /// Output of a command that completed and exited zero
    pub fn succeeded(self) -> Option<CommandOutput> {
        match self {
            CommandOutcome::Completed(output) if output.success => Some(output),
            _ => None,
        }
    }
}

/// Runs a git command in the specified directory with a timeout
pub async fn run_git(path: &Path, args: &[&str], timeout: Duration) -> CommandOutcome {
    let mut command = Command::new("git");
    command
        .args(args)
        .current_dir(path)
        // Never block on a credential prompt
        .env("GIT_TERMINAL_PROMPT", "0");
    debug!(dir = %path.display(), ?args, "git");
    run_with_timeout(command, timeout).await
}

/// Runs `command` through `sh -c` in the specified directory with a timeout
pub async fn run_shell(path: &Path, command: &str, timeout: Duration) -> CommandOutcome {
    let mut shell = Command::new("sh");
    shell.arg("-c").arg(command).current_dir(path);
    debug!(dir = %path.display(), command, "shell");
    run_with_timeout(shell, timeout).await
}

async fn run_with_timeout(mut command: Command, timeout: Duration) -> CommandOutcome {
    // Dropping the output future on timeout kills the child
    command.kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => CommandOutcome::Completed(CommandOutput::from_output(output)),
        Ok(Err(e)) => {
            warn!("failed to run command: {e}");
            CommandOutcome::Failed(e)
        }
        Err(_) => CommandOutcome::TimedOut(timeout),
    }
}

/// Blocking front end for worker threads
///
/// Workers are plain threads; each call parks the calling thread on the
/// shared runtime until the command ends. Must not be used from inside an
/// async context.
#[derive(Clone, Debug)]
pub struct GitRunner {
    handle: Handle,
}

impl GitRunner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn git(&self, path: &Path, args: &[&str], timeout: Duration) -> CommandOutcome {
        self.handle.block_on(run_git(path, args, timeout))
    }

    pub fn shell(&self, path: &Path, command: &str, timeout: Duration) -> CommandOutcome {
        self.handle.block_on(run_shell(path, command, timeout))
    }

    /// Reads a git config value, `None` when unset or unreadable
    pub fn config_value(&self, path: &Path, key: &str, timeout: Duration) -> Option<String> {
        self.git(path, &["config", "--get", key], timeout)
            .succeeded()
            .map(|output| output.stdout)
            .filter(|value| !value.is_empty())
    }
}
