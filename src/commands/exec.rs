//! Run an arbitrary shell command in every repository

use anyhow::Result;
use std::path::Path;

use super::{completed, run_per_repo, RepoOutcome};
use crate::core::{Completion, Console, RepoContext, Walker};
use crate::git::{GitRunner, Status};

/// Handles the exec command
pub fn handle_exec_command(
    walker: &Walker,
    console: &Console,
    runner: &GitRunner,
    command: &str,
) -> Result<Completion> {
    run_per_repo(walker, console, |dir, ctx| exec_repo(runner, ctx, dir, command))
}

/// Runs `command` with `sh -c` inside `dir`, keeping its combined output
pub fn exec_repo(runner: &GitRunner, ctx: &dyn RepoContext, dir: &Path, command: &str) -> RepoOutcome {
    let output = match completed(runner.shell(dir, command, ctx.git_timeout())) {
        Ok(output) => output,
        Err(outcome) => return outcome,
    };

    let combined = [output.stdout.as_str(), output.stderr.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let exit = match output.code {
        Some(code) => format!("exit {code}"),
        None => "killed by signal".to_string(),
    };
    let status = if output.success { Status::Ran } else { Status::Failed };
    RepoOutcome::new(status, exit).with_details(combined)
}
