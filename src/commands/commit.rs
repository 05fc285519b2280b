//! Stage and commit every change in each repository

use anyhow::Result;
use std::path::Path;

use super::{run_per_repo, succeeded, RepoOutcome};
use crate::core::{Completion, Console, RepoContext, Walker};
use crate::git::{GitRunner, Status};

const GIT_STATUS_PORCELAIN_ARGS: &[&str] = &["status", "--porcelain"];
const GIT_ADD_ALL_ARGS: &[&str] = &["add", "-A"];

/// Handles the commit command
pub fn handle_commit_command(
    walker: &Walker,
    console: &Console,
    runner: &GitRunner,
    message: &str,
) -> Result<Completion> {
    run_per_repo(walker, console, |dir, ctx| commit_repo(runner, ctx, dir, message))
}

/// Commits all pending changes in `dir` with `message`
pub fn commit_repo(runner: &GitRunner, ctx: &dyn RepoContext, dir: &Path, message: &str) -> RepoOutcome {
    let timeout = ctx.git_timeout();

    let status = match succeeded(runner.git(dir, GIT_STATUS_PORCELAIN_ARGS, timeout)) {
        Ok(output) => output,
        Err(outcome) => return outcome,
    };
    let changed = status.stdout.lines().filter(|l| !l.trim().is_empty()).count();
    if changed == 0 {
        return RepoOutcome::new(Status::NoChanges, "nothing to commit");
    }

    if let Err(outcome) = succeeded(runner.git(dir, GIT_ADD_ALL_ARGS, timeout)) {
        return outcome;
    }
    match succeeded(runner.git(dir, &["commit", "-m", message], timeout)) {
        Ok(_) => {
            let noun = if changed == 1 { "file" } else { "files" };
            RepoOutcome::new(Status::Committed, format!("{changed} {noun}"))
        }
        Err(outcome) => outcome,
    }
}
