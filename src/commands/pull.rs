//! Fast-forward every repository from its upstream

use anyhow::Result;
use std::path::Path;

use super::{completed, run_per_repo, succeeded, RepoOutcome};
use crate::core::{Completion, Console, RepoContext, Walker};
use crate::git::{GitRunner, Status};

const GIT_REMOTE_ARGS: &[&str] = &["remote"];
const GIT_PULL_ARGS: &[&str] = &["pull", "--ff-only"];

const STATUS_NO_REMOTE: &str = "no remote";
const STATUS_NO_UPSTREAM: &str = "no tracking";
const STATUS_SYNCED: &str = "up to date";

/// Handles the pull command
pub fn handle_pull_command(walker: &Walker, console: &Console, runner: &GitRunner) -> Result<Completion> {
    run_per_repo(walker, console, |dir, ctx| pull_repo(runner, ctx, dir))
}

/// Pulls `dir` with `--ff-only`
pub fn pull_repo(runner: &GitRunner, ctx: &dyn RepoContext, dir: &Path) -> RepoOutcome {
    let timeout = ctx.git_timeout();

    match succeeded(runner.git(dir, GIT_REMOTE_ARGS, timeout)) {
        Ok(remotes) if remotes.stdout.is_empty() => {
            return RepoOutcome::new(Status::NoRemote, STATUS_NO_REMOTE);
        }
        Ok(_) => {}
        Err(outcome) => return outcome,
    }

    let output = match completed(runner.git(dir, GIT_PULL_ARGS, timeout)) {
        Ok(output) => output,
        Err(outcome) => return outcome,
    };
    if !output.success {
        if output.stderr.contains("no tracking information") {
            return RepoOutcome::new(Status::Skip, STATUS_NO_UPSTREAM);
        }
        return RepoOutcome::failed(&output.stderr);
    }

    if output.stdout.contains("Already up to date") || output.stdout.contains("Already up-to-date") {
        RepoOutcome::new(Status::UpToDate, STATUS_SYNCED)
    } else {
        let summary = output
            .stdout
            .lines()
            .rev()
            .find(|line| line.contains("changed"))
            .unwrap_or("fast-forwarded")
            .trim()
            .to_string();
        RepoOutcome::new(Status::Pulled, summary)
    }
}
