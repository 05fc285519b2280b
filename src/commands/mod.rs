//! Batch commands run over every discovered repository

pub mod commit;
pub mod env;
pub mod exec;
pub mod list;
pub mod pull;
pub mod script;

pub use commit::handle_commit_command;
pub use env::handle_env_command;
pub use exec::handle_exec_command;
pub use list::handle_list_command;
pub use pull::handle_pull_command;
pub use script::handle_script_command;

use anyhow::Result;
use std::path::Path;
use std::time::Instant;

use crate::core::stats::clean_error_message;
use crate::core::{Completion, Console, RepoContext, RunStatistics, Verbosity, Walker, NO_REPOS_MESSAGE};
use crate::git::{CommandOutcome, CommandOutput, Status};

/// What one repository operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    pub status: Status,
    pub message: String,
    /// Extra text printed under the status line (command output)
    pub details: Option<String>,
}

impl RepoOutcome {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        if !details.is_empty() {
            self.details = Some(details);
        }
        self
    }

    pub fn failed(error: &str) -> Self {
        Self::new(Status::Failed, clean_error_message(error))
    }
}

/// Splits a command outcome into its output or a finished failure report
pub(crate) fn completed(outcome: CommandOutcome) -> Result<CommandOutput, RepoOutcome> {
    match outcome {
        CommandOutcome::Completed(output) => Ok(output),
        CommandOutcome::TimedOut(after) => Err(RepoOutcome::new(
            Status::TimedOut,
            format!("timed out after {}s", after.as_secs()),
        )),
        CommandOutcome::Failed(e) => Err(RepoOutcome::failed(&e.to_string())),
    }
}

/// Like `completed`, but a nonzero exit is also a failure
pub(crate) fn succeeded(outcome: CommandOutcome) -> Result<CommandOutput, RepoOutcome> {
    let output = completed(outcome)?;
    if output.success {
        Ok(output)
    } else {
        let error = if output.stderr.is_empty() {
            &output.stdout
        } else {
            &output.stderr
        };
        Err(RepoOutcome::failed(error))
    }
}

/// Formats the status line (and any details) for one repository
pub(crate) fn format_report(display_path: &str, worker: Option<usize>, outcome: &RepoOutcome) -> String {
    let worker = worker.map(|w| format!("[w{w}] ")).unwrap_or_default();
    let mut text = format!(
        "{} {worker}{:<40} {:<10} {}",
        outcome.status.symbol(),
        display_path,
        outcome.status.text(),
        outcome.message
    );
    if let Some(details) = &outcome.details {
        for line in details.lines() {
            text.push_str("\n    ");
            text.push_str(line);
        }
    }
    text.trim_end().to_string()
}

/// Dispatches `operation` to every repository and reports as results arrive
///
/// Each report goes to the console as one record, so concurrent workers
/// never interleave their lines. Ends with the run summary.
pub(crate) fn run_per_repo<F>(walker: &Walker, console: &Console, operation: F) -> Result<Completion>
where
    F: Fn(&Path, &dyn RepoContext) -> RepoOutcome + Sync,
{
    let start = Instant::now();
    let stats = RunStatistics::new();
    let show_worker = console.enabled(Verbosity::Verbose);

    let completion = walker.process(|dir, worker, engine| {
        let outcome = operation(dir, engine);
        let display = engine.abbreviate_path(dir);
        console.info(format_report(&display, show_worker.then_some(worker), &outcome));
        stats.update(&display, &outcome.status, &outcome.message);
    })?;

    if stats.total() == 0 && !completion.is_interrupted() {
        console.info(NO_REPOS_MESSAGE);
        return Ok(completion);
    }

    console.info("");
    console.info(stats.generate_summary(start.elapsed()));
    let detailed = stats.generate_detailed_summary();
    if !detailed.is_empty() {
        console.error(detailed);
    }
    Ok(completion)
}
