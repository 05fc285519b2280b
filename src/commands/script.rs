//! Emit a shell script that re-clones every repository
//!
//! Running the script on a fresh machine (with the same root variables
//! exported) recreates the tree; existing checkouts are left alone.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::core::{Completion, Console, RepoContext, Walker};
use crate::git::GitRunner;
use crate::utils::{double_quoted, single_quoted};

const ORIGIN_URL_KEY: &str = "remote.origin.url";

/// Handles the script command
///
/// Remote lookups run after discovery finishes so the script is written in
/// discovery order.
pub fn handle_script_command(walker: &Walker, console: &Console, runner: &GitRunner) -> Result<Completion> {
    let (repos, completion) = walker.repos();

    let mut remotes = Vec::with_capacity(repos.len());
    for repo in repos {
        if walker.interrupt().is_triggered() {
            return Ok(Completion::Interrupted);
        }
        let url = origin_url(runner, walker, &repo);
        remotes.push((repo, url));
    }

    for line in script_lines(walker, &remotes, Local::now()) {
        console.raw(line);
    }
    Ok(completion)
}

pub fn origin_url(runner: &GitRunner, ctx: &dyn RepoContext, dir: &Path) -> Option<String> {
    runner.config_value(dir, ORIGIN_URL_KEY, ctx.git_timeout())
}

/// Script text for `(repository, origin url)` pairs
pub fn script_lines(
    ctx: &dyn RepoContext,
    remotes: &[(PathBuf, Option<String>)],
    generated: DateTime<Local>,
) -> Vec<String> {
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("# Generated by reposweep on {}", generated.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    for (repo, url) in remotes {
        let display = ctx.abbreviate_path(repo);
        lines.push(match url {
            Some(url) => {
                let target = double_quoted(&display);
                format!("[ -d {target} ] || git clone {} {target}", single_quoted(url))
            }
            None => format!("# {display}: no origin remote"),
        });
    }
    lines
}
