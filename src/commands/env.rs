//! Emit one shell variable per repository
//!
//! `eval "$(reposweep env)"` gives every repository a variable named after
//! its directory, e.g. `export API="$work/api"`.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::{Completion, Console, RepoContext, Walker};
use crate::utils::double_quoted;

const FALLBACK_NAME: &str = "REPO";

/// Handles the env command
pub fn handle_env_command(walker: &Walker, console: &Console) -> Result<Completion> {
    let (repos, completion) = walker.repos();
    for line in env_lines(walker, &repos) {
        console.raw(line);
    }
    Ok(completion)
}

/// `export` lines in discovery order; repeated names get `_2`, `_3`, ...
pub fn env_lines(ctx: &dyn RepoContext, repos: &[PathBuf]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    repos
        .iter()
        .map(|repo| {
            let base = variable_name(
                &repo
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let name = if *count == 1 {
                base
            } else {
                format!("{base}_{count}")
            };
            format!("export {name}={}", double_quoted(&ctx.abbreviate_path(repo)))
        })
        .collect()
}

/// Upper snake case, safe as a shell identifier
pub fn variable_name(dir_name: &str) -> String {
    let mut name = String::with_capacity(dir_name.len());
    for c in dir_name.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_uppercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    let name = name.trim_matches('_');

    match name.chars().next() {
        None => FALLBACK_NAME.to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{name}"),
        Some(_) => name.to_string(),
    }
}
