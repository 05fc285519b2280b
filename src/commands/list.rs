//! Enumerate discovered repositories

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::core::{Completion, Console, Walker, NO_REPOS_MESSAGE};

/// One repository in `list --json` output
#[derive(Debug, Serialize, PartialEq)]
pub struct ListEntry {
    pub display: String,
    pub path: PathBuf,
}

/// Handles the list command
///
/// Plain output streams one abbreviated path per line as the scan finds
/// them. JSON output is written once the scan ends.
pub fn handle_list_command(walker: &Walker, console: &Console, json: bool) -> Result<Completion> {
    if json {
        let (repos, completion) = walker.repos();
        let entries = list_entries(walker, &repos);
        console.raw(serde_json::to_string_pretty(&entries)?);
        return Ok(completion);
    }

    let mut found = 0usize;
    let completion = walker.find_and_process_repos(|dir| {
        found += 1;
        console.raw(walker.abbreviate_path(dir));
    });
    if found == 0 && !completion.is_interrupted() {
        console.info(NO_REPOS_MESSAGE);
    }
    Ok(completion)
}

pub fn list_entries(walker: &Walker, repos: &[PathBuf]) -> Vec<ListEntry> {
    repos
        .iter()
        .map(|path| ListEntry {
            display: walker.abbreviate_path(path),
            path: path.clone(),
        })
        .collect()
}
