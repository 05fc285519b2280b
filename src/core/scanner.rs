//! Repository discovery under a single root
//!
//! Depth-first, pre-order, children sorted by name. A directory holding the
//! ignore marker is pruned outright. A directory holding the repository
//! marker is reported once and never searched for nested repositories.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::config::{IGNORE_MARKER, REPO_MARKER, SKIP_DIRECTORIES};

/// Canonical paths of repositories already reported during one discovery pass
pub type VisitedSet = HashSet<PathBuf>;

/// Lazy scan of one root, yielding each unvisited repository root
///
/// Sharing `visited` between scans of overlapping roots guarantees each
/// repository is yielded at most once across all of them, including when
/// it is reachable through symlinks. The path yielded is the one the walk
/// reached first.
pub struct TreeScan<'a> {
    entries: Option<walkdir::IntoIter>,
    visited: &'a mut VisitedSet,
}

impl<'a> TreeScan<'a> {
    pub fn new(root: &Path, visited: &'a mut VisitedSet) -> Self {
        let entries = if root.is_dir() {
            Some(
                WalkDir::new(root)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter(),
            )
        } else {
            debug!(root = %root.display(), "root is not a directory, nothing to scan");
            None
        };
        Self { entries, visited }
    }
}

impl Iterator for TreeScan<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let entries = self.entries.as_mut()?;
        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    log_walk_error(&err);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.depth() > 0 && is_skipped(entry.file_name()) {
                entries.skip_current_dir();
                continue;
            }

            let dir = entry.path();
            if dir.join(IGNORE_MARKER).exists() {
                trace!(dir = %dir.display(), "ignore marker found, pruning");
                entries.skip_current_dir();
                continue;
            }
            if dir.join(REPO_MARKER).exists() {
                entries.skip_current_dir();
                if self.visited.insert(canonical(dir)) {
                    return Some(dir.to_path_buf());
                }
                trace!(dir = %dir.display(), "already visited");
            }
        }
    }
}

fn canonical(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

fn log_walk_error(err: &walkdir::Error) {
    let path = err.path().map(|p| p.display().to_string());
    let path = path.as_deref().unwrap_or("?");
    let dangling = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);

    if err.loop_ancestor().is_some() || dangling {
        debug!(path, "skipping entry: {err}");
    } else {
        warn!(path, "skipping entry: {err}");
    }
}

fn is_skipped(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
}

/// Scans `root`, calling `on_found` for every newly discovered repository
pub fn scan_tree(root: &Path, visited: &mut VisitedSet, mut on_found: impl FnMut(&Path)) {
    for repo in TreeScan::new(root, visited) {
        on_found(&repo);
    }
}
