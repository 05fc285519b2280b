//! Configuration constants and settings

// Filesystem markers
//
// Both markers are existence checks only; their contents are never read.
// - A directory holding REPO_MARKER is a repository root and is not searched further
// - A directory holding IGNORE_MARKER is pruned together with everything beneath it

pub const REPO_MARKER: &str = ".git";
pub const IGNORE_MARKER: &str = ".ignore";

// Directories never descended into during repository search
pub const SKIP_DIRECTORIES: &[&str] = &[
    ".",
    "..",
    "venv",
    ".venv",
    "virtualenv",
    ".virtualenv",
];

// Worker pool configuration
pub const DEFAULT_WORKER_FRACTION: f64 = 1.0;
pub const POOL_POLL_INTERVAL_MS: u64 = 100; // Liveness polling in wait_for_completion
pub const QUEUE_POLL_INTERVAL_MS: u64 = 100; // How often idle workers re-check the interrupt flag

// Git configuration
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 180; // 3 minutes per repository

// Console configuration
pub const CONSOLE_CHANNEL_CAPACITY: usize = 1024;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 30;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 40;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 37;

// Config file location, relative to the platform config directory
pub const CONFIG_DIR_NAME: &str = "reposweep";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// UI Constants
pub const NO_REPOS_MESSAGE: &str = "No git repositories found under the configured roots.";
pub const INTERRUPTED_MESSAGE: &str = "Interrupted; remaining repositories were not processed.";

/// Computes the worker count for a pool given the available cores
///
/// Returns `None` when `fraction` is outside `(0, 1]` (NaN included).
/// Otherwise `max(1, floor(cores * fraction))`.
pub fn worker_count_for(cores: usize, fraction: f64) -> Option<usize> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return None;
    }
    let count = (cores as f64 * fraction).floor() as usize;
    Some(count.max(1))
}
