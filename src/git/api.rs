//! Public API for git and shell process execution.
//!
//! ## Example: Reading a config value with a timeout
//!
//! ```rust,no_run
//! use reposweep::git::{run_git, CommandOutcome};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! async fn origin(path: &Path) -> Option<String> {
//!     let args = ["config", "--get", "remote.origin.url"];
//!     match run_git(path, &args, Duration::from_secs(10)).await {
//!         CommandOutcome::Completed(out) if out.success => Some(out.stdout),
//!         _ => None,
//!     }
//! }
//! ```

// Process execution
pub use super::operations::{run_git, run_shell, CommandOutcome, CommandOutput, GitRunner};

// Status
pub use super::status::Status;
