//! Public API for the core module.
//!
//! This module provides the stable public API for the engine:
//! - Root resolution
//! - Repository discovery
//! - Worker pool and dispatch
//! - Settings, output and statistics
//!
//! Internal implementation details are not exposed through this API.

// Root resolution
pub use super::roots::{expand_path, resolve_roots, resolve_roots_with, RootMap, RootSpec};

// Discovery
pub use super::scanner::{scan_tree, TreeScan, VisitedSet};

// Dispatch
pub use super::interrupt::Interrupt;
pub use super::pool::{TaskSender, WorkerPool};
pub use super::walker::{RepoContext, WalkOptions, Walker};

// Errors
pub use super::error::{Completion, SweepError};

// Settings and output
pub use super::console::{Console, ConsoleGuard, Verbosity};
pub use super::settings::Settings;
pub use super::stats::RunStatistics;

// User-facing messages
pub use super::config::{INTERRUPTED_MESSAGE, NO_REPOS_MESSAGE};
