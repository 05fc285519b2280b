//! # reposweep
//!
//! `reposweep` finds every git repository under a set of named roots and
//! runs one operation per repository, either serially or on a bounded pool
//! of worker threads. It powers the `reposweep` CLI tool.
//!
//! ## Core Features
//!
//! - **Named Roots**: Roots are given as environment-variable aliases (`$work`)
//!   or plain paths, and results are displayed relative to them.
//! - **Pruned Discovery**: A `.ignore` file hides a subtree; a repository is
//!   never searched for nested repositories.
//! - **Bounded Dispatch**: Work starts while the scan is still running, on a
//!   pool sized as a fraction of the available cores.
//! - **Batch Commands**: list, commit, pull, exec, env and script.
//!
//! ## Example
//!
//! ```rust,no_run
//! use reposweep::core::{Settings, Walker};
//!
//! fn main() -> anyhow::Result<()> {
//!     let walker = Walker::from_args(&["$HOME".to_string()], Settings::default())?;
//!     walker.process(|dir, worker, engine| {
//!         println!("[{worker}] {}", engine.abbreviate_path(dir));
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod utils;
