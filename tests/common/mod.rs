//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{capture_output, walker_for, TestTree, TreeBuilder};
pub use self::git::{add_git_remote, create_test_commit, is_git_available, setup_git_repo};

use reposweep::core::WalkOptions;

pub fn serial() -> WalkOptions {
    WalkOptions {
        serial: true,
        worker_fraction: 1.0,
        jobs: None,
    }
}

pub fn parallel(jobs: usize) -> WalkOptions {
    WalkOptions {
        serial: false,
        worker_fraction: 1.0,
        jobs: Some(jobs),
    }
}
