//! Error types for the discovery and dispatch engine
//!
//! Only errors that invalidate a whole invocation live here. Problems local
//! to one directory are logged by the scanner and never surface as errors,
//! and per-repository failures belong to the commands.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    /// A root argument referenced an environment variable that is not set
    #[error("environment variable '{name}' is not defined (referenced by root '{token}')")]
    UndefinedVariable { name: String, token: String },

    /// A relative root could not be anchored at the current directory
    #[error("cannot resolve root '{token}': current directory unavailable: {source}")]
    UnresolvedRoot {
        token: String,
        #[source]
        source: std::io::Error,
    },

    /// Worker pool sizing fraction outside (0, 1]
    #[error("invalid worker fraction {0}: must be greater than 0 and at most 1")]
    InvalidWorkerFraction(f64),

    /// Config file could not be read or parsed
    #[error("invalid config file '{path}': {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// Task submitted to a pool whose workers were never started
    #[error("worker pool has not been started")]
    PoolNotStarted,

    /// `start` called twice on the same pool
    #[error("worker pool is already running")]
    PoolAlreadyStarted,

    /// Worker thread could not be spawned
    #[error("failed to spawn worker {index}: {source}")]
    WorkerSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

impl SweepError {
    /// Configuration errors abort before any scanning takes place
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SweepError::UndefinedVariable { .. }
                | SweepError::UnresolvedRoot { .. }
                | SweepError::InvalidWorkerFraction(_)
                | SweepError::InvalidConfig { .. }
        )
    }
}

/// How a dispatch pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every discovered repository was dispatched and every worker terminated
    Finished,
    /// An interrupt stopped the pass; in-flight callbacks were allowed to finish
    Interrupted,
}

impl Completion {
    pub fn is_interrupted(self) -> bool {
        self == Completion::Interrupted
    }
}
