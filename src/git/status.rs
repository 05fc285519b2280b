//! Per-repository result of a batch command

/// Status enum representing the result of one repository operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Changes were committed
    Committed,
    /// Working tree was clean, nothing to commit
    NoChanges,
    /// New commits were pulled
    Pulled,
    /// Already up to date with upstream
    UpToDate,
    /// Shell command exited successfully
    Ran,
    /// Repository was skipped (no tracking branch, etc.)
    Skip,
    /// Repository has no remote configured
    NoRemote,
    /// The operation failed
    Failed,
    /// The operation exceeded the configured timeout
    TimedOut,
}

impl Status {
    /// Returns the emoji symbol for this status
    pub fn symbol(&self) -> &str {
        match self {
            Status::Committed | Status::Pulled | Status::Ran => "🟢",
            Status::NoChanges | Status::UpToDate => "⚪",
            Status::Skip | Status::NoRemote => "🟠",
            Status::TimedOut => "🟡",
            Status::Failed => "🔴",
        }
    }

    /// Returns the text representation of this status
    pub fn text(&self) -> &str {
        match self {
            Status::Committed => "committed",
            Status::NoChanges => "clean",
            Status::Pulled => "pulled",
            Status::UpToDate => "up-to-date",
            Status::Ran => "ok",
            Status::Skip => "skip",
            Status::NoRemote => "no-remote",
            Status::Failed => "failed",
            Status::TimedOut => "timeout",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::TimedOut)
    }
}
