//! Statistics tracking for repository operations

use crate::core::config::{ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH, PATH_DISPLAY_WIDTH};
use crate::git::Status;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Results of one batch command across all repositories
///
/// Counters are atomic so workers can record outcomes without contending;
/// the failure list stays behind a Mutex.
#[derive(Debug, Default)]
pub struct RunStatistics {
    pub succeeded: AtomicU64,
    pub unchanged: AtomicU64,
    pub skipped: AtomicU64,
    pub failed: AtomicU64,
    pub timed_out: AtomicU64,
    pub failed_repos: Mutex<Vec<(String, String)>>, // (display_path, error_message)
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one repository
    pub fn update(&self, display_path: &str, status: &Status, message: &str) {
        let counter = match status {
            Status::Committed | Status::Pulled | Status::Ran => &self.succeeded,
            Status::NoChanges | Status::UpToDate => &self.unchanged,
            Status::Skip | Status::NoRemote => &self.skipped,
            Status::TimedOut => &self.timed_out,
            Status::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if status.is_failure() {
            match self.failed_repos.lock() {
                Ok(mut guard) => guard.push((display_path.to_string(), message.to_string())),
                Err(_) => tracing::warn!(repo = display_path, "failed to record failure"),
            }
        }
    }

    pub fn total(&self) -> u64 {
        [
            &self.succeeded,
            &self.unchanged,
            &self.skipped,
            &self.failed,
            &self.timed_out,
        ]
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .sum()
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed) + self.timed_out.load(Ordering::Relaxed)
    }

    /// One-line summary, e.g. `✅ Completed in 1.2s • 3 repos • 2 ok • 1 unchanged`
    pub fn generate_summary(&self, duration: Duration) -> String {
        let mut summary = format!(
            "✅ Completed in {:.1}s • {} repos • {} ok • {} unchanged",
            duration.as_secs_f64(),
            self.total(),
            self.succeeded.load(Ordering::Relaxed),
            self.unchanged.load(Ordering::Relaxed),
        );

        let skipped = self.skipped.load(Ordering::Relaxed);
        if skipped > 0 {
            summary.push_str(&format!(" • {skipped} skipped"));
        }
        let failed = self.failed.load(Ordering::Relaxed);
        if failed > 0 {
            summary.push_str(&format!(" • {failed} failed"));
        }
        let timed_out = self.timed_out.load(Ordering::Relaxed);
        if timed_out > 0 {
            summary.push_str(&format!(" • {timed_out} timed out"));
        }

        summary
    }

    /// Tree-style list of failed repositories, empty when nothing failed
    pub fn generate_detailed_summary(&self) -> String {
        let failed_repos = match self.failed_repos.lock() {
            Ok(guard) => guard,
            Err(_) => return String::new(),
        };
        if failed_repos.is_empty() {
            return String::new();
        }

        let mut lines = vec![format!("🔴 FAILED REPOS ({})", failed_repos.len())];
        for (i, (repo_path, error)) in failed_repos.iter().enumerate() {
            let tree_char = if i == failed_repos.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            let short_path = crate::utils::shorten_path(repo_path, PATH_DISPLAY_WIDTH);
            lines.push(format!("   {tree_char} {short_path:30} # {error}"));
        }
        lines.join("\n")
    }
}

/// Cleans and formats error messages for display
pub(crate) fn clean_error_message(error: &str) -> String {
    // Replace newlines/tabs with spaces and collapse whitespace
    let cleaned = error.replace(['\n', '\t'], " ").replace('\r', "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("timed out") {
        "timeout".to_string()
    } else if cleaned.contains("Authentication failed") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("Not possible to fast-forward") || cleaned.contains("diverged") {
        "diverged from upstream".to_string()
    } else if cleaned.contains("Could not resolve host") || cleaned.contains("Connection") {
        "network error".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
