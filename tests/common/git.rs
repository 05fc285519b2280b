//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Initializes a git repository with user config
pub fn setup_git_repo(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    git(path, &["init", "--quiet"])?;
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    // Disable commit signing for tests
    git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Adds a git remote to a repository
pub fn add_git_remote(path: &Path, remote_name: &str, url: &str) -> Result<()> {
    git(path, &["remote", "add", remote_name, url])?;
    Ok(())
}

/// Clones `source` into `target`, giving `target` an upstream to pull from
pub fn clone_repo(source: &Path, target: &Path) -> Result<()> {
    let parent = target.parent().unwrap_or(target);
    std::fs::create_dir_all(parent)?;
    let source = source.to_string_lossy();
    let target = target.to_string_lossy();
    git(parent, &["clone", "--quiet", &source, &target])?;
    Ok(())
}

pub fn head_subject(path: &Path) -> Result<String> {
    git(path, &["log", "-1", "--format=%s"])
}

pub fn is_clean(path: &Path) -> Result<bool> {
    Ok(git(path, &["status", "--porcelain"])?.is_empty())
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
