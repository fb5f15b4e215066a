//! Source discovery from git for `check --changed`.

use std::path::PathBuf;

use tokio::process::Command;

use crate::{
    error::{AppResult, git_error},
    extract::SourceKind
};

/// Reviewable sources touched by the last commit that still exist.
///
/// Falls back to every tracked reviewable file when the diff cannot be
/// taken (first commit, shallow clone) or names nothing reviewable.
///
/// # Errors
///
/// Returns an error if git cannot be started or `git ls-files` fails.
pub async fn changed_sources() -> AppResult<Vec<PathBuf>> {
    let diff = ["diff", "--name-only", "--relative", "HEAD^", "HEAD"];
    if let Some(listing) = git(&diff).await? {
        let paths = existing(reviewable_paths(&listing));
        if !paths.is_empty() {
            return Ok(paths);
        }
    }

    tracing::debug!("no reviewable changes in last commit, using tracked files");
    let ls_files = ["ls-files"];
    match git(&ls_files).await? {
        Some(listing) => Ok(existing(reviewable_paths(&listing))),
        None => Err(git_error(&ls_files.join(" "), "not a git repository"))
    }
}

/// Paths from a git file listing whose extension `check` can read
pub fn reviewable_paths(listing: &str) -> Vec<PathBuf> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .filter(|path| SourceKind::from_path(path).is_some())
        .collect()
}

fn existing(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.into_iter().filter(|p| p.is_file()).collect()
}

/// Stdout of a git command, `None` when git exits unsuccessfully
async fn git(args: &[&str]) -> AppResult<Option<String>> {
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| git_error(&args.join(" "), &e.to_string()))?;
    if output.status.success() {
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    } else {
        tracing::debug!(
            args = %args.join(" "),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git command failed"
        );
        Ok(None)
    }
}
