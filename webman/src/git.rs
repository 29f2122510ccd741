//! Version metadata read from the repository's `.git` directory.
//!
//! Both helpers return an empty string when the branch ref is not a loose
//! file, e.g. outside a checkout or after `git pack-refs`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

const SHORT_HASH_LEN: usize = 7;

fn ref_path(repo_root: &Path, branch: &str) -> PathBuf {
    repo_root.join(".git").join("refs").join("heads").join(branch)
}

/// Commit hash at the tip of `branch`, abbreviated to 7 characters when `short`.
pub fn current_git_commit(repo_root: &Path, branch: &str, short: bool) -> String {
    let path = ref_path(repo_root, branch);
    let hash = match fs::read_to_string(&path) {
        Ok(contents) => contents.trim().to_string(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "git ref not readable");
            return String::new();
        }
    };

    if short {
        hash.chars().take(SHORT_HASH_LEN).collect()
    } else {
        hash
    }
}

/// Modification time of the `branch` ref in local time, formatted with `format`.
///
/// An invalid chrono format string also yields an empty string.
pub fn current_git_filemtime(repo_root: &Path, branch: &str, format: &str) -> String {
    let path = ref_path(repo_root, branch);
    let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
        Ok(modified) => DateTime::<Local>::from(modified),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "git ref not readable");
            return String::new();
        }
    };

    let mut out = String::new();
    if write!(out, "{}", modified.format(format)).is_err() {
        tracing::warn!(format, "invalid time format for git ref mtime");
        return String::new();
    }
    out
}
