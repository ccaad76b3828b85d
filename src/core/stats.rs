//! Statistics tracking for a pull run

use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::discovery::ScanError;
use crate::core::config::{
    ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH, PATH_DISPLAY_WIDTH,
};
use crate::git::SyncResult;
use crate::utils::shorten_path;

/// Running totals for one scan
///
/// `total_repos` only moves together with `updated` or `failed`, so
/// `total_repos == updated + failed` holds at every point of a run.
#[derive(Clone, Debug, Default)]
pub struct RunStats {
    pub total_repos: u64,
    pub updated: u64,
    pub failed: u64,
    pub skipped: u64,
    pub updated_repos: Vec<(String, String)>, // (repo_name, repo_path)
    pub failed_repos: Vec<(String, String, String)>, // (repo_name, repo_path, error_message)
    pub skipped_dirs: Vec<(String, String)>,  // (dir_path, reason)
}

impl RunStats {
    /// Creates a new statistics tracker with all counters initialized to zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of syncing one repository
    pub fn record(&mut self, repo_name: &str, repo_path: &Path, result: &SyncResult) {
        self.total_repos += 1;
        let repo_path = repo_path.display().to_string();
        match result {
            Ok(_) => {
                self.updated += 1;
                self.updated_repos.push((repo_name.to_string(), repo_path));
            }
            Err(err) => {
                self.failed += 1;
                self.failed_repos
                    .push((repo_name.to_string(), repo_path, err.to_string()));
            }
        }
    }

    /// Records a directory that could not be enumerated
    pub fn record_skip(&mut self, error: &ScanError) {
        self.skipped += 1;
        let reason = match error {
            ScanError::ReadDir { source, .. } => source.to_string(),
        };
        self.skipped_dirs
            .push((error.path().display().to_string(), reason));
    }

    /// Freezes the counters into a summary
    pub fn summarize(&self, elapsed: Duration) -> RunSummary {
        RunSummary {
            total_repos: self.total_repos,
            updated: self.updated,
            failed: self.failed,
            skipped: self.skipped,
            elapsed,
        }
    }

    /// Generates detailed lines for repositories and directories needing attention
    pub fn generate_detailed_summary(&self) -> String {
        let mut lines = Vec::new();

        if !self.failed_repos.is_empty() {
            lines.push(format!("🔴 FAILED REPOS ({})", self.failed_repos.len()));
            for (i, (repo_name, repo_path, error)) in self.failed_repos.iter().enumerate() {
                let tree_char = tree_char(i, self.failed_repos.len());
                let short_path = shorten_path(repo_path, PATH_DISPLAY_WIDTH);
                lines.push(format!(
                    "   {} {:20} {:30} # {}",
                    tree_char,
                    repo_name,
                    short_path,
                    clean_error_message(error)
                ));
            }
            lines.push(String::new());
        }

        if !self.skipped_dirs.is_empty() {
            lines.push(format!("🟠 SKIPPED DIRECTORIES ({})", self.skipped_dirs.len()));
            for (i, (dir_path, reason)) in self.skipped_dirs.iter().enumerate() {
                let tree_char = tree_char(i, self.skipped_dirs.len());
                let short_path = shorten_path(dir_path, PATH_DISPLAY_WIDTH);
                lines.push(format!("   {} {:30} # {}", tree_char, short_path, reason));
            }
        }

        // Remove trailing blank line if it exists
        if lines.last() == Some(&String::new()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

fn tree_char(index: usize, len: usize) -> &'static str {
    if index == len - 1 {
        "└─"
    } else {
        "├─"
    }
}

/// Final counters of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub total_repos: u64,
    pub updated: u64,
    pub failed: u64,
    pub skipped: u64,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "Pull finished")?;
        writeln!(f, "- repositories found: {}", self.total_repos)?;
        writeln!(f, "- updated:            {}", self.updated)?;
        writeln!(f, "- failed:             {}", self.failed)?;
        writeln!(f, "- skipped dirs:       {}", self.skipped)?;
        writeln!(f, "{rule}")?;
        write!(f, "Total time: {:.2}s", self.elapsed.as_secs_f64())
    }
}

/// Cleans and formats error messages for display
pub(crate) fn clean_error_message(error: &str) -> String {
    // Replace newlines/tabs with spaces and collapse whitespace
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = cleaned.to_lowercase();

    // The sync program never ran; git's own wording does not apply
    if lower.starts_with("failed to launch") {
        let reason = cleaned.split_once(": ").map_or("", |(_, reason)| reason);
        truncate_message(format!("launch failed: {reason}"))
    } else if lower.contains("timed out") {
        "timeout".to_string()
    } else if lower.contains("authentication") || lower.contains("permission denied") {
        "authentication failed".to_string()
    } else if lower.contains("conflict") || lower.contains("diverg") {
        "merge conflict".to_string()
    } else if lower.contains("would be overwritten") {
        "local changes would be overwritten".to_string()
    } else if lower.contains("no tracking information") {
        "no upstream".to_string()
    } else if lower.contains("could not resolve host") || lower.contains("connection") {
        "network error".to_string()
    } else {
        truncate_message(cleaned)
    }
}

fn truncate_message(message: String) -> String {
    if message.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let head: String = message.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{head}...")
    } else {
        message
    }
}
