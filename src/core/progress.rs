//! Console progress reporting for a pull run

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::config::{OUTPUT_SNIPPET_MAX_LENGTH, PROGRESS_TEMPLATE, SPINNER_TICK_MILLIS};
use super::discovery::{ScanError, ScanObserver};
use super::stats::clean_error_message;
use crate::git::{symbol, text, SyncResult};
use crate::utils::repo_display_name;

/// Prints one line per repository, with a spinner while its sync is running
pub struct ConsoleReporter {
    style: ProgressStyle,
    current: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ConsoleReporter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            style: create_progress_style()?,
            current: Mutex::new(None),
            hidden: false,
        })
    }

    /// A reporter that draws nothing; used when stdout is not a terminal
    pub fn hidden() -> Result<Self> {
        Ok(Self {
            hidden: true,
            ..Self::new()?
        })
    }

    fn spinner(&self, repo_name: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(self.style.clone());
        pb.set_prefix(format!("🟡 {repo_name}"));
        pb.set_message("pulling...");
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MILLIS));
        pb
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        match self.current.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        }
    }
}

impl ScanObserver for ConsoleReporter {
    fn repo_started(&self, repo_name: &str, repo_path: &Path) {
        println!("\n⬇️  {repo_name} ({})", repo_path.display());
        let pb = self.spinner(repo_name);
        if let Ok(mut guard) = self.current.lock() {
            if let Some(previous) = guard.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn repo_finished(&self, repo_name: &str, _repo_path: &Path, result: &SyncResult) {
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        println!(
            "{} {} {}: {}",
            symbol(result),
            text(result),
            repo_name,
            result_snippet(result)
        );
    }

    fn dir_skipped(&self, error: &ScanError) {
        println!("🟠 skipped {}", error.path().display());
    }

    fn dir_passed(&self, path: &Path) {
        println!("⚪ not a repository: {}", repo_display_name(path));
    }
}

/// Short, single-line text describing a sync result
pub fn result_snippet(result: &SyncResult) -> String {
    match result {
        Ok(output) if output.stdout.is_empty() => "done".to_string(),
        Ok(output) => {
            let line = output.stdout.lines().last().unwrap_or_default().trim();
            if line.chars().count() > OUTPUT_SNIPPET_MAX_LENGTH {
                let head: String = line.chars().take(OUTPUT_SNIPPET_MAX_LENGTH - 3).collect();
                format!("{head}...")
            } else {
                line.to_string()
            }
        }
        Err(err) => clean_error_message(&err.to_string()),
    }
}

/// Creates a progress bar style configuration
/// Returns a ProgressStyle configured with the application's visual styling
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?)
}
