//! Sync outcome types

use std::time::Duration;
use thiserror::Error;

/// Output of a sync command that exited with status zero
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncOutput {
    /// Trimmed standard output of the command
    pub stdout: String,
}

/// Reasons a single repository failed to sync
#[derive(Debug, Error)]
pub enum SyncError {
    /// The command could not be started at all (missing executable, I/O error)
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The command ran and exited with a non-zero status
    #[error("{}", exit_message(.code, .stderr))]
    Exited { code: Option<i32>, stderr: String },
    /// The command did not finish within the configured timeout
    #[error("sync timed out after {}", timeout_text(.0))]
    TimedOut(Duration),
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Whole seconds read as "N seconds"; anything finer keeps its unit ("100ms")
fn timeout_text(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 && timeout.as_secs() > 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{timeout:?}")
    }
}

/// Outcome of syncing one repository root
pub type SyncResult = Result<SyncOutput, SyncError>;

/// Status symbol shown next to a repository in progress output
pub fn symbol(result: &SyncResult) -> &'static str {
    match result {
        Ok(_) => "🟢",
        Err(_) => "🔴",
    }
}

/// Short status word shown next to a repository in progress output
pub fn text(result: &SyncResult) -> &'static str {
    match result {
        Ok(_) => "updated",
        Err(_) => "failed",
    }
}
