//! External sync command execution

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::status::{SyncError, SyncOutput, SyncResult};
use crate::core::config::{DEFAULT_SYNC_ARGS, DEFAULT_SYNC_PROGRAM, DEFAULT_TIMEOUT_SECS};

/// Brings a single repository up to date
#[async_trait]
pub trait Syncer: Send + Sync {
    /// Runs the sync operation for the repository rooted at `repo_path`
    async fn sync(&self, repo_path: &Path) -> SyncResult;
}

/// The external command used to sync a repository, e.g. `git pull`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCommand {
    pub program: String,
    pub args: Vec<String>,
    /// `None` waits for the command indefinitely
    pub timeout: Option<Duration>,
}

impl Default for SyncCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_SYNC_PROGRAM.to_string(),
            args: DEFAULT_SYNC_ARGS.iter().map(|s| s.to_string()).collect(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl SyncCommand {
    /// Builds a command from an argv-style list; returns `None` when it is empty
    pub fn from_argv(argv: &[String], timeout: Option<Duration>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    /// Human readable form of the command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs `program args...` with `path` as its working directory, with an optional timeout
/// Returns (success, exit code, stdout, stderr) with both streams lossily decoded and trimmed
pub async fn run_command(
    path: &Path,
    command: &SyncCommand,
) -> Result<(bool, Option<i32>, String, String), SyncError> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(path)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = match command.timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => return Err(SyncError::TimedOut(limit)),
        },
        None => cmd.output().await,
    }
    .map_err(|source| SyncError::Launch {
        program: command.program.clone(),
        source,
    })?;

    Ok((
        output.status.success(),
        output.status.code(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}

/// Syncs repositories by spawning an external command inside each one
#[derive(Clone, Debug, Default)]
pub struct CommandSyncer {
    command: SyncCommand,
}

impl CommandSyncer {
    pub fn new(command: SyncCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Syncer for CommandSyncer {
    async fn sync(&self, repo_path: &Path) -> SyncResult {
        tracing::debug!(
            command = %self.command.display(),
            cwd = %repo_path.display(),
            "running sync command"
        );

        let (success, code, stdout, stderr) = run_command(repo_path, &self.command).await?;
        if success {
            Ok(SyncOutput { stdout })
        } else {
            Err(SyncError::Exited { code, stderr })
        }
    }
}
