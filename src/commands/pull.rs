//! Repository pull command implementation
//!
//! This module handles the whole pull flow - resolving the scan root and
//! settings, asking for confirmation, walking the tree and printing the summary.

use anyhow::{bail, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::config::{resolve, Overrides, CANCELLED_MESSAGE};
use crate::core::{
    ConsoleReporter, LocalFs, RepoFs, RunStats, ScanConfig, ScanObserver, Scanner, Settings,
};
use crate::git::{CommandSyncer, Syncer};

/// Options collected from the command line
#[derive(Clone, Debug, Default)]
pub struct PullOptions {
    pub root: Option<PathBuf>,
    pub depth: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub config: Option<PathBuf>,
    pub assume_yes: bool,
}

/// Handles the pull command; returns the run statistics, or `None` if the user declined
pub async fn handle_pull_command(options: PullOptions) -> Result<Option<RunStats>> {
    let settings = Settings::load(options.config.as_deref())?;
    let root = resolve_root(options.root)?;
    let overrides = Overrides {
        depth: options.depth,
        timeout_secs: options.timeout_secs,
    };
    let (scan_config, command) = resolve(root, &settings, &overrides)?;

    println!("Batch git pull");
    println!("{}", "=".repeat(50));
    tracing::debug!(
        root = %scan_config.root.display(),
        max_depth = scan_config.max_depth,
        command = %command.display(),
        "resolved configuration"
    );

    let syncer = CommandSyncer::new(command);
    let reporter = if io::stdout().is_terminal() {
        ConsoleReporter::new()?
    } else {
        ConsoleReporter::hidden()?
    };

    if !options.assume_yes {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        return pull_after_confirmation(
            stdin.lock(),
            &mut stdout,
            &scan_config,
            &LocalFs,
            &syncer,
            &reporter,
        )
        .await;
    }

    Ok(Some(
        pull(&scan_config, &LocalFs, &syncer, &reporter, &mut io::stdout()).await?,
    ))
}

/// Asks for confirmation on `input`/`output` and runs the pull only if the user agrees
///
/// Declining returns `Ok(None)` before anything under the root is touched.
pub async fn pull_after_confirmation<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &ScanConfig,
    fs: &dyn RepoFs,
    syncer: &dyn Syncer,
    observer: &dyn ScanObserver,
) -> Result<Option<RunStats>> {
    if !confirm(input, &mut *output, &config.root)? {
        writeln!(output, "{CANCELLED_MESSAGE}")?;
        return Ok(None);
    }
    Ok(Some(pull(config, fs, syncer, observer, output).await?))
}

/// Walks the tree, syncing every repository found, then writes the summary to `output`
pub async fn pull<W: Write>(
    config: &ScanConfig,
    fs: &dyn RepoFs,
    syncer: &dyn Syncer,
    observer: &dyn ScanObserver,
    output: &mut W,
) -> Result<RunStats> {
    writeln!(
        output,
        "Pulling git repositories under {} (depth {})",
        config.root.display(),
        config.max_depth
    )?;
    output.flush()?;

    let start_time = Instant::now();
    let stats = Scanner::new(config, fs, syncer, observer).run().await;
    let summary = stats.summarize(start_time.elapsed());

    writeln!(output)?;
    let details = stats.generate_detailed_summary();
    if !details.is_empty() {
        writeln!(output, "{details}")?;
        writeln!(output)?;
    }
    writeln!(output, "{summary}")?;
    output.flush()?;

    Ok(stats)
}

/// Prompts `Pull every repository under <root>? (y/n)` and reads one line
///
/// Only `y` or `yes` (any case) count as agreement; EOF is a decline.
pub fn confirm<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    root: &Path,
) -> io::Result<bool> {
    write!(output, "Pull every repository under '{}'? (y/n): ", root.display())?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Picks the scan root: an explicit path, else the directory holding the
/// running executable, else the current working directory
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if !root.is_dir() {
            bail!("Scan root {} is not a directory", root.display());
        }
        return Ok(root);
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(dir) = exe_dir {
        return Ok(dir);
    }

    match std::env::current_dir() {
        Ok(dir) => Ok(dir),
        Err(e) => bail!("Unable to determine a directory to scan: {e}"),
    }
}
