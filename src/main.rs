//! batch-pull: runs `git pull` in every repository found under a directory

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use batch_pull::commands::{handle_pull_command, PullOptions};
use batch_pull::utils::init_logging;

#[derive(Parser)]
#[command(name = "batch-pull")]
#[command(about = "Pull every git repository found under a directory")]
#[command(version)]
struct Cli {
    /// Directory to scan (defaults to the directory containing this executable)
    root: Option<PathBuf>,

    /// Deepest directory level checked for repositories; the root's children are level 1
    #[arg(short, long)]
    depth: Option<usize>,

    /// Per-repository timeout in seconds (0 disables it)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Show debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    handle_pull_command(PullOptions {
        root: cli.root,
        depth: cli.depth,
        timeout_secs: cli.timeout,
        config: cli.config,
        assume_yes: cli.yes,
    })
    .await?;

    Ok(())
}
