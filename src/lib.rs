//! # batch-pull
//!
//! `batch-pull` refreshes every git checkout kept under a common directory.
//! It powers the `batch-pull` CLI tool.
//!
//! ## How a run works
//!
//! - **Bounded scan**: the root's children (depth 1) down to a configurable
//!   depth (2 by default) are checked for a `.git` directory.
//! - **No nesting**: a repository root is synced and never descended into.
//! - **One command per repository**: `git pull` runs with the repository as its
//!   working directory; failures are recorded and the walk carries on.
//! - **Summary**: repositories found, updated, failed, and unreadable
//!   directories skipped.
//!
//! ## Example
//!
//! ```rust,no_run
//! use batch_pull::core::{scan, NoopObserver, ScanConfig};
//! use batch_pull::git::CommandSyncer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScanConfig::new("/home/me/src");
//!     let stats = scan(&config, &CommandSyncer::default(), &NoopObserver).await;
//!     println!("{} of {} repositories updated", stats.updated, stats.total_repos);
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod utils;
