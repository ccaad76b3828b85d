//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Repository classification and the bounded-depth scan
//! - Run statistics and the final summary
//! - Console progress reporting
//!
//! Internal implementation details are not exposed through this API.

// Scan configuration
pub use super::config::{ScanConfig, Settings, DEFAULT_MAX_DEPTH, REPO_MARKER_DIR};

// Classification and scanning
pub use super::discovery::{
    is_repository, scan, DirWalk, LocalFs, LocalWalk, NoopObserver, RepoFs, ScanError,
    ScanObserver, Scanner, WalkItem,
};

// Statistics
pub use super::stats::{RunStats, RunSummary};

// Progress output
pub use super::progress::{result_snippet, ConsoleReporter};
