//! Configuration constants and settings

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::git::SyncCommand;

// Scan configuration
pub const DEFAULT_MAX_DEPTH: usize = 2; // Root's children and grandchildren
pub const REPO_MARKER_DIR: &str = ".git";

// Sync command configuration
pub const DEFAULT_SYNC_PROGRAM: &str = "git";
pub const DEFAULT_SYNC_ARGS: &[&str] = &["pull"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 180; // 3 minutes per repository

// Settings file location, relative to the platform config directory
pub const SETTINGS_DIR_NAME: &str = "batch-pull";
pub const SETTINGS_FILE_NAME: &str = "config.toml";

// UI Constants
pub const UNKNOWN_REPO_NAME: &str = "unknown";
pub const CANCELLED_MESSAGE: &str = "Operation cancelled.";
pub const PROGRESS_TEMPLATE: &str = "{spinner} {prefix:.bold} {wide_msg}";
pub const SPINNER_TICK_MILLIS: u64 = 120;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 30;
pub const OUTPUT_SNIPPET_MAX_LENGTH: usize = 60;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 40;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 37;

/// Parameters of the directory walk, immutable for the duration of a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directory whose descendants are scanned; never itself classified
    pub root: PathBuf,
    /// Deepest level eligible for classification; the root's children are level 1
    pub max_depth: usize,
    /// Name of the metadata directory that marks a repository root
    pub marker: String,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            marker: REPO_MARKER_DIR.to_string(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }
}

/// Contents of the optional settings file
///
/// ```toml
/// depth = 3
/// timeout_secs = 60
/// command = ["git", "pull", "--ff-only"]
/// marker = ".git"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub depth: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub command: Option<Vec<String>>,
    pub marker: Option<String>,
}

impl Settings {
    /// Parses settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid settings file")
    }

    /// Loads settings from `explicit` if given, otherwise from the default location
    ///
    /// A missing default file yields empty settings; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path, true),
            None => match default_settings_path() {
                Some(path) => Self::load_from(&path, false),
                None => Ok(Self::default()),
            },
        }
    }

    /// Loads settings from `path`; when not `required`, a missing file yields empty settings
    pub(crate) fn load_from(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}

/// Default settings file path, e.g. `~/.config/batch-pull/config.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Values supplied on the command line; each one overrides the settings file
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub depth: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Resolves the scan configuration and sync command for a run
///
/// Priority order:
/// 1. command-line flag
/// 2. settings file
/// 3. built-in default
pub fn resolve(
    root: PathBuf,
    settings: &Settings,
    overrides: &Overrides,
) -> Result<(ScanConfig, SyncCommand)> {
    let max_depth = overrides
        .depth
        .or(settings.depth)
        .unwrap_or(DEFAULT_MAX_DEPTH);
    if max_depth == 0 {
        bail!("Scan depth must be at least 1");
    }

    let marker = settings
        .marker
        .clone()
        .unwrap_or_else(|| REPO_MARKER_DIR.to_string());
    if marker.is_empty() {
        bail!("Repository marker directory name must not be empty");
    }

    let timeout_secs = overrides
        .timeout_secs
        .or(settings.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    // 0 disables the timeout
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    let command = match &settings.command {
        Some(argv) => match SyncCommand::from_argv(argv, timeout) {
            Some(command) => command,
            None => bail!("Sync command must not be empty"),
        },
        None => SyncCommand {
            timeout,
            ..SyncCommand::default()
        },
    };

    let scan = ScanConfig::new(root)
        .with_max_depth(max_depth)
        .with_marker(marker);
    Ok((scan, command))
}
