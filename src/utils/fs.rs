//! Path display utilities

use std::path::Path;

use crate::core::config::UNKNOWN_REPO_NAME;

/// Shortens long paths for display, keeping the last two components
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match components.as_slice() {
        [.., parent, name] if components.len() > 2 => {
            let prefix = if path.starts_with("./") { "./" } else { "" };
            format!("{prefix}.../{parent}/{name}")
        }
        // Too few components to shorten meaningfully
        _ => path.to_string(),
    }
}

/// Name shown for a repository: its directory name
pub fn repo_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN_REPO_NAME.to_string())
}
