pub(crate) mod fs;
pub mod logging;

// Public API - utilities used by commands
pub use fs::{repo_display_name, shorten_path};
pub use logging::init_logging;
