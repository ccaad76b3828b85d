pub mod pull;

pub use pull::{handle_pull_command, PullOptions};
