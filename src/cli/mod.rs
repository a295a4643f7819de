mod args;
mod paths;

pub use args::{Cli, Commands};
pub use paths::{load_manager, resolve_dir};
