use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use wsroots::workspace::{config, find_project_root, paths, Manager, VcsDetector};

use super::Cli;

/// Resolve a directory argument, defaulting to the project root around cwd.
pub fn resolve_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let path = paths::absolutize(&paths::expand_home(raw))
                .with_context(|| format!("Failed to resolve directory: {}", raw))?;
            if !path.is_dir() {
                bail!("Directory does not exist: {}", path.display());
            }
            Ok(path)
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            Ok(find_project_root(&paths::normalize(&cwd)))
        }
    }
}

/// Build the manager for this invocation.
///
/// Explicit `-w` directories win; otherwise the project's `.workspace.json`
/// is used when present, and a single-directory workspace when not.
pub async fn load_manager(cli: &Cli, detector: &VcsDetector) -> Result<(Manager, PathBuf)> {
    let home = resolve_dir(None)?;

    let mut manager = if cli.workspaces.is_empty() {
        match config::load_manager_from_directory(&home)? {
            Some((manager, _)) => {
                debug!("Using workspace config in {}", home.display());
                manager
            }
            None => Manager::from_single_directory_with(&home, detector).await,
        }
    } else {
        let mut dirs = Vec::with_capacity(cli.workspaces.len());
        for raw in &cli.workspaces {
            dirs.push(resolve_dir(Some(raw))?);
        }
        Manager::from_directories(&dirs, 0, detector).await
    };

    if let Some(primary) = &cli.primary {
        let root = manager.switch_workspace(primary)?;
        info!("Primary workspace: {}", root.name);
    }

    Ok((manager, home))
}
