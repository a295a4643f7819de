use anyhow::Result;
use std::path::Path;
use tracing::warn;

use wsroots::workspace::{
    config, create_shared_workspace_manager, refresh_commit_hashes_shared, Manager, VcsDetector,
};

/// Switch the primary workspace. With `persist` unset (roots given on the
/// command line) the project config is left untouched.
pub fn run_switch(
    mut manager: Manager,
    home: &Path,
    identifier: &str,
    persist: bool,
) -> Result<()> {
    let root = manager.switch_workspace(identifier)?;
    println!("✅ Primary workspace: {} ({})", root.name, root.path.display());

    if !persist {
        warn!(
            "Roots came from --workspace, not saving to {}",
            config::config_path(home).display()
        );
        return Ok(());
    }

    let preferences = match config::load_manager_from_directory(home) {
        Ok(Some((_, prefs))) => Some(prefs),
        Ok(None) => None,
        Err(e) => {
            warn!("Existing workspace config unreadable, rewriting: {:#}", e);
            None
        }
    };
    config::save_manager_to_directory(home, &manager, preferences.as_ref())?;
    println!("   Saved to {}", config::config_path(home).display());

    Ok(())
}

pub async fn run_refresh(
    manager: Manager,
    home: &Path,
    detector: &VcsDetector,
    persist: bool,
) -> Result<()> {
    let shared = create_shared_workspace_manager(manager);
    refresh_commit_hashes_shared(&shared, detector).await;

    let manager = shared.read().await;
    for root in manager.roots() {
        match &root.commit_hash {
            Some(hash) => println!("{:<16} {}", root.name, hash),
            None => println!("{:<16} -", root.name),
        }
    }

    if !persist {
        warn!("Roots came from --workspace, not saving refreshed hashes");
    } else if config::config_exists(home) {
        let prefs = config::load_config_from_directory(home)?.preferences;
        config::save_manager_to_directory(home, &manager, Some(&prefs))?;
    }

    Ok(())
}
