use anyhow::{bail, Result};
use std::path::Path;

use wsroots::workspace::config::{self, Preferences};
use wsroots::workspace::detection::detect_workspaces_from_preferences;
use wsroots::workspace::{
    detect_workspaces, smart_initialization, DetectionOptions, VcsDetector, WorkspaceRoot,
};

fn print_roots(roots: &[WorkspaceRoot]) {
    for root in roots {
        println!("  {:<16} {:<10} {}", root.name, root.vcs, root.path.display());
    }
}

pub async fn run_detect(
    dir: &Path,
    detector: &VcsDetector,
    max_depth: usize,
    include_hidden: bool,
) -> Result<()> {
    println!("Scanning for workspaces: {}\n", dir.display());

    // Preferences from an existing config take precedence over flags
    let saved: Option<Preferences> = config::load_manager_from_directory(dir)
        .ok()
        .flatten()
        .map(|(_, prefs)| prefs)
        .filter(|prefs| prefs.auto_detect_workspaces);

    let roots = match saved {
        Some(prefs) => detect_workspaces_from_preferences(dir, &prefs, detector).await?,
        None => {
            let options = DetectionOptions {
                max_depth,
                include_hidden,
                ..DetectionOptions::default()
            };
            detect_workspaces(dir, &options, detector).await?
        }
    };

    if roots.is_empty() {
        println!("No workspaces found.");
    } else {
        println!("Found {} workspace(s):", roots.len());
        print_roots(&roots);
    }
    Ok(())
}

pub async fn run_init(dir: &Path, detector: &VcsDetector, force: bool) -> Result<()> {
    if config::config_exists(dir) {
        if !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                config::config_path(dir).display()
            );
        }
        std::fs::remove_file(config::config_path(dir))?;
    }

    let manager = smart_initialization(dir, detector).await;
    if !config::config_exists(dir) {
        config::save_manager_to_directory(dir, &manager, None)?;
    }

    println!("✅ Wrote {}", config::config_path(dir).display());
    println!("{}", manager.summary());
    Ok(())
}

pub fn run_validate(dir: &Path) -> Result<()> {
    let loaded = config::load_config_from_directory(dir)?;
    let migrated = config::migrate_config(loaded)?;
    config::validate_config(&migrated)?;

    println!(
        "✅ {} is valid ({} roots)",
        config::config_path(dir).display(),
        migrated.roots.len()
    );
    Ok(())
}
