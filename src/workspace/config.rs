//! Persistent workspace configuration (`.workspace.json`).
//!
//! A directory may carry a config file describing its roots, the primary
//! selection and detection preferences. Loading is lenient: stale indexes and
//! missing preferences are repaired. [`validate_config`] is the strict check.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{WorkspaceError, WorkspaceResult};
use super::manager::Manager;
use super::types::WorkspaceRoot;

/// Name of the workspace configuration file
pub const CONFIG_FILE_NAME: &str = ".workspace.json";

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

/// Preferences for workspace behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub auto_detect_workspaces: bool,
    #[serde(default)]
    pub max_workspaces: usize,
    #[serde(default, rename = "preferVCSRoots")]
    pub prefer_vcs_roots: bool,
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_detect_workspaces: false,
            max_workspaces: 10,
            prefer_vcs_roots: true,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub roots: Vec<WorkspaceRoot>,
    #[serde(default)]
    pub primary_index: i64,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Read and parse a config file, repairing recoverable fields.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workspace config from {}", path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse workspace config from {}", path.display()))?;

    if config.version == 0 {
        config.version = CONFIG_VERSION;
    }

    if config.primary_index < 0 || config.primary_index as u64 >= config.roots.len() as u64 {
        if !config.roots.is_empty() {
            warn!(
                "Primary index {} out of range in {}, using 0",
                config.primary_index,
                path.display()
            );
        }
        config.primary_index = 0;
    }

    if config.preferences.max_workspaces == 0 {
        config.preferences = Preferences::default();
    }

    Ok(config)
}

/// Write `config` as pretty JSON, creating parent directories as needed.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if config.version == 0 {
        config.version = CONFIG_VERSION;
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content =
        serde_json::to_string_pretty(&config).context("Failed to serialize workspace config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write workspace config to {}", path.display()))?;

    debug!("Workspace config saved to {}", path.display());
    Ok(())
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

pub fn config_exists(dir: &Path) -> bool {
    config_path(dir).exists()
}

pub fn load_config_from_directory(dir: &Path) -> Result<Config> {
    load_config(&config_path(dir))
}

pub fn save_config_to_directory(dir: &Path, config: &Config) -> Result<()> {
    save_config(&config_path(dir), config)
}

pub fn manager_from_config(config: &Config) -> Manager {
    Manager::new(config.roots.clone(), config.primary_index)
}

pub fn manager_to_config(manager: &Manager, preferences: Option<&Preferences>) -> Config {
    Config {
        version: CONFIG_VERSION,
        roots: manager.roots(),
        primary_index: manager.primary_index() as i64,
        preferences: preferences.cloned().unwrap_or_default(),
    }
}

/// Load a manager from `dir`'s config file. `Ok(None)` when no file exists.
pub fn load_manager_from_directory(dir: &Path) -> Result<Option<(Manager, Preferences)>> {
    if !config_exists(dir) {
        return Ok(None);
    }
    let config = load_config_from_directory(dir)?;
    Ok(Some((manager_from_config(&config), config.preferences)))
}

pub fn save_manager_to_directory(
    dir: &Path,
    manager: &Manager,
    preferences: Option<&Preferences>,
) -> Result<()> {
    save_config_to_directory(dir, &manager_to_config(manager, preferences))
}

/// Bring an older config up to the current version.
pub fn migrate_config(config: Config) -> WorkspaceResult<Config> {
    if config.version == CONFIG_VERSION {
        return Ok(config);
    }
    Err(WorkspaceError::InvalidConfig(format!(
        "unsupported config version: {}",
        config.version
    )))
}

/// Strict validation, including that every root exists as a directory.
pub fn validate_config(config: &Config) -> WorkspaceResult<()> {
    let invalid = |msg: String| Err(WorkspaceError::InvalidConfig(msg));

    if config.version != CONFIG_VERSION {
        return invalid(format!("unsupported config version: {}", config.version));
    }
    if config.roots.is_empty() {
        return invalid("config must have at least one workspace root".to_string());
    }
    if config.primary_index < 0 || config.primary_index as u64 >= config.roots.len() as u64 {
        return invalid(format!(
            "invalid primary index: {} (have {} roots)",
            config.primary_index,
            config.roots.len()
        ));
    }

    for (i, root) in config.roots.iter().enumerate() {
        if root.path.as_os_str().is_empty() {
            return invalid(format!("root {} has empty path", i));
        }
        if root.name.is_empty() {
            return invalid(format!("root {} has empty name", i));
        }
        match std::fs::metadata(&root.path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return invalid(format!(
                    "root {} path is not a directory: {}",
                    i,
                    root.path.display()
                ))
            }
            Err(_) => {
                return invalid(format!(
                    "root {} path does not exist: {}",
                    i,
                    root.path.display()
                ))
            }
        }
    }

    if config.preferences.max_workspaces < 1 {
        return invalid("maxWorkspaces must be at least 1".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::VcsKind;
    use tempfile::TempDir;

    fn two_root_manager(base: &Path) -> Manager {
        let ws1 = base.join("workspace1");
        let ws2 = base.join("workspace2");
        std::fs::create_dir_all(&ws1).unwrap();
        std::fs::create_dir_all(&ws2).unwrap();
        Manager::new(
            vec![
                WorkspaceRoot::new(&ws1, "workspace1").with_vcs(VcsKind::Git),
                WorkspaceRoot::new(&ws2, "workspace2"),
            ],
            1,
        )
    }

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let manager = two_root_manager(temp_dir.path());

        assert!(!config_exists(temp_dir.path()));
        save_manager_to_directory(temp_dir.path(), &manager, None).unwrap();
        assert!(config_exists(temp_dir.path()));

        let (loaded, prefs) = load_manager_from_directory(temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(loaded, manager);
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_missing_config_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_manager_from_directory(temp_dir.path())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_repairs_version_index_and_preferences() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cfg.json");
        std::fs::write(
            &path,
            r#"{"roots":[{"path":"/a","name":"a","vcs":"none"}],"primaryIndex":9}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.primary_index, 0);
        assert_eq!(config.preferences, Preferences::default());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cfg.json");
        std::fs::write(&path, "{{").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_preferences_wire_names() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(json["maxWorkspaces"], 10);
        assert_eq!(json["preferVCSRoots"], true);
        assert_eq!(json["autoDetectWorkspaces"], false);
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = two_root_manager(temp_dir.path());
        let mut config = manager_to_config(&manager, None);
        validate_config(&config).unwrap();

        config.primary_index = 5;
        assert!(validate_config(&config).is_err());
        config.primary_index = 0;

        config.roots[0].name.clear();
        assert!(validate_config(&config).is_err());
        config.roots[0].name = "workspace1".to_string();

        config.roots[1].path = temp_dir.path().join("missing");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        config.roots.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_migrate_config() {
        let config = Config {
            version: CONFIG_VERSION,
            roots: Vec::new(),
            primary_index: 0,
            preferences: Preferences::default(),
        };
        assert!(migrate_config(config.clone()).is_ok());

        let future = Config {
            version: 2,
            ..config
        };
        assert!(migrate_config(future).is_err());
    }
}
