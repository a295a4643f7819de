//! Workspace types and utilities.
//!
//! This module contains the value types handed out by the manager and
//! resolver, plus the serialized views built from them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::manager::Manager;
use super::paths;
use super::vcs::VcsDetector;

/// Version control system detected for a workspace root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    #[default]
    None,
    Git,
    Mercurial,
}

impl VcsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VcsKind::None => "none",
            VcsKind::Git => "git",
            VcsKind::Mercurial => "mercurial",
        }
    }

    pub fn is_some(&self) -> bool {
        !matches!(self, VcsKind::None)
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single workspace directory.
///
/// Roots are owned by the [`Manager`]; every accessor hands out a clone, so
/// editing a returned root never changes manager state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRoot {
    /// Absolute, normalized path to the root directory
    pub path: PathBuf,
    /// Display name, e.g. "frontend". Not required to be unique.
    pub name: String,
    #[serde(default)]
    pub vcs: VcsKind,
    /// Latest commit hash (Git roots only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    /// Fetch remotes, de-duplicated in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_urls: Vec<String>,
}

impl WorkspaceRoot {
    /// Create a root without VCS metadata. The path is normalized lexically.
    pub fn new(path: impl AsRef<Path>, name: impl Into<String>) -> Self {
        Self {
            path: paths::normalize(path.as_ref()),
            name: name.into(),
            vcs: VcsKind::None,
            commit_hash: None,
            remote_urls: Vec::new(),
        }
    }

    /// Create a root named after the last component of its path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = paths::normalize(path.as_ref());
        let name = default_name(&path);
        Self::new(path, name)
    }

    pub fn with_vcs(mut self, vcs: VcsKind) -> Self {
        self.vcs = vcs;
        self
    }

    /// Build a root and attach best-effort VCS metadata.
    ///
    /// Probe failures leave the metadata empty; this never fails.
    pub async fn probe(path: &Path, name: Option<String>, detector: &VcsDetector) -> Self {
        let mut root = match name {
            Some(name) => Self::new(path, name),
            None => Self::from_path(path),
        };

        root.vcs = detector.detect(&root.path).await;
        if root.vcs == VcsKind::Git {
            root.commit_hash = detector.commit_hash(&root.path).await.ok();
            root.remote_urls = detector.remote_urls(&root.path).await.unwrap_or_default();
        }
        root
    }
}

/// Basename of a path, or the whole path for `/` and similar.
pub(crate) fn default_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// A path resolved against a specific workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub absolute_path: PathBuf,
    /// Snapshot of the owning root at resolution time
    pub root: WorkspaceRoot,
    pub relative_path: PathBuf,
}

/// Execution-time view of the workspace set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceContext {
    pub roots: Vec<WorkspaceRoot>,
    pub primary_root: Option<WorkspaceRoot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_root: Option<WorkspaceRoot>,
}

/// Per-root metadata included in LLM prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMetadata {
    pub hint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_remote_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_git_commit_hash: Option<String>,
}

/// Workspace environment keyed by absolute root path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentContext {
    pub workspaces: BTreeMap<String, WorkspaceMetadata>,
}

/// Shared workspace manager type for async operations
pub type SharedWorkspaceManager = Arc<RwLock<Manager>>;

/// Create a shared workspace manager
pub fn create_shared_workspace_manager(manager: Manager) -> SharedWorkspaceManager {
    Arc::new(RwLock::new(manager))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_kind_wire_names() {
        assert_eq!(serde_json::to_string(&VcsKind::Git).unwrap(), "\"git\"");
        assert_eq!(
            serde_json::to_string(&VcsKind::Mercurial).unwrap(),
            "\"mercurial\""
        );
        let none: VcsKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(none, VcsKind::None);
    }

    #[test]
    fn test_root_serialization_omits_empty_metadata() {
        let root = WorkspaceRoot::new("/repo/app", "app");
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["path"], "/repo/app");
        assert_eq!(json["vcs"], "none");
        assert!(json.get("commitHash").is_none());
        assert!(json.get("remoteUrls").is_none());
    }

    #[test]
    fn test_from_path_uses_basename() {
        let root = WorkspaceRoot::from_path("/repo/./frontend/");
        assert_eq!(root.name, "frontend");
        assert_eq!(root.path, PathBuf::from("/repo/frontend"));
    }
}
