//! Multi-root workspace manager.
//!
//! Owns the ordered root set and the primary selection. The root set is
//! fixed at construction; only commit hashes and the primary index change
//! afterwards. Mutation takes `&mut self`, so a plain `Manager` has a single
//! owner. Share it across tasks through [`SharedWorkspaceManager`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{WorkspaceError, WorkspaceResult};
use super::paths;
use super::types::{
    EnvironmentContext, SharedWorkspaceManager, VcsKind, WorkspaceContext, WorkspaceMetadata,
    WorkspaceRoot,
};
use super::vcs::VcsDetector;

/// Persisted manager state
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagerState {
    #[serde(default)]
    roots: Vec<WorkspaceRoot>,
    #[serde(default)]
    primary_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manager {
    roots: Vec<WorkspaceRoot>,
    primary_index: usize,
}

/// Clamp a possibly stale index into the root set, falling back to 0.
fn clamp_index(index: i64, len: usize) -> usize {
    if index < 0 || index as u64 >= len as u64 {
        0
    } else {
        index as usize
    }
}

impl Manager {
    /// Create a manager over `roots`. An out-of-range `primary_index`
    /// (including any negative index) selects the first root.
    pub fn new(roots: Vec<WorkspaceRoot>, primary_index: i64) -> Self {
        let primary_index = clamp_index(primary_index, roots.len());
        Self {
            roots,
            primary_index,
        }
    }

    /// Single-root manager for `cwd`, with best-effort VCS metadata.
    pub async fn from_single_directory(cwd: &Path) -> Self {
        Self::from_single_directory_with(cwd, &VcsDetector::default()).await
    }

    pub async fn from_single_directory_with(cwd: &Path, detector: &VcsDetector) -> Self {
        let path = paths::absolutize(cwd).unwrap_or_else(|_| paths::normalize(cwd));
        let root = WorkspaceRoot::probe(&path, None, detector).await;
        debug!("Single workspace {} ({})", root.path.display(), root.vcs);
        Self::new(vec![root], 0)
    }

    /// Manager over several directories, probing each for VCS metadata.
    pub async fn from_directories(
        dirs: &[PathBuf],
        primary_index: i64,
        detector: &VcsDetector,
    ) -> Self {
        let mut roots = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let path = paths::absolutize(dir).unwrap_or_else(|_| paths::normalize(dir));
            roots.push(WorkspaceRoot::probe(&path, None, detector).await);
        }
        Self::new(roots, primary_index)
    }

    pub fn roots(&self) -> Vec<WorkspaceRoot> {
        self.roots.clone()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// `None` only when no roots are configured.
    pub fn primary_root(&self) -> Option<WorkspaceRoot> {
        self.roots.get(self.primary_index).cloned()
    }

    pub fn primary_index(&self) -> usize {
        self.primary_index
    }

    pub fn root_by_name(&self, name: &str) -> Option<WorkspaceRoot> {
        self.roots.iter().find(|r| r.name == name).cloned()
    }

    pub fn root_by_index(&self, index: usize) -> Option<WorkspaceRoot> {
        self.roots.get(index).cloned()
    }

    pub fn set_primary_index(&mut self, index: usize) -> WorkspaceResult<()> {
        if index >= self.roots.len() {
            return Err(WorkspaceError::InvalidIndex {
                index,
                count: self.roots.len(),
            });
        }
        self.primary_index = index;
        Ok(())
    }

    pub fn set_primary_by_name(&mut self, name: &str) -> WorkspaceResult<()> {
        let index = self
            .roots
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| WorkspaceError::NotFound(name.to_string()))?;
        self.primary_index = index;
        Ok(())
    }

    pub fn set_primary_by_path(&mut self, path: &Path) -> WorkspaceResult<()> {
        let wanted = paths::normalize(path);
        let index = self
            .roots
            .iter()
            .position(|r| r.path == wanted)
            .ok_or_else(|| WorkspaceError::NotFoundAtPath(path.to_path_buf()))?;
        self.primary_index = index;
        Ok(())
    }

    /// Make the root matching `identifier` primary, trying names before paths.
    pub fn switch_workspace(&mut self, identifier: &str) -> WorkspaceResult<WorkspaceRoot> {
        if self.set_primary_by_name(identifier).is_err()
            && self.set_primary_by_path(Path::new(identifier)).is_err()
        {
            return Err(WorkspaceError::NotFound(identifier.to_string()));
        }
        let primary = self.primary_root().ok_or(WorkspaceError::NoRoots)?;
        info!("Switched primary workspace to {}", primary.name);
        Ok(primary)
    }

    /// Find the root containing `absolute_path`.
    ///
    /// Roots are tried longest path first, so a nested root shadows its
    /// parent regardless of registration order. Equal lengths keep
    /// registration order.
    pub fn resolve_path_to_root(&self, absolute_path: &Path) -> Option<WorkspaceRoot> {
        let mut sorted: Vec<&WorkspaceRoot> = self.roots.iter().collect();
        sorted.sort_by(|a, b| b.path.as_os_str().len().cmp(&a.path.as_os_str().len()));

        sorted
            .into_iter()
            .find(|root| paths::is_within(absolute_path, &root.path))
            .cloned()
    }

    pub fn is_path_in_workspace(&self, absolute_path: &Path) -> bool {
        self.resolve_path_to_root(absolute_path).is_some()
    }

    /// Path of `absolute_path` relative to `root`, or to its containing root
    /// when `root` is `None`. Falls back to the absolute path unchanged when
    /// no root applies or no relative form exists.
    pub fn relative_path_from_root(
        &self,
        absolute_path: &Path,
        root: Option<&WorkspaceRoot>,
    ) -> PathBuf {
        let containing;
        let target = match root {
            Some(root) => Some(root),
            None => {
                containing = self.resolve_path_to_root(absolute_path);
                containing.as_ref()
            }
        };

        target
            .and_then(|root| paths::relative_to(&root.path, absolute_path))
            .unwrap_or_else(|| absolute_path.to_path_buf())
    }

    pub fn is_single_root(&self) -> bool {
        self.roots.len() == 1
    }

    /// The only root, for callers that predate multi-root support.
    pub fn single_root(&self) -> WorkspaceResult<WorkspaceRoot> {
        match self.roots.as_slice() {
            [root] => Ok(root.clone()),
            roots => Err(WorkspaceError::InvalidState(format!(
                "expected single root, but found {} roots",
                roots.len()
            ))),
        }
    }

    /// Snapshot for tool execution. `current_root` defaults to the primary.
    pub fn create_context(&self, current_root: Option<WorkspaceRoot>) -> WorkspaceContext {
        let primary_root = self.primary_root();
        WorkspaceContext {
            roots: self.roots(),
            current_root: current_root.or_else(|| primary_root.clone()),
            primary_root,
        }
    }

    /// Refresh Git commit hashes in place. Per-root failures are skipped.
    pub async fn update_commit_hashes(&mut self, detector: &VcsDetector) {
        for root in self.roots.iter_mut().filter(|r| r.vcs == VcsKind::Git) {
            match detector.commit_hash(&root.path).await {
                Ok(hash) => root.commit_hash = Some(hash),
                Err(e) => debug!("Skipping commit refresh for {}: {}", root.name, e),
            }
        }
    }

    /// Apply refreshed hashes keyed by root path. Unknown paths are ignored.
    pub fn apply_commit_hashes(&mut self, hashes: Vec<(PathBuf, String)>) {
        for (path, hash) in hashes {
            if let Some(root) = self.roots.iter_mut().find(|r| r.path == path) {
                root.commit_hash = Some(hash);
            }
        }
    }

    /// Workspace metadata as indented JSON for LLM prompts. Empty when no
    /// roots are configured.
    pub fn build_environment_context(&self) -> WorkspaceResult<String> {
        if self.roots.is_empty() {
            return Ok(String::new());
        }

        let mut context = EnvironmentContext::default();
        for root in &self.roots {
            let mut metadata = WorkspaceMetadata {
                hint: root.name.clone(),
                associated_remote_urls: Vec::new(),
                latest_git_commit_hash: None,
            };
            if root.vcs == VcsKind::Git {
                metadata.associated_remote_urls = root.remote_urls.clone();
                metadata.latest_git_commit_hash = root.commit_hash.clone();
            }
            context
                .workspaces
                .insert(root.path.to_string_lossy().into_owned(), metadata);
        }

        Ok(serde_json::to_string_pretty(&context)?)
    }

    /// Human-readable description of the configured roots
    pub fn summary(&self) -> String {
        match self.roots.as_slice() {
            [] => "No workspace roots configured".to_string(),
            [root] => {
                let mut summary = format!("Single workspace: {}", root.name);
                if root.vcs.is_some() {
                    summary.push_str(&format!(" ({})", root.vcs));
                }
                summary
            }
            roots => {
                let primary = &roots[self.primary_index];
                let others: Vec<&str> = roots
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != self.primary_index)
                    .map(|(_, r)| r.name.as_str())
                    .collect();
                format!(
                    "Multi-workspace ({} roots)\nPrimary: {}\nAdditional: {}",
                    roots.len(),
                    primary.name,
                    others.join(", ")
                )
            }
        }
    }

    pub fn to_json(&self) -> WorkspaceResult<String> {
        let state = ManagerState {
            roots: self.roots.clone(),
            primary_index: self.primary_index as i64,
        };
        Ok(serde_json::to_string_pretty(&state)?)
    }

    /// Restore from [`Manager::to_json`] output. The primary index is
    /// clamped the same way as in [`Manager::new`].
    pub fn from_json(json: &str) -> WorkspaceResult<Self> {
        let state: ManagerState = serde_json::from_str(json)?;
        Ok(Self::new(state.roots, state.primary_index))
    }
}

/// Refresh commit hashes on a shared manager.
///
/// Subprocesses run against a snapshot taken under a read lock; results are
/// written back under a short write lock, so slow `git` calls never block
/// readers.
pub async fn refresh_commit_hashes_shared(shared: &SharedWorkspaceManager, detector: &VcsDetector) {
    let git_paths: Vec<PathBuf> = {
        let manager = shared.read().await;
        manager
            .roots
            .iter()
            .filter(|r| r.vcs == VcsKind::Git)
            .map(|r| r.path.clone())
            .collect()
    };

    let mut hashes = Vec::with_capacity(git_paths.len());
    for path in git_paths {
        match detector.commit_hash(&path).await {
            Ok(hash) => hashes.push((path, hash)),
            Err(e) => debug!("Skipping commit refresh for {}: {}", path.display(), e),
        }
    }

    shared.write().await.apply_commit_hashes(hashes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontend_backend() -> Manager {
        Manager::new(
            vec![
                WorkspaceRoot::new("/repo/frontend", "frontend"),
                WorkspaceRoot::new("/repo/backend", "backend"),
            ],
            0,
        )
    }

    #[test]
    fn test_out_of_range_index_behaves_like_zero() {
        for index in [-1, 2, 99, i64::MIN, i64::MAX] {
            let manager = Manager::new(frontend_backend().roots(), index);
            assert_eq!(manager.primary_index(), 0);
            assert_eq!(manager.primary_root().unwrap().name, "frontend");
        }
    }

    #[test]
    fn test_empty_manager() {
        let manager = Manager::new(Vec::new(), 3);
        assert!(manager.is_empty());
        assert!(manager.primary_root().is_none());
        assert!(manager.create_context(None).primary_root.is_none());
        assert_eq!(manager.build_environment_context().unwrap(), "");
        assert_eq!(manager.summary(), "No workspace roots configured");
    }

    #[test]
    fn test_nested_root_wins_regardless_of_order() {
        let parent = WorkspaceRoot::new("/a", "parent");
        let child = WorkspaceRoot::new("/a/b", "child");

        for roots in [
            vec![parent.clone(), child.clone()],
            vec![child.clone(), parent.clone()],
        ] {
            let manager = Manager::new(roots, 0);
            let root = manager.resolve_path_to_root(Path::new("/a/b/c.go")).unwrap();
            assert_eq!(root.path, PathBuf::from("/a/b"));
            let root = manager.resolve_path_to_root(Path::new("/a/x.go")).unwrap();
            assert_eq!(root.name, "parent");
        }
    }

    #[test]
    fn test_resolve_path_to_root_boundaries() {
        let manager = frontend_backend();
        assert_eq!(
            manager
                .resolve_path_to_root(Path::new("/repo/backend"))
                .unwrap()
                .name,
            "backend"
        );
        assert!(manager
            .resolve_path_to_root(Path::new("/repo/backend-old/x"))
            .is_none());
        assert!(!manager.is_path_in_workspace(Path::new("/elsewhere")));
    }

    #[test]
    fn test_returned_roots_are_copies() {
        let manager = frontend_backend();
        let mut root = manager.primary_root().unwrap();
        root.name = "changed".to_string();
        root.commit_hash = Some("deadbeef".to_string());
        assert_eq!(manager.primary_root().unwrap().name, "frontend");
        assert!(manager.primary_root().unwrap().commit_hash.is_none());
    }

    #[test]
    fn test_failed_primary_changes_leave_state() {
        let mut manager = frontend_backend();
        manager.set_primary_index(1).unwrap();

        assert!(matches!(
            manager.set_primary_index(5),
            Err(WorkspaceError::InvalidIndex { index: 5, count: 2 })
        ));
        assert!(manager.set_primary_by_name("missing").is_err());
        assert!(manager.set_primary_by_path(Path::new("/missing")).is_err());
        assert_eq!(manager.primary_index(), 1);
    }

    #[test]
    fn test_switch_workspace_by_name_then_path() {
        let mut manager = frontend_backend();
        let root = manager.switch_workspace("backend").unwrap();
        assert_eq!(root.name, "backend");

        let root = manager.switch_workspace("/repo/frontend").unwrap();
        assert_eq!(root.name, "frontend");

        let err = manager.switch_workspace("nope").unwrap_err();
        assert_eq!(err.to_string(), "workspace not found: nope");
        assert_eq!(manager.primary_index(), 0);
    }

    #[test]
    fn test_relative_path_from_root() {
        let manager = frontend_backend();
        assert_eq!(
            manager.relative_path_from_root(Path::new("/repo/backend/src/main.go"), None),
            PathBuf::from("src/main.go")
        );
        assert_eq!(
            manager.relative_path_from_root(Path::new("/tmp/x"), None),
            PathBuf::from("/tmp/x")
        );
        let frontend = manager.root_by_name("frontend").unwrap();
        assert_eq!(
            manager.relative_path_from_root(Path::new("/repo/backend/a"), Some(&frontend)),
            PathBuf::from("../backend/a")
        );
    }

    #[test]
    fn test_single_root() {
        let manager = Manager::new(vec![WorkspaceRoot::new("/only", "only")], 0);
        assert!(manager.is_single_root());
        assert_eq!(manager.single_root().unwrap().name, "only");

        let err = frontend_backend().single_root().unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidState(_)));
    }

    #[test]
    fn test_create_context_defaults_current_to_primary() {
        let manager = frontend_backend();
        let ctx = manager.create_context(None);
        assert_eq!(ctx.current_root, ctx.primary_root);

        let backend = manager.root_by_name("backend");
        let ctx = manager.create_context(backend.clone());
        assert_eq!(ctx.current_root, backend);
        assert_eq!(ctx.roots.len(), 2);
    }

    #[test]
    fn test_environment_context_only_reports_git_metadata() {
        let mut git = WorkspaceRoot::new("/repo/frontend", "frontend").with_vcs(VcsKind::Git);
        git.commit_hash = Some("abc123".to_string());
        git.remote_urls = vec!["git@example.com:org/fe.git".to_string()];

        let mut plain = WorkspaceRoot::new("/repo/backend", "backend");
        plain.commit_hash = Some("ignored".to_string());

        let manager = Manager::new(vec![git, plain], 0);
        let json = manager.build_environment_context().unwrap();
        let parsed: EnvironmentContext = serde_json::from_str(&json).unwrap();

        let fe = &parsed.workspaces["/repo/frontend"];
        assert_eq!(fe.hint, "frontend");
        assert_eq!(fe.latest_git_commit_hash.as_deref(), Some("abc123"));
        assert_eq!(fe.associated_remote_urls.len(), 1);

        let be = &parsed.workspaces["/repo/backend"];
        assert!(be.latest_git_commit_hash.is_none());
        assert!(!json.contains("ignored"));
        assert!(json.contains("\"latestGitCommitHash\""));
    }

    #[test]
    fn test_summary() {
        let single = Manager::new(
            vec![WorkspaceRoot::new("/repo", "repo").with_vcs(VcsKind::Git)],
            0,
        );
        assert_eq!(single.summary(), "Single workspace: repo (git)");

        let plain = Manager::new(vec![WorkspaceRoot::new("/repo", "repo")], 0);
        assert_eq!(plain.summary(), "Single workspace: repo");

        let mut multi = Manager::new(
            vec![
                WorkspaceRoot::new("/a", "a"),
                WorkspaceRoot::new("/b", "b"),
                WorkspaceRoot::new("/c", "c"),
            ],
            1,
        );
        assert_eq!(
            multi.summary(),
            "Multi-workspace (3 roots)\nPrimary: b\nAdditional: a, c"
        );
        multi.set_primary_index(2).unwrap();
        assert!(multi.summary().ends_with("Additional: a, b"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut fe = WorkspaceRoot::new("/repo/frontend", "frontend").with_vcs(VcsKind::Git);
        fe.commit_hash = Some("abc".to_string());
        fe.remote_urls = vec!["https://example.com/fe.git".to_string()];
        let manager = Manager::new(vec![fe, WorkspaceRoot::new("/repo/backend", "backend")], 1);

        let json = manager.to_json().unwrap();
        assert!(json.contains("\"primaryIndex\": 1"));
        assert!(json.contains("\"remoteUrls\""));

        let restored = Manager::from_json(&json).unwrap();
        assert_eq!(restored, manager);
    }

    #[test]
    fn test_from_json_clamps_stale_index() {
        let json = r#"{"roots":[{"path":"/x","name":"x","vcs":"none"}],"primaryIndex":7}"#;
        let manager = Manager::from_json(json).unwrap();
        assert_eq!(manager.primary_index(), 0);

        let json = r#"{"roots":[],"primaryIndex":-3}"#;
        assert!(Manager::from_json(json).unwrap().is_empty());
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = Manager::from_json("{not json").unwrap_err();
        assert!(matches!(err, WorkspaceError::Serialization(_)));
    }

    #[test]
    fn test_apply_commit_hashes_ignores_unknown_paths() {
        let mut manager = frontend_backend();
        manager.apply_commit_hashes(vec![
            (PathBuf::from("/repo/backend"), "fff".to_string()),
            (PathBuf::from("/nowhere"), "000".to_string()),
        ]);
        assert_eq!(
            manager.root_by_name("backend").unwrap().commit_hash.as_deref(),
            Some("fff")
        );
        assert!(manager.root_by_name("frontend").unwrap().commit_hash.is_none());
    }

    #[tokio::test]
    async fn test_update_commit_hashes_never_fails() {
        let mut manager = Manager::new(
            vec![WorkspaceRoot::new("/nonexistent/wsroots", "ghost").with_vcs(VcsKind::Git)],
            0,
        );
        manager.update_commit_hashes(&VcsDetector::default()).await;
        assert!(manager.primary_root().unwrap().commit_hash.is_none());
    }
}
