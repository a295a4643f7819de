//! Path resolution across workspace roots.
//!
//! Workspace hints use the syntax `@workspaceName:relative/path`.
//!
//! The resolver borrows a [`Manager`] and holds no state of its own. It only
//! fails on configuration problems (no roots, unknown hint). Paths that do
//! not exist on disk are still resolved, so callers can address files they
//! are about to create.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{WorkspaceError, WorkspaceResult};
use super::manager::Manager;
use super::paths;
use super::types::{ResolvedPath, WorkspaceRoot};

/// Split `@name:path` into the hint and the path.
///
/// Input that does not start with `@`, or has no `:` after it, is returned
/// whole as an ordinary path with no hint.
pub fn parse_workspace_hint(input: &str) -> (Option<&str>, &str) {
    let Some(rest) = input.strip_prefix('@') else {
        return (None, input);
    };
    match rest.split_once(':') {
        Some((hint, path)) => (Some(hint), path),
        None => (None, input),
    }
}

/// Inverse of [`parse_workspace_hint`]
pub fn format_path_with_hint(workspace_name: &str, path: &str) -> String {
    format!("@{}:{}", workspace_name, path)
}

pub struct Resolver<'a> {
    manager: &'a Manager,
}

impl<'a> Resolver<'a> {
    pub fn new(manager: &'a Manager) -> Self {
        Self { manager }
    }

    fn primary(&self) -> WorkspaceResult<WorkspaceRoot> {
        self.manager.primary_root().ok_or(WorkspaceError::NoRoots)
    }

    /// Resolve `path`, optionally against the root named by `hint`.
    ///
    /// Without a hint, absolute paths map to their containing root (or the
    /// primary root when outside every root) and relative paths are anchored
    /// to the primary root.
    pub fn resolve_path(
        &self,
        path: impl AsRef<Path>,
        hint: Option<&str>,
    ) -> WorkspaceResult<ResolvedPath> {
        let path = path.as_ref();

        if let Some(hint) = hint {
            return self.resolve_with_hint(path, hint);
        }

        if path.is_absolute() {
            let root = match self.manager.resolve_path_to_root(path) {
                Some(root) => root,
                None => {
                    debug!(
                        "{} is outside every workspace, using primary",
                        path.display()
                    );
                    self.primary()?
                }
            };
            return Ok(self.anchor_absolute(path, root));
        }

        Ok(anchor_relative(path, self.primary()?))
    }

    fn resolve_with_hint(&self, path: &Path, hint: &str) -> WorkspaceResult<ResolvedPath> {
        let root = self
            .manager
            .root_by_name(hint)
            .ok_or_else(|| WorkspaceError::NotFound(hint.to_string()))?;

        if path.is_absolute() {
            return Ok(self.anchor_absolute(path, root));
        }
        Ok(anchor_relative(path, root))
    }

    fn anchor_absolute(&self, path: &Path, root: WorkspaceRoot) -> ResolvedPath {
        let absolute_path = paths::normalize(path);
        let relative_path = self
            .manager
            .relative_path_from_root(&absolute_path, Some(&root));
        ResolvedPath {
            absolute_path,
            root,
            relative_path,
        }
    }

    /// Resolve a string that may carry a `@name:` hint.
    pub fn resolve_path_string(&self, path_with_hint: &str) -> WorkspaceResult<ResolvedPath> {
        let (hint, path) = parse_workspace_hint(path_with_hint);
        self.resolve_path(path, hint)
    }

    /// Name of the workspace containing `path`. Relative paths are anchored
    /// to the primary root first.
    pub fn workspace_for_path(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            paths::join_clean(&self.manager.primary_root()?.path, path)
        };
        self.manager
            .resolve_path_to_root(&absolute)
            .map(|root| root.name)
    }

    /// Roots under which `relative_path` exists, in registration order.
    fn roots_containing(&self, relative_path: &Path) -> Vec<(usize, WorkspaceRoot)> {
        self.manager
            .roots()
            .into_iter()
            .enumerate()
            .filter(|(_, root)| paths::join_clean(&root.path, relative_path).exists())
            .collect()
    }

    /// Names of the roots under which `relative_path` exists, in
    /// registration order.
    pub fn disambiguate_path(&self, relative_path: impl AsRef<Path>) -> Vec<String> {
        self.roots_containing(relative_path.as_ref())
            .into_iter()
            .map(|(_, root)| root.name)
            .collect()
    }

    /// Resolve a path by probing every root for it.
    ///
    /// - absolute input skips probing entirely
    /// - no match falls back to the primary root
    /// - several matches prefer the primary root, then registration order
    pub fn resolve_path_with_disambiguation(
        &self,
        path: impl AsRef<Path>,
    ) -> WorkspaceResult<ResolvedPath> {
        let path = path.as_ref();
        if path.is_absolute() {
            return self.resolve_path(path, None);
        }

        let mut matches = self.roots_containing(path);
        let primary_index = self.manager.primary_index();

        let root = match matches.len() {
            0 => self.primary()?,
            1 => matches.remove(0).1,
            n => {
                debug!("{} exists in {} workspaces", path.display(), n);
                match matches.iter().position(|(i, _)| *i == primary_index) {
                    Some(pos) => matches.swap_remove(pos).1,
                    None => matches.remove(0).1,
                }
            }
        };

        Ok(anchor_relative(path, root))
    }

    /// Whether `path` exists after disambiguation.
    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.resolve_path_with_disambiguation(path)
            .map(|resolved| resolved.absolute_path.exists())
            .unwrap_or(false)
    }
}

fn anchor_relative(path: &Path, root: WorkspaceRoot) -> ResolvedPath {
    ResolvedPath {
        absolute_path: paths::join_clean(&root.path, path),
        relative_path: PathBuf::from(path),
        root,
    }
}
