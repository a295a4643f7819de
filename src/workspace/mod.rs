//! Multi-root workspace management.
//!
//! This module keeps a registry of project directories, resolves user and
//! tool supplied paths to a concrete root, and attaches best-effort version
//! control metadata to each root:
//! - `Manager`: ordered roots plus the primary selection
//! - `Resolver`: hint parsing and disambiguation over a manager
//! - `VcsDetector`: Git/Mercurial probing with bounded subprocesses
//! - `config` / `detection`: `.workspace.json` persistence and discovery

pub mod config;
pub mod detection;
mod error;
mod manager;
pub mod paths;
mod resolver;
mod types;
mod vcs;

// Re-exports
pub use detection::{detect_workspaces, find_project_root, smart_initialization, DetectionOptions};
pub use error::{WorkspaceError, WorkspaceResult};
pub use manager::{refresh_commit_hashes_shared, Manager};
pub use resolver::{format_path_with_hint, parse_workspace_hint, Resolver};
pub use types::{
    create_shared_workspace_manager, EnvironmentContext, ResolvedPath, SharedWorkspaceManager,
    VcsKind, WorkspaceContext, WorkspaceMetadata, WorkspaceRoot,
};
pub use vcs::{parse_remote_urls, VcsDetector, VcsError, DEFAULT_VCS_TIMEOUT};
