//! Workspace discovery.
//!
//! Walks a directory tree to a bounded depth looking for project markers
//! (VCS directories, language manifests, build files). Every directory that
//! holds a marker becomes a candidate workspace root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use super::config::{self, Preferences};
use super::manager::Manager;
use super::paths;
use super::types::WorkspaceRoot;
use super::vcs::VcsDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Vcs,
    Language,
    Build,
}

/// A file or directory whose presence marks a project root.
///
/// Names of the form `*.ext` match any file with that extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMarker {
    pub name: String,
    pub is_directory: bool,
    pub priority: u32,
    pub kind: MarkerKind,
}

impl WorkspaceMarker {
    pub fn new(name: impl Into<String>, is_directory: bool, priority: u32, kind: MarkerKind) -> Self {
        Self {
            name: name.into(),
            is_directory,
            priority,
            kind,
        }
    }

    pub fn matches(&self, entry_name: &str, entry_is_dir: bool) -> bool {
        if self.is_directory != entry_is_dir {
            return false;
        }
        match self.name.strip_prefix('*') {
            Some(suffix) if !self.is_directory => {
                entry_name.len() > suffix.len() && entry_name.ends_with(suffix)
            }
            _ => entry_name == self.name,
        }
    }
}

const DEFAULT_MARKERS: &[(&str, bool, u32, MarkerKind)] = &[
    (".git", true, 100, MarkerKind::Vcs),
    (".hg", true, 100, MarkerKind::Vcs),
    ("go.mod", false, 90, MarkerKind::Language),
    ("package.json", false, 85, MarkerKind::Language),
    ("Cargo.toml", false, 85, MarkerKind::Language),
    ("setup.py", false, 80, MarkerKind::Language),
    ("pyproject.toml", false, 80, MarkerKind::Language),
    ("Pipfile", false, 80, MarkerKind::Language),
    ("pom.xml", false, 80, MarkerKind::Language),
    ("build.gradle", false, 80, MarkerKind::Language),
    ("build.gradle.kts", false, 80, MarkerKind::Language),
    ("*.csproj", false, 80, MarkerKind::Language),
    ("*.sln", false, 80, MarkerKind::Language),
    ("Gemfile", false, 75, MarkerKind::Language),
    ("composer.json", false, 75, MarkerKind::Language),
    ("Makefile", false, 70, MarkerKind::Build),
    ("CMakeLists.txt", false, 70, MarkerKind::Build),
];

/// Built-in markers, highest priority first
pub fn default_markers() -> Vec<WorkspaceMarker> {
    DEFAULT_MARKERS
        .iter()
        .map(|(name, is_dir, priority, kind)| WorkspaceMarker::new(*name, *is_dir, *priority, *kind))
        .collect()
}

/// Directory names never descended into
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    "dist",
    ".git",
    ".hg",
    ".svn",
];

#[derive(Debug, Clone)]
pub struct DetectionOptions {
    pub max_depth: usize,
    pub max_workspaces: usize,
    pub include_hidden: bool,
    /// Order VCS roots before the rest
    pub prefer_vcs_roots: bool,
    pub custom_markers: Vec<WorkspaceMarker>,
    pub exclude_paths: Vec<String>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_workspaces: 10,
            include_hidden: false,
            prefer_vcs_roots: true,
            custom_markers: Vec::new(),
            exclude_paths: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    priority: u32,
    markers: Vec<String>,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Markers present directly inside `dir`, with their highest priority.
fn scan_markers(
    dir: &Path,
    markers: &[WorkspaceMarker],
    include_hidden: bool,
) -> Option<Candidate> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut found = Vec::new();
    let mut priority = 0;

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !include_hidden && is_hidden(&name) && name != ".git" && name != ".hg" {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        for marker in markers.iter().filter(|m| m.matches(&name, is_dir)) {
            found.push(marker.name.clone());
            priority = priority.max(marker.priority);
        }
    }

    if found.is_empty() {
        None
    } else {
        Some(Candidate {
            priority,
            markers: found,
        })
    }
}

/// Walk `root` and collect candidate directories keyed by path.
///
/// The walk is bounded by depth only; the workspace cap is applied after
/// ranking.
fn find_candidates(root: &Path, options: &DetectionOptions) -> BTreeMap<PathBuf, Candidate> {
    let mut markers = default_markers();
    markers.extend(options.custom_markers.iter().cloned());

    let excludes = options.exclude_paths.clone();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .follow_links(false)
        .max_depth(Some(options.max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            !excludes.iter().any(|e| *e == name)
        });

    let mut candidates = BTreeMap::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let dir = entry.path();
        if let Some(candidate) = scan_markers(dir, &markers, options.include_hidden) {
            debug!("Candidate {} ({})", dir.display(), candidate.markers.join(", "));
            candidates.insert(dir.to_path_buf(), candidate);
        }
    }

    candidates
}

/// Discover workspace roots under `root_path`.
///
/// Each candidate is probed for VCS metadata. With `prefer_vcs_roots` the
/// result lists VCS roots first, then by name; otherwise by marker priority,
/// then by path.
pub async fn detect_workspaces(
    root_path: &Path,
    options: &DetectionOptions,
    detector: &VcsDetector,
) -> Result<Vec<WorkspaceRoot>> {
    let root = paths::absolutize(root_path)
        .with_context(|| format!("Failed to resolve {}", root_path.display()))?;

    let meta = std::fs::metadata(&root)
        .with_context(|| format!("Failed to stat root path {}", root.display()))?;
    if !meta.is_dir() {
        bail!("Root path is not a directory: {}", root.display());
    }

    let walk_root = root.clone();
    let walk_options = options.clone();
    let candidates = tokio::task::spawn_blocking(move || find_candidates(&walk_root, &walk_options))
        .await
        .context("Workspace detection task failed")?;

    let mut ranked: Vec<(PathBuf, Candidate)> = candidates.into_iter().collect();
    ranked.sort_by(|(pa, a), (pb, b)| b.priority.cmp(&a.priority).then_with(|| pa.cmp(pb)));
    ranked.truncate(options.max_workspaces);

    let mut roots = Vec::with_capacity(ranked.len());
    for (path, _) in ranked {
        roots.push(WorkspaceRoot::probe(&path, None, detector).await);
    }

    if options.prefer_vcs_roots {
        roots.sort_by(|a, b| {
            b.vcs
                .is_some()
                .cmp(&a.vcs.is_some())
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    info!("Detected {} workspace(s) under {}", roots.len(), root.display());
    Ok(roots)
}

/// Detection driven by config preferences. Empty when auto-detect is off.
pub async fn detect_workspaces_from_preferences(
    root_path: &Path,
    prefs: &Preferences,
    detector: &VcsDetector,
) -> Result<Vec<WorkspaceRoot>> {
    if !prefs.auto_detect_workspaces {
        return Ok(Vec::new());
    }

    let options = DetectionOptions {
        max_workspaces: prefs.max_workspaces,
        prefer_vcs_roots: prefs.prefer_vcs_roots,
        include_hidden: prefs.include_hidden,
        ..DetectionOptions::default()
    };
    detect_workspaces(root_path, &options, detector).await
}

/// Build a manager for `root_path`.
///
/// Tries the config file first, then detection (saving what was found),
/// then falls back to a single-directory workspace. Never fails.
pub async fn smart_initialization(root_path: &Path, detector: &VcsDetector) -> Manager {
    let root = paths::absolutize(root_path).unwrap_or_else(|_| paths::normalize(root_path));

    match config::load_manager_from_directory(&root) {
        Ok(Some((manager, _))) => {
            info!("Loaded workspace config from {}", root.display());
            return manager;
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable workspace config: {:#}", e),
    }

    match detect_workspaces(&root, &DetectionOptions::default(), detector).await {
        Ok(roots) if !roots.is_empty() => {
            let primary = roots.iter().position(|r| r.path == root).unwrap_or(0);
            let manager = Manager::new(roots, primary as i64);

            if let Err(e) = config::save_manager_to_directory(&root, &manager, None) {
                warn!("Failed to save workspace config: {:#}", e);
            }
            manager
        }
        Ok(_) => Manager::from_single_directory_with(&root, detector).await,
        Err(e) => {
            warn!("Workspace detection failed: {:#}", e);
            Manager::from_single_directory_with(&root, detector).await
        }
    }
}

/// Manifest files that identify a project root
pub const PROJECT_MANIFESTS: &[&str] = &[
    "Cargo.toml",
    "go.mod",
    "package.json",
    "pyproject.toml",
];

fn has_manifest(dir: &Path) -> bool {
    PROJECT_MANIFESTS.iter().any(|m| dir.join(m).is_file())
}

/// Locate the project root for `start`.
///
/// Checks `start`, then its immediate subdirectories (sorted by name), then
/// its ancestors. Falls back to `start` when no manifest is found.
pub fn find_project_root(start: &Path) -> PathBuf {
    if has_manifest(start) {
        return start.to_path_buf();
    }

    if let Ok(entries) = std::fs::read_dir(start) {
        let mut subdirs: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        subdirs.sort();
        if let Some(dir) = subdirs.into_iter().find(|d| has_manifest(d)) {
            return dir;
        }
    }

    start
        .ancestors()
        .skip(1)
        .find(|dir| has_manifest(dir))
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf())
}
