//! Lexical path helpers.
//!
//! Everything here works on path text only; none of these functions touch
//! the filesystem except `absolutize`, which reads the process cwd.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically clean a path: drop `.` segments, fold `..` into its parent and
/// collapse repeated separators. `..` above the filesystem root is discarded;
/// leading `..` of a relative path is kept. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against the current working directory and normalize it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize(&cwd.join(path)))
}

/// Join `relative` onto `base` and normalize the result.
pub fn join_clean(base: &Path, relative: &Path) -> PathBuf {
    normalize(&base.join(relative))
}

/// Compute `target` relative to `base`, emitting `..` segments where the
/// target lies outside the base.
///
/// Returns `None` when the two paths cannot be related lexically: one is
/// absolute and the other is not, they sit on different prefixes, or the
/// base itself climbs out with `..`.
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = normalize(base);
    let target = normalize(target);

    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let base_parts: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target_parts: Vec<Component<'_>> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for part in &base_parts[common..] {
        match part {
            Component::Normal(_) => out.push(".."),
            _ => return None,
        }
    }
    for part in &target_parts[common..] {
        match part {
            Component::Prefix(_) | Component::RootDir => return None,
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}

/// True when `path` equals `root` or lies under it at a separator boundary.
///
/// `/repo/app` is within `/repo` but `/repository` is not.
pub fn is_within(path: &Path, root: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b//c/")), PathBuf::from("/a/b/c"));
        assert_eq!(normalize(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_join_clean() {
        assert_eq!(
            join_clean(Path::new("/repo/frontend"), Path::new("./src/../app.ts")),
            PathBuf::from("/repo/frontend/app.ts")
        );
        assert_eq!(
            join_clean(Path::new("/repo/frontend"), Path::new("../backend/main.go")),
            PathBuf::from("/repo/backend/main.go")
        );
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/repo"), Path::new("/repo/src/main.rs")),
            Some(PathBuf::from("src/main.rs"))
        );
        assert_eq!(
            relative_to(Path::new("/repo"), Path::new("/repo")),
            Some(PathBuf::from("."))
        );
        assert_eq!(
            relative_to(Path::new("/repo/frontend"), Path::new("/repo/backend/x")),
            Some(PathBuf::from("../backend/x"))
        );
        assert_eq!(relative_to(Path::new("/repo"), Path::new("src")), None);
    }

    #[test]
    fn test_is_within_respects_separator_boundary() {
        assert!(is_within(Path::new("/repo/app"), Path::new("/repo")));
        assert!(is_within(Path::new("/repo"), Path::new("/repo/")));
        assert!(!is_within(Path::new("/repository/x"), Path::new("/repo")));
        assert!(!is_within(Path::new("/other"), Path::new("/repo")));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(expand_home("rel/~x"), PathBuf::from("rel/~x"));
    }
}
