//! Path-traversal defense shared by every archive format

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, UpdateError};

/// Join an archive entry name onto `root`, refusing anything that escapes it
///
/// The entry is resolved lexically: `.` is dropped, `..` pops one component,
/// leading separators and drive prefixes are ignored. The result must lie
/// strictly below the cleaned root; the root itself does not count.
pub fn safe_join(root: &Path, entry: &str) -> Result<PathBuf> {
    let root = clean_root(root)?;
    let mut joined = root.clone();

    for component in Path::new(entry).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if !joined.pop() {
                    return Err(UpdateError::path_traversal(entry, &root));
                }
            }
            Component::Normal(part) => joined.push(part),
        }
    }

    if joined == root || !joined.starts_with(&root) {
        return Err(UpdateError::path_traversal(entry, &root));
    }

    Ok(joined)
}

/// True when `entry` names nothing beyond the root itself (e.g. "./")
pub(crate) fn is_root_entry(entry: &str) -> bool {
    Path::new(entry)
        .components()
        .all(|c| matches!(c, Component::CurDir | Component::RootDir))
}

/// Refuse `path` when an existing component between `root` and `path` is a symlink
///
/// `path` must come from [`safe_join`] on the same root. A symlink left on disk
/// by an earlier install would otherwise redirect the write outside the root.
pub(crate) fn ensure_no_symlinks(root: &Path, path: &Path, entry: &str) -> Result<()> {
    let root = clean_root(root)?;
    let relative = path
        .strip_prefix(&root)
        .map_err(|_| UpdateError::path_traversal(entry, &root))?;

    let mut current = root.clone();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(UpdateError::path_traversal(entry, &root));
            }
            Ok(_) => {}
            // Nothing deeper can exist yet
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(UpdateError::io(
                    format!("Failed to inspect {}", current.display()),
                    e,
                ))
            }
        }
    }

    Ok(())
}

fn clean_root(root: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(root).map_err(|e| {
        UpdateError::io(
            format!("Failed to resolve extraction root {}", root.display()),
            e,
        )
    })?;

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        std::env::temp_dir().join("molt-safe-join")
    }

    #[test]
    fn test_plain_entries_stay_under_root() {
        let root = root();
        assert_eq!(safe_join(&root, "bin/tool").unwrap(), root.join("bin/tool"));
        assert_eq!(safe_join(&root, "./README").unwrap(), root.join("README"));
        assert_eq!(safe_join(&root, "a/../b").unwrap(), root.join("b"));
    }

    #[test]
    fn test_parent_escape_rejected() {
        let root = root();
        for entry in ["../../../etc/passwd", "..", "a/../../b", "../molt-safe-join-evil/x"] {
            let err = safe_join(&root, entry).unwrap_err();
            assert!(err.is_security(), "expected traversal error for {}", entry);
        }
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        let root = root();
        let err = safe_join(&root, "../molt-safe-joinx/file").unwrap_err();
        assert!(matches!(err, UpdateError::PathTraversal { .. }));
    }

    #[test]
    fn test_root_itself_rejected() {
        let root = root();
        assert!(safe_join(&root, ".").is_err());
        assert!(safe_join(&root, "a/..").is_err());
    }

    #[test]
    fn test_leading_separator_is_relative() {
        let root = root();
        assert_eq!(safe_join(&root, "/etc/passwd").unwrap(), root.join("etc/passwd"));
    }

    #[test]
    fn test_root_is_cleaned() {
        let base = root();
        let messy = base.join("sub").join("..").join(".");
        assert_eq!(safe_join(&messy, "x").unwrap(), base.join("x"));
    }

    #[test]
    fn test_is_root_entry() {
        assert!(is_root_entry("./"));
        assert!(is_root_entry("."));
        assert!(!is_root_entry("./bin/"));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_symlink_component_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("root");
        let outside = temp.path().join("outside");
        fs::create_dir_all(root.join("share")).unwrap();
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("bin")).unwrap();

        let linked = safe_join(&root, "bin/tool").unwrap();
        let err = ensure_no_symlinks(&root, &linked, "bin/tool").unwrap_err();
        assert!(err.is_security());

        let plain = safe_join(&root, "share/doc/README").unwrap();
        ensure_no_symlinks(&root, &plain, "share/doc/README").unwrap();
    }
}
