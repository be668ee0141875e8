//! Path resolution and containment checks against the data root.
//!
//! Every id a client sends is resolved here before any filesystem call:
//! `.` and `..` are folded lexically, the deepest existing ancestor is
//! canonicalized (following symlinks), and the result must lie at or below
//! the canonical data root by path components, never by string prefix.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{Result, TreeError};
use crate::node::NodeKind;

/// Resolve `raw` against the canonical `root` and require containment.
///
/// Relative ids are taken relative to the root. The target does not need to
/// exist; a path outside the root is rejected either way.
pub async fn resolve_within(root: &Path, raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(TreeError::InvalidPath);
    }

    let candidate = Path::new(raw);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let resolved = canonicalize_lenient(&normalize_lexically(&joined))
        .await
        .map_err(|e| {
            tracing::debug!(path = raw, error = %e, "Path could not be resolved");
            TreeError::InvalidPath
        })?;

    if !is_contained(root, &resolved) {
        tracing::debug!(path = raw, resolved = %resolved.display(), "Path escapes data root");
        return Err(TreeError::InvalidPath);
    }

    Ok(resolved)
}

/// True if `path` is `root` or a descendant of it, compared by components.
///
/// `/data/notes-old` is not inside `/data/notes`.
pub fn is_contained(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

/// Validate a single new entry name.
///
/// Returns the trimmed name. Empty names, `.`/`..` and anything carrying a
/// path separator are rejected so one call creates exactly one level.
pub fn validate_entry_name(name: &str, kind: NodeKind) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(TreeError::InvalidName(kind));
    }
    Ok(trimmed)
}

/// Fold `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor and re-append the rest.
async fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match fs::canonicalize(&existing).await {
            Ok(mut resolved) => {
                for name in missing.iter().rev() {
                    resolved.push(name);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // A dangling symlink is present but unresolvable; writing
                // through it would land wherever it points.
                if fs::symlink_metadata(&existing).await.is_ok() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "dangling symlink",
                    ));
                }
                let Some(name) = existing.file_name().map(|n| n.to_os_string()) else {
                    return Err(e);
                };
                missing.push(name);
                if !existing.pop() {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn canonical_root() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).await.unwrap();
        (temp_dir, root)
    }

    #[test]
    fn normalize_folds_parent_components() {
        assert_eq!(
            normalize_lexically(Path::new("/data/a/../b/./c")),
            PathBuf::from("/data/b/c")
        );
        assert_eq!(normalize_lexically(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn containment_is_component_based() {
        let root = Path::new("/srv/notes");
        assert!(is_contained(root, Path::new("/srv/notes")));
        assert!(is_contained(root, Path::new("/srv/notes/a/b")));
        assert!(!is_contained(root, Path::new("/srv/notes-old")));
        assert!(!is_contained(root, Path::new("/srv")));
    }

    #[test]
    fn entry_names_are_single_level() {
        assert_eq!(validate_entry_name("  Ideas ", NodeKind::Folder).unwrap(), "Ideas");
        for bad in ["", "   ", ".", "..", "a/b", "a\\b", "/abs"] {
            assert!(
                matches!(
                    validate_entry_name(bad, NodeKind::File),
                    Err(TreeError::InvalidName(NodeKind::File))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn resolves_relative_ids_against_root() {
        let (_temp_dir, root) = canonical_root().await;
        fs::create_dir(root.join("journal")).await.unwrap();

        let resolved = resolve_within(&root, "journal").await.unwrap();
        assert_eq!(resolved, root.join("journal"));
    }

    #[tokio::test]
    async fn resolves_missing_paths_inside_root() {
        let (_temp_dir, root) = canonical_root().await;

        let raw = root.join("not-yet/created.json");
        let resolved = resolve_within(&root, raw.to_str().unwrap()).await.unwrap();
        assert_eq!(resolved, root.join("not-yet/created.json"));
    }

    #[tokio::test]
    async fn rejects_traversal_out_of_root() {
        let (_temp_dir, root) = canonical_root().await;

        let raw = format!("{}/../outside", root.display());
        assert!(matches!(
            resolve_within(&root, &raw).await,
            Err(TreeError::InvalidPath)
        ));
        assert!(matches!(
            resolve_within(&root, "../../etc").await,
            Err(TreeError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn rejects_sibling_sharing_name_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let base = fs::canonicalize(temp_dir.path()).await.unwrap();
        let root = base.join("notes");
        let sibling = base.join("notes-archive");
        fs::create_dir(&root).await.unwrap();
        fs::create_dir(&sibling).await.unwrap();

        assert!(matches!(
            resolve_within(&root, sibling.to_str().unwrap()).await,
            Err(TreeError::InvalidPath)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejects_symlink_escaping_root() {
        let temp_dir = TempDir::new().unwrap();
        let base = fs::canonicalize(temp_dir.path()).await.unwrap();
        let root = base.join("notes");
        let outside = base.join("outside");
        fs::create_dir(&root).await.unwrap();
        fs::create_dir(&outside).await.unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        assert!(matches!(
            resolve_within(&root, "link/secret.json").await,
            Err(TreeError::InvalidPath)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejects_dangling_symlink_pointing_outside_root() {
        let temp_dir = TempDir::new().unwrap();
        let base = fs::canonicalize(temp_dir.path()).await.unwrap();
        let root = base.join("notes");
        fs::create_dir(&root).await.unwrap();
        std::os::unix::fs::symlink(base.join("pwned.json"), root.join("link.json")).unwrap();

        assert!(matches!(
            resolve_within(&root, "link.json").await,
            Err(TreeError::InvalidPath)
        ));
        assert!(matches!(
            resolve_within(&root, "link.json/child").await,
            Err(TreeError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn rejects_empty_ids() {
        let (_temp_dir, root) = canonical_root().await;
        assert!(matches!(
            resolve_within(&root, "  ").await,
            Err(TreeError::InvalidPath)
        ));
    }
}
