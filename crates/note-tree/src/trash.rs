//! Soft delete: relocating entries into the reserved `Trash` folder.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs;

use crate::error::{Result, TreeError};
use crate::path::is_contained;

/// Name of the reserved folder directly under the data root.
pub const TRASH_DIR: &str = "Trash";

/// Move `target` into `<root>/Trash` with a single rename.
///
/// `root` must already be canonical and `target` already resolved. The Trash
/// folder is never created here; a missing Trash is a server error.
pub async fn move_into_trash(root: &Path, target: &Path) -> Result<PathBuf> {
    let trash = root.join(TRASH_DIR);
    match fs::metadata(&trash).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            tracing::error!(trash = %trash.display(), "Trash folder is missing");
            return Err(TreeError::TrashMissing);
        }
    }

    if !is_contained(root, target) || target == root || target.starts_with(&trash) {
        return Err(TreeError::InvalidPath);
    }
    let Some(name) = target.file_name() else {
        return Err(TreeError::InvalidPath);
    };

    let destination = free_destination(&trash, name, Local::now()).await;
    fs::rename(target, &destination).await.map_err(|e| {
        tracing::error!(
            from = %target.display(),
            to = %destination.display(),
            error = %e,
            "Failed to move item to Trash"
        );
        TreeError::Internal(e)
    })?;

    tracing::info!(
        from = %target.display(),
        to = %destination.display(),
        "Moved item to Trash"
    );
    Ok(destination)
}

/// Pick an unoccupied name inside `trash` for an entry called `name`.
///
/// Tries `name`, then `<stem>_<YYYYMMDDHHMMSS><suffix>`, then appends `_<n>`
/// to the timestamped stem until a free slot is found.
async fn free_destination(trash: &Path, name: &OsStr, now: DateTime<Local>) -> PathBuf {
    let plain = trash.join(name);
    if !occupied(&plain).await {
        return plain;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = as_path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let stamped = format!("{}_{}", stem, now.format("%Y%m%d%H%M%S"));

    let candidate = trash.join(format!("{stamped}{suffix}"));
    if !occupied(&candidate).await {
        return candidate;
    }

    let mut counter = 1u32;
    loop {
        let candidate = trash.join(format!("{stamped}_{counter}{suffix}"));
        if !occupied(&candidate).await {
            return candidate;
        }
        counter += 1;
    }
}

async fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn root_with_trash() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).await.unwrap();
        fs::create_dir(root.join(TRASH_DIR)).await.unwrap();
        (temp_dir, root)
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[tokio::test]
    async fn uses_plain_name_when_free() {
        let (_temp_dir, root) = root_with_trash().await;
        let trash = root.join(TRASH_DIR);

        let dest = free_destination(&trash, OsStr::new("todo.json"), fixed_time()).await;
        assert_eq!(dest, trash.join("todo.json"));
    }

    #[tokio::test]
    async fn stamps_colliding_names_before_the_suffix() {
        let (_temp_dir, root) = root_with_trash().await;
        let trash = root.join(TRASH_DIR);
        fs::write(trash.join("todo.json"), "").await.unwrap();

        let dest = free_destination(&trash, OsStr::new("todo.json"), fixed_time()).await;
        assert_eq!(dest, trash.join("todo_20240309140507.json"));
    }

    #[tokio::test]
    async fn counts_up_when_stamp_also_collides() {
        let (_temp_dir, root) = root_with_trash().await;
        let trash = root.join(TRASH_DIR);
        fs::create_dir(trash.join("Ideas")).await.unwrap();
        fs::create_dir(trash.join("Ideas_20240309140507")).await.unwrap();
        fs::create_dir(trash.join("Ideas_20240309140507_1")).await.unwrap();

        let dest = free_destination(&trash, OsStr::new("Ideas"), fixed_time()).await;
        assert_eq!(dest, trash.join("Ideas_20240309140507_2"));
    }

    #[tokio::test]
    async fn moves_entry_into_trash() {
        let (_temp_dir, root) = root_with_trash().await;
        let target = root.join("draft.json");
        fs::write(&target, "{}").await.unwrap();

        let moved = move_into_trash(&root, &target).await.unwrap();

        assert_eq!(moved, root.join(TRASH_DIR).join("draft.json"));
        assert!(!target.exists());
        assert_eq!(fs::read_to_string(&moved).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn missing_trash_is_not_created() {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).await.unwrap();
        let target = root.join("draft.json");
        fs::write(&target, "").await.unwrap();

        let result = move_into_trash(&root, &target).await;

        assert!(matches!(result, Err(TreeError::TrashMissing)));
        assert!(!root.join(TRASH_DIR).exists());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn refuses_root_and_trash_itself() {
        let (_temp_dir, root) = root_with_trash().await;
        let trash = root.join(TRASH_DIR);

        assert!(matches!(
            move_into_trash(&root, &root).await,
            Err(TreeError::InvalidPath)
        ));
        assert!(matches!(
            move_into_trash(&root, &trash).await,
            Err(TreeError::InvalidPath)
        ));
    }
}
