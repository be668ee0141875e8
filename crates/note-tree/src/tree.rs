//! The note tree service: listing, creation, soft delete and JSON content.

use std::fs as std_fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;

use crate::error::{Result, TreeError};
use crate::node::{FileContent, NodeKind, TreeNode};
use crate::path::{resolve_within, validate_entry_name};
use crate::trash::move_into_trash;

/// Filesystem-backed note tree confined to a single data root.
///
/// Holds no mutable state; every call re-resolves the root so the service
/// can be shared freely between concurrent requests.
#[derive(Debug, Clone)]
pub struct NoteTree {
    data_root: PathBuf,
}

impl NoteTree {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Canonical data root, the anchor for every containment check.
    async fn resolve_root(&self) -> Result<PathBuf> {
        match fs::canonicalize(&self.data_root).await {
            Ok(root) => match fs::metadata(&root).await {
                Ok(meta) if meta.is_dir() => Ok(root),
                _ => {
                    tracing::error!(root = %self.data_root.display(), "Data root is not a directory");
                    Err(TreeError::DataRootMissing)
                }
            },
            Err(e) => {
                tracing::error!(root = %self.data_root.display(), error = %e, "Data root not found");
                Err(TreeError::DataRootMissing)
            }
        }
    }

    /// Build the full tree under the data root.
    ///
    /// Entries are sorted by name at every level; symlinks are left out.
    pub async fn list_tree(&self) -> Result<TreeNode> {
        let root = self.resolve_root().await?;
        tokio::task::spawn_blocking(move || build_folder(&root))
            .await
            .map_err(|e| TreeError::ReadFailed(io::Error::other(e)))?
            .map_err(TreeError::ReadFailed)
    }

    /// Create one new folder under `parent_id`, or under the root if omitted.
    pub async fn create_folder(&self, parent_id: Option<&str>, name: &str) -> Result<TreeNode> {
        self.create_entry(NodeKind::Folder, parent_id, name).await
    }

    /// Create one new empty file under `parent_id`.
    pub async fn create_file(&self, parent_id: &str, name: &str) -> Result<TreeNode> {
        self.create_entry(NodeKind::File, Some(parent_id), name).await
    }

    async fn create_entry(
        &self,
        kind: NodeKind,
        parent_id: Option<&str>,
        name: &str,
    ) -> Result<TreeNode> {
        let root = self.resolve_root().await?;
        let parent = match parent_id {
            Some(raw) => resolve_within(&root, raw).await?,
            None => root.clone(),
        };

        match fs::metadata(&parent).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(TreeError::ParentNotFolder),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(TreeError::PermissionDenied)
            }
            Err(_) => return Err(TreeError::ParentNotFound),
        }

        let name = validate_entry_name(name, kind)?;
        let target = parent.join(name);
        if fs::symlink_metadata(&target).await.is_ok() {
            return Err(TreeError::Conflict(kind));
        }

        let created = match kind {
            NodeKind::Folder => fs::create_dir(&target).await,
            NodeKind::File => fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
                .map(|_| ()),
        };
        created.map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => TreeError::Conflict(kind),
            io::ErrorKind::PermissionDenied => TreeError::PermissionDenied,
            _ => {
                tracing::error!(path = %target.display(), error = %e, "Failed to create {}", kind);
                TreeError::CreateFailed { kind, source: e }
            }
        })?;

        tracing::info!(path = %target.display(), "Created {}", kind);
        Ok(match kind {
            NodeKind::Folder => TreeNode::folder(&target, Vec::new()),
            NodeKind::File => TreeNode::file(&target),
        })
    }

    /// Soft-delete a folder (and everything under it) into Trash.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<PathBuf> {
        self.delete_entry(NodeKind::Folder, folder_id).await
    }

    /// Soft-delete a file into Trash.
    pub async fn delete_file(&self, file_id: &str) -> Result<PathBuf> {
        self.delete_entry(NodeKind::File, file_id).await
    }

    async fn delete_entry(&self, kind: NodeKind, id: &str) -> Result<PathBuf> {
        let root = self.resolve_root().await?;
        let target = resolve_within(&root, id).await?;

        let matches_kind = match fs::metadata(&target).await {
            Ok(meta) => match kind {
                NodeKind::Folder => meta.is_dir(),
                NodeKind::File => meta.is_file(),
            },
            Err(_) => false,
        };
        if !matches_kind {
            return Err(TreeError::NotFound(kind));
        }

        move_into_trash(&root, &target).await
    }

    /// Relocate any entry under the root into Trash, returning its new path.
    pub async fn move_to_trash(&self, path: &str) -> Result<PathBuf> {
        let root = self.resolve_root().await?;
        let target = resolve_within(&root, path).await?;
        move_into_trash(&root, &target).await
    }

    /// Read a file's JSON content.
    ///
    /// Empty or unparseable content yields `null` rather than an error.
    pub async fn read_file_content(&self, path: &str) -> Result<FileContent> {
        let root = self.resolve_root().await?;
        let target = resolve_within(&root, path).await?;

        match fs::metadata(&target).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(TreeError::NotFound(NodeKind::File)),
        }

        let raw = fs::read(&target).await.map_err(|e| {
            tracing::error!(path = %target.display(), error = %e, "Failed to read file");
            TreeError::ReadFailed(e)
        })?;
        let content = serde_json::from_slice(&raw).unwrap_or_else(|e| {
            tracing::debug!(path = %target.display(), error = %e, "File content is not JSON");
            Value::Null
        });

        let node = TreeNode::file(&target);
        Ok(FileContent {
            id: node.id,
            label: node.label,
            content,
        })
    }

    /// Overwrite a file with `content` as pretty-printed JSON.
    ///
    /// The file is created if missing, but its parent directory must exist.
    pub async fn write_file_content(&self, path: &str, content: &Value) -> Result<()> {
        let root = self.resolve_root().await?;
        let target = resolve_within(&root, path).await?;

        let parent_exists = match target.parent() {
            Some(parent) => fs::metadata(parent)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
            None => false,
        };
        if !parent_exists {
            return Err(TreeError::ParentDirectoryMissing);
        }

        let body = serde_json::to_string_pretty(content)
            .map_err(|e| TreeError::WriteFailed(io::Error::other(e)))?;
        fs::write(&target, body).await.map_err(|e| {
            tracing::error!(path = %target.display(), error = %e, "Failed to save file");
            TreeError::WriteFailed(e)
        })?;

        tracing::info!(path = %target.display(), "Saved file content");
        Ok(())
    }
}

fn build_folder(path: &Path) -> io::Result<TreeNode> {
    let mut entries = std_fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry_path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            children.push(build_folder(&entry_path)?);
        } else if file_type.is_file() {
            children.push(TreeNode::file(&entry_path));
        } else {
            tracing::debug!(path = %entry_path.display(), "Skipping non-regular entry");
        }
    }

    Ok(TreeNode::folder(path, children))
}
