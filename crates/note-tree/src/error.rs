//! Error taxonomy for tree operations.
//!
//! The `Display` text of each variant is the human-readable detail that
//! callers surface to clients, so it is kept short and free of server paths.

use std::io;

use thiserror::Error;

use crate::node::NodeKind;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Data directory not found.")]
    DataRootMissing,

    #[error("Trash folder not found.")]
    TrashMissing,

    #[error("Invalid path.")]
    InvalidPath,

    #[error("Invalid {0} name.")]
    InvalidName(NodeKind),

    #[error("Parent folder not found.")]
    ParentNotFound,

    #[error("Parent is not a folder.")]
    ParentNotFolder,

    #[error("A {0} with this name already exists.")]
    Conflict(NodeKind),

    #[error("Permission denied.")]
    PermissionDenied,

    #[error("{} not found.", .0.title())]
    NotFound(NodeKind),

    #[error("Parent directory does not exist.")]
    ParentDirectoryMissing,

    #[error("Failed to create {kind}: {source}")]
    CreateFailed {
        kind: NodeKind,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("Failed to save file: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("Failed to move item to Trash: {0}")]
    Internal(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_name_the_item_kind() {
        assert_eq!(
            TreeError::InvalidName(NodeKind::Folder).to_string(),
            "Invalid folder name."
        );
        assert_eq!(
            TreeError::Conflict(NodeKind::File).to_string(),
            "A file with this name already exists."
        );
        assert_eq!(TreeError::NotFound(NodeKind::Folder).to_string(), "Folder not found.");
    }

    #[test]
    fn io_failures_carry_their_cause() {
        let err = TreeError::WriteFailed(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Failed to save file: disk full");
    }
}
