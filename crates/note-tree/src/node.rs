//! Tree node model returned to clients.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Whether a node is a directory or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    /// Capitalized name, for messages that start with the kind.
    pub fn title(self) -> &'static str {
        match self {
            NodeKind::Folder => "Folder",
            NodeKind::File => "File",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Folder => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// A filesystem entry under the data root.
///
/// `id` is the canonical absolute path and doubles as the node's identity.
/// `children` is present on folders only and is sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn folder(path: &Path, children: Vec<TreeNode>) -> Self {
        Self {
            id: path.to_string_lossy().to_string(),
            label: label_of(path),
            kind: NodeKind::Folder,
            children: Some(children),
        }
    }

    pub fn file(path: &Path) -> Self {
        Self {
            id: path.to_string_lossy().to_string(),
            label: label_of(path),
            kind: NodeKind::File,
            children: None,
        }
    }
}

/// JSON content of a file node, as returned by a content read.
///
/// `content` is `null` when the file is empty or does not hold valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub id: String,
    pub label: String,
    pub content: serde_json::Value,
}

fn label_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
