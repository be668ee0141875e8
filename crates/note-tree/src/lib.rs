//! Filesystem-backed hierarchical note store.
//!
//! All operations are confined to one data root. Deletes are soft: entries
//! are renamed into the reserved `Trash` folder under the root. Note content
//! is stored as pretty-printed JSON.

pub mod error;
pub mod node;
pub mod path;
pub mod trash;
pub mod tree;

pub use error::{Result, TreeError};
pub use node::{FileContent, NodeKind, TreeNode};
pub use trash::TRASH_DIR;
pub use tree::NoteTree;
