//! HTTP service over the note tree, guarded by a single shared login.
//!
//! Provides:
//! - `POST /login`: shared credentials in, short-lived bearer token out
//! - `GET /protected`: token check
//! - `/api/*`: tree listing, folder/file creation, soft delete into Trash,
//!   JSON content read/write

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod token;

use note_tree::NoteTree;

use crate::auth::AuthService;
use crate::config::Config;

pub use routes::router;

/// Shared application state
pub struct AppState {
    pub auth: AuthService,
    pub tree: NoteTree,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            auth: AuthService::new(config),
            tree: NoteTree::new(config.data_root.clone()),
        }
    }
}
