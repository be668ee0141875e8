//! Note tree endpoints under `/api`.

use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use note_tree::{FileContent, TreeNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddFolderRequest {
    /// Parent folder id; the data root when absent or blank
    #[serde(default)]
    pub parent_id: Option<String>,
    pub folder_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFileRequest {
    pub parent_id: String,
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFolderRequest {
    pub folder_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileRequest {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetFileContentRequest {
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveFileContentRequest {
    pub file_path: String,
    pub content: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub moved_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handler for `GET /api/tree`
///
/// Returns the data root's children; the root itself is implicit.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let root = state.tree.list_tree().await?;
    Ok(Json(root.children.unwrap_or_default()))
}

/// Handler for `POST /api/add-folder`
pub async fn add_folder(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AddFolderRequest>,
) -> Result<(StatusCode, Json<TreeNode>), ApiError> {
    let parent = request
        .parent_id
        .as_deref()
        .filter(|id| !id.trim().is_empty());
    let node = state.tree.create_folder(parent, &request.folder_name).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// Handler for `POST /api/add-file`
pub async fn add_file(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AddFileRequest>,
) -> Result<(StatusCode, Json<TreeNode>), ApiError> {
    let node = state
        .tree
        .create_file(&request.parent_id, &request.file_name)
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// Handler for `DELETE /api/delete-folder`
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DeleteFolderRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let moved = state.tree.delete_folder(&request.folder_id).await?;
    Ok(Json(deleted("Folder moved to Trash.", &moved)))
}

/// Handler for `DELETE /api/delete-file`
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DeleteFileRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let moved = state.tree.delete_file(&request.file_id).await?;
    Ok(Json(deleted("File moved to Trash.", &moved)))
}

/// Handler for `POST /api/get-file-content`
pub async fn get_file_content(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<GetFileContentRequest>,
) -> Result<Json<FileContent>, ApiError> {
    let content = state.tree.read_file_content(&request.file_path).await?;
    Ok(Json(content))
}

/// Handler for `POST /api/save-file-content`
pub async fn save_file_content(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SaveFileContentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .tree
        .write_file_content(&request.file_path, &request.content)
        .await?;
    Ok(Json(MessageResponse {
        message: "File saved successfully.".to_string(),
    }))
}

fn deleted(message: &str, moved: &Path) -> DeleteResponse {
    DeleteResponse {
        message: message.to_string(),
        moved_path: moved.to_string_lossy().to_string(),
    }
}
