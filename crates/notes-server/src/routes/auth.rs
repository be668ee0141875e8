//! `POST /login` and `GET /protected`

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiForm;
use crate::token::Claims;
use crate::AppState;

/// Login form (form-encoded)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: String,
}

/// Handler for `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state.auth.login(&form.username, &form.password)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Handler for `GET /protected`
pub async fn protected(Extension(claims): Extension<Claims>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected route".to_string(),
        user: claims.sub,
    })
}
