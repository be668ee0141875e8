//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"detail": "..."}` with a status code
//! chosen by the fixed table in [`ApiError::status`].

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use note_tree::TreeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("{}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Form(#[from] FormRejection),
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::Auth(AuthError::Token(e))
    }
}

/// Error body returned with every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Token(TokenError::Signing(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Tree(e) => match e {
                TreeError::InvalidPath | TreeError::PermissionDenied => StatusCode::FORBIDDEN,
                TreeError::InvalidName(_)
                | TreeError::ParentNotFolder
                | TreeError::ParentDirectoryMissing => StatusCode::BAD_REQUEST,
                TreeError::ParentNotFound | TreeError::NotFound(_) => StatusCode::NOT_FOUND,
                TreeError::Conflict(_) => StatusCode::CONFLICT,
                TreeError::DataRootMissing
                | TreeError::TrashMissing
                | TreeError::CreateFailed { .. }
                | TreeError::ReadFailed(_)
                | TreeError::WriteFailed(_)
                | TreeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Form(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", self);
        }

        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
