//! Body extractors whose rejections go through [`ApiError`].
//!
//! Malformed, incomplete or wrongly typed bodies keep axum's status code but
//! answer with the usual `{"detail": ...}` body.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Form-encoded request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);
