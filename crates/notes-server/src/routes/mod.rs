//! Router assembly.
//!
//! `/login` is the only open route; `/protected` and everything under `/api`
//! sit behind [`require_bearer`].

pub mod auth;
pub mod tree;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer;
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/protected", get(auth::protected))
        .route("/api/tree", get(tree::list))
        .route("/api/add-folder", post(tree::add_folder))
        .route("/api/add-file", post(tree::add_file))
        .route("/api/delete-folder", delete(tree::delete_folder))
        .route("/api/delete-file", delete(tree::delete_file))
        .route("/api/get-file-content", post(tree::get_file_content))
        .route("/api/save-file-content", post(tree::save_file_content))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/login", post(auth::login))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy allowing credentialed requests from the configured origins.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_configured_origins() {
        let origins = vec!["http://localhost:3000".to_string()];
        assert!(cors_layer(&origins).is_ok());
        assert!(cors_layer(&[]).is_ok());
    }

    #[test]
    fn cors_rejects_unencodable_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());
    }
}
