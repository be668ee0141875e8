//! Shared-credential login and the bearer guard in front of every other route.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use thiserror::Error;

use crate::config::{Config, Credentials};
use crate::error::ApiError;
use crate::token::{Claims, Subject, TokenError, TokenService};
use crate::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    AuthenticationFailed,

    #[error("Not authenticated")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Credential check plus token issuance and verification.
pub struct AuthService {
    credentials: Credentials,
    tokens: TokenService,
    access_token_lifetime: Duration,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            credentials: config.credentials.clone(),
            tokens: TokenService::new(&config.tokens),
            access_token_lifetime: config.tokens.access_token_lifetime,
        }
    }

    /// Exchange the shared credentials for a bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.credentials.matches(username, password) {
            tracing::info!("Rejected login attempt");
            return Err(AuthError::AuthenticationFailed);
        }

        let token = self
            .tokens
            .issue(&Subject { sub: username }, Some(self.access_token_lifetime))?;
        tracing::info!(user = username, "Issued access token");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token).map_err(|e| {
            match &e {
                TokenError::Expired => tracing::debug!("Rejected expired token"),
                _ => tracing::debug!("Rejected invalid token"),
            }
            AuthError::Token(e)
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token.trim()),
        _ => Err(AuthError::MissingToken),
    }
}

/// Middleware: verify the bearer token and expose its [`Claims`] to handlers.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        state.auth.verify(token)?
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
