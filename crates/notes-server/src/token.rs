//! Stateless signed bearer tokens.
//!
//! Tokens are HMAC-signed JWTs carrying a subject and an absolute expiry.
//! Nothing is stored server-side, so a token stays valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

/// Lifetime applied when `issue` is called without an explicit TTL.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the authenticated username
    pub sub: String,
    /// Expiry (unix timestamp, seconds)
    pub exp: i64,
}

/// Caller-supplied payload for a login token; `issue` adds the expiry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Subject<'a> {
    pub sub: &'a str,
}

#[derive(Serialize)]
struct Signed<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign `claims` with an expiry `ttl` from now (15 minutes if `None`).
    pub fn issue<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TTL_MINUTES));
        let signed = Signed {
            claims,
            exp: (Utc::now() + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(self.algorithm), &signed, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Check signature, then expiry, and return the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
