//! Configuration assembled once at startup and never mutated afterwards.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use jsonwebtoken::Algorithm;

/// Main configuration for the notes server
#[derive(Debug, Clone)]
pub struct Config {
    /// The single shared login
    pub credentials: Credentials,

    /// Token signing configuration
    pub tokens: TokenConfig,

    /// Directory the note tree is confined to
    pub data_root: PathBuf,

    /// Origins allowed by the CORS policy
    pub cors_origins: Vec<String>,
}

/// The one username/password pair accepted by `/login`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact comparison of both fields.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = self.username == username;
        let password_ok = self.password == password;
        username_ok & password_ok
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret_key: String,

    /// Signing algorithm (HMAC family only)
    pub algorithm: Algorithm,

    /// Lifetime of tokens issued by `/login` (default: 30 minutes)
    pub access_token_lifetime: Duration,
}

impl TokenConfig {
    pub fn new(secret_key: impl Into<String>, algorithm: &str, expire_minutes: i64) -> Result<Self> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            bail!("Signing secret must not be empty");
        }

        let algorithm = Algorithm::from_str(algorithm)
            .with_context(|| format!("Unknown signing algorithm: {}", algorithm))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            bail!("Signing algorithm must be HS256, HS384 or HS512, got {:?}", algorithm);
        }

        if expire_minutes <= 0 {
            bail!("Token lifetime must be positive, got {} minutes", expire_minutes);
        }
        let access_token_lifetime = Duration::try_minutes(expire_minutes)
            .with_context(|| format!("Token lifetime out of range: {} minutes", expire_minutes))?;

        Ok(Self {
            secret_key,
            algorithm,
            access_token_lifetime,
        })
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .finish()
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        let creds = Credentials::new("admin", "hunter2");
        assert!(creds.matches("admin", "hunter2"));
        assert!(!creds.matches("admin", "wrong"));
        assert!(!creds.matches("wrong", "hunter2"));
        assert!(!creds.matches("Admin", "hunter2"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("admin", "hunter2");
        let tokens = TokenConfig::new("top-secret", "HS256", 30).unwrap();

        let rendered = format!("{:?} {:?}", creds, tokens);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("admin"));
    }

    #[test]
    fn token_config_validates_inputs() {
        let config = TokenConfig::new("secret", "HS512", 45).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS512);
        assert_eq!(config.access_token_lifetime, Duration::minutes(45));

        assert!(TokenConfig::new("", "HS256", 30).is_err());
        assert!(TokenConfig::new("secret", "RS256", 30).is_err());
        assert!(TokenConfig::new("secret", "nope", 30).is_err());
        assert!(TokenConfig::new("secret", "HS256", 0).is_err());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://notes.example.com,,"),
            vec!["http://localhost:3000", "https://notes.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }
}
