//! Bearer-token auth gate
//!
//! Tokens have the form `username:expiry:signature` where the signature is a
//! SHA-256 digest over the shared secret, the username, and the expiry
//! timestamp. Password hashes are salted with the username and the secret.
//! Hardening (rotation, constant-time comparison) is out of scope.

use crate::config::AuthConfig;
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Authorization failures; all map to 401 at the HTTP layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    Unauthorized,

    #[error("token expired")]
    Expired,
}

/// The authenticated caller of a gated endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Issues and verifies access tokens
pub struct AuthGate {
    secret: String,
    token_ttl_minutes: i64,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.token_secret.clone(),
            token_ttl_minutes: config.token_ttl_minutes,
        }
    }

    /// Hashes a password for storage, salted with the username and secret
    pub fn hash_password(&self, username: &str, password: &str) -> String {
        digest(&[self.secret.as_bytes(), username.as_bytes(), password.as_bytes()])
    }

    /// Checks a login attempt against the stored hash
    pub fn verify_password(&self, username: &str, password: &str, stored_hash: &str) -> bool {
        self.hash_password(username, password) == stored_hash
    }

    /// Issues a token for the given user, valid for the configured TTL
    pub fn issue(&self, username: &str) -> String {
        let expiry = Utc::now().timestamp() + self.token_ttl_minutes * 60;
        self.issue_with_expiry(username, expiry)
    }

    fn issue_with_expiry(&self, username: &str, expiry: i64) -> String {
        let signature = self.sign(username, expiry);
        format!("{username}:{expiry}:{signature}")
    }

    /// Verifies a bearer token and returns the identity it names
    pub fn authorize(&self, token: &str) -> Result<Identity, AuthError> {
        // Parse from the right so usernames may contain ':'
        let mut parts = token.rsplitn(3, ':');
        let signature = parts.next().ok_or(AuthError::Unauthorized)?;
        let expiry: i64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(AuthError::Unauthorized)?;
        let username = parts.next().ok_or(AuthError::Unauthorized)?;

        if username.is_empty() || self.sign(username, expiry) != signature {
            return Err(AuthError::Unauthorized);
        }
        if Utc::now().timestamp() > expiry {
            return Err(AuthError::Expired);
        }

        Ok(Identity {
            username: username.to_string(),
        })
    }

    fn sign(&self, username: &str, expiry: i64) -> String {
        digest(&[
            self.secret.as_bytes(),
            username.as_bytes(),
            expiry.to_string().as_bytes(),
        ])
    }
}

fn digest(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
