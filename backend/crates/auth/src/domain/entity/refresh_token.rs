//! Refresh Token Record
//!
//! Server-side state for one issued refresh token. Only the SHA-256 digest
//! of the token is stored; the token itself is handed to the client once.

use chrono::{DateTime, Utc};
use kernel::id::{RefreshTokenId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token_id: RefreshTokenId,
    pub user_id: UserId,
    /// SHA-256 of the token string
    pub token_hash: Vec<u8>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set once, never cleared
    pub revoked: bool,
}

impl RefreshToken {
    pub fn new(
        user_id: UserId,
        token: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_id: RefreshTokenId::new(),
            user_id,
            token_hash: Self::hash_token(token),
            issued_at,
            expires_at,
            revoked: false,
        }
    }

    /// Storage key for a presented token
    pub fn hash_token(token: &str) -> Vec<u8> {
        platform::crypto::sha256(token.as_bytes()).to_vec()
    }

    pub fn matches(&self, token_hash: &[u8]) -> bool {
        platform::crypto::constant_time_eq(&self.token_hash, token_hash)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable iff not revoked and not expired
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }

    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}
