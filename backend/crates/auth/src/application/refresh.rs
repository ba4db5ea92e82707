//! Refresh Use Case
//!
//! Exchanges a refresh token for a new pair. Every refresh token is
//! single-use: the presented record is revoked and a replacement stored in
//! the same atomic step.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::RefreshToken;
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::token::{TokenError, TokenKind, TokenPair};
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenCodec;

/// Refresh use case
pub struct RefreshUseCase<T>
where
    T: RefreshTokenRepository,
{
    token_repo: Arc<T>,
    codec: Arc<TokenCodec>,
}

impl<T> RefreshUseCase<T>
where
    T: RefreshTokenRepository,
{
    pub fn new(token_repo: Arc<T>, codec: Arc<TokenCodec>) -> Self {
        Self { token_repo, codec }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::field("refreshToken", "Refresh token is required"));
        }

        let claims = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::ExpiredToken,
                TokenError::InvalidSignature | TokenError::Malformed => AuthError::InvalidToken,
            })?;

        let presented_hash = RefreshToken::hash_token(refresh_token);
        let now = Utc::now();

        let record = self
            .token_repo
            .find_by_hash(&presented_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if record.revoked {
            tracing::warn!(user_id = %record.user_id, token_id = %record.token_id, "Revoked refresh token reused");
            return Err(AuthError::RevokedToken);
        }
        if record.is_expired(now) {
            return Err(AuthError::ExpiredToken);
        }

        let subject: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        if subject != record.user_id {
            return Err(AuthError::InvalidToken);
        }

        let tokens = self.codec.issue_pair(&claims.sub, claims.role)?;
        let replacement = RefreshToken::new(
            record.user_id,
            &tokens.refresh.token,
            tokens.refresh.issued_at,
            tokens.refresh.expires_at,
        );

        if !self
            .token_repo
            .rotate(&presented_hash, &replacement, now)
            .await?
        {
            tracing::warn!(user_id = %record.user_id, "Lost refresh rotation race");
            return Err(AuthError::RevokedToken);
        }

        tracing::info!(user_id = %record.user_id, "Refresh token rotated");

        Ok(tokens)
    }
}
