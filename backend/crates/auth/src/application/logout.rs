//! Logout Use Cases

use std::sync::Arc;

use crate::domain::entity::RefreshToken;
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Revokes one refresh token
pub struct LogoutUseCase<T>
where
    T: RefreshTokenRepository,
{
    token_repo: Arc<T>,
}

impl<T> LogoutUseCase<T>
where
    T: RefreshTokenRepository,
{
    pub fn new(token_repo: Arc<T>) -> Self {
        Self { token_repo }
    }

    /// The token is looked up by digest only; its signature is not checked.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let hash = RefreshToken::hash_token(refresh_token);
        if self.token_repo.revoke(&hash).await? {
            tracing::info!("Refresh token revoked");
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Revokes every refresh token of one user
pub struct LogoutAllUseCase<T>
where
    T: RefreshTokenRepository,
{
    token_repo: Arc<T>,
}

impl<T> LogoutAllUseCase<T>
where
    T: RefreshTokenRepository,
{
    pub fn new(token_repo: Arc<T>) -> Self {
        Self { token_repo }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<u64> {
        let revoked = self.token_repo.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }
}
