//! Delete User Use Case

use std::sync::Arc;

use auth::application::LogoutAllUseCase;
use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::domain::value_object::UserId;
use auth::{AccessPolicy, Identity};

use crate::error::{DirectoryError, DirectoryResult};

pub struct DeleteUserUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
}

impl<U, T> DeleteUserUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>) -> Self {
        Self {
            user_repo,
            token_repo,
        }
    }

    pub async fn execute(&self, identity: &Identity, id: &str) -> DirectoryResult<()> {
        identity.authorize(&AccessPolicy::ADMIN_ONLY, None)?;

        let user_id: UserId = id.parse().map_err(|_| DirectoryError::UserNotFound)?;

        // Sessions first, so a failed delete never leaves live tokens behind
        LogoutAllUseCase::new(self.token_repo.clone())
            .execute(&user_id)
            .await?;

        if !self.user_repo.delete(&user_id).await? {
            return Err(DirectoryError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, deleted_by = %identity.subject_id, "User deleted");

        Ok(())
    }
}
