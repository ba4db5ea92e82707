//! Update User Use Case
//!
//! Empty strings leave a field unchanged. Role is never updated here.

use std::sync::Arc;

use chrono::Utc;

use auth::application::validation::{
    MAX_AVATAR_LENGTH, MAX_NAME_LENGTH, MAX_PHONE_LENGTH, Validator,
};
use auth::domain::entity::{User, UserChanges};
use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::domain::value_object::{UserId, UserStatus};
use auth::{AccessPolicy, AuthError, Identity};

use crate::error::{DirectoryError, DirectoryResult};

#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
}

fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct UpdateUserUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
}

impl<U, T> UpdateUserUseCase<U, T>
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

    pub async fn execute(
        &self,
        identity: &Identity,
        id: &str,
        input: UpdateUserInput,
    ) -> DirectoryResult<User> {
        identity.authorize(&AccessPolicy::OWNER_OR_ADMIN, Some(id))?;

        let mut v = Validator::new();
        let full_name = provided(input.full_name)
            .and_then(|s| v.optional_text("fullName", "Full name", &s, MAX_NAME_LENGTH));
        let phone = provided(input.phone)
            .and_then(|s| v.optional_text("phone", "Phone", &s, MAX_PHONE_LENGTH));
        let avatar = provided(input.avatar)
            .and_then(|s| v.optional_text("avatar", "Avatar", &s, MAX_AVATAR_LENGTH));
        v.finish()?;

        let user_id: UserId = id.parse().map_err(|_| DirectoryError::UserNotFound)?;
        let current = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(DirectoryError::UserNotFound)?;

        // Status is only written when it actually changes
        let status = match input.status {
            Some(status) if status != current.user_status => {
                if !identity.is_admin() {
                    tracing::info!(subject = %identity.subject_id, "Status change refused for non-admin");
                    return Err(AuthError::Forbidden.into());
                }
                Some(status)
            }
            _ => None,
        };
        let deactivated = status == Some(UserStatus::Inactive);

        let changes = UserChanges {
            full_name,
            phone,
            avatar,
            status,
        };
        let user = self
            .user_repo
            .apply_changes(&user_id, &changes, Utc::now())
            .await?
            .ok_or(DirectoryError::UserNotFound)?;

        if deactivated {
            let revoked = self.token_repo.revoke_all_for_user(&user.user_id).await?;
            tracing::info!(user_id = %user.user_id, revoked, "Deactivated user signed out");
        }

        tracing::info!(user_id = %user.user_id, updated_by = %identity.subject_id, "User updated");

        Ok(user)
    }
}
