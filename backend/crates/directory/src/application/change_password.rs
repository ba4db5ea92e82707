//! Change Password Use Case
//!
//! The owner must prove the current password. An admin changing someone
//! else's password skips that proof. Every session of the user is revoked
//! afterwards.

use std::sync::Arc;

use chrono::Utc;

use auth::application::LogoutAllUseCase;
use auth::application::validation::Validator;
use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::domain::value_object::{RawPassword, UserId};
use auth::{AccessPolicy, CredentialHasher, Identity};

use crate::error::{DirectoryError, DirectoryResult};

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    hasher: Arc<CredentialHasher>,
}

impl<U, T> ChangePasswordUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, hasher: Arc<CredentialHasher>) -> Self {
        Self {
            user_repo,
            token_repo,
            hasher,
        }
    }

    /// Returns how many refresh tokens were revoked
    pub async fn execute(
        &self,
        identity: &Identity,
        id: &str,
        input: ChangePasswordInput,
    ) -> DirectoryResult<u64> {
        identity.authorize(&AccessPolicy::OWNER_OR_ADMIN, Some(id))?;

        let user_id: UserId = id.parse().map_err(|_| DirectoryError::UserNotFound)?;
        let acting_on_self = identity.user_id().is_ok_and(|own| own == user_id);
        let must_prove = acting_on_self || !identity.is_admin();

        let mut v = Validator::new();
        if must_prove && input.current_password.is_empty() {
            v.push("currentPassword", "Current password is required");
        }
        let new_password = v.new_password("newPassword", input.new_password);
        let Some(new_password) = new_password else {
            return Err(v.into_error().into());
        };
        v.finish()?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(DirectoryError::UserNotFound)?;

        if must_prove {
            let current = RawPassword::for_login(input.current_password);
            if !self.hasher.verify(&current, &user.password_hash) {
                return Err(DirectoryError::IncorrectPassword);
            }
        }

        // A proven change only applies over the hash that was verified
        let expected = must_prove.then_some(&user.password_hash);
        let new_hash = self.hasher.hash(&new_password)?;
        if !self
            .user_repo
            .replace_password(&user.user_id, expected, &new_hash, Utc::now())
            .await?
        {
            return Err(if must_prove {
                DirectoryError::IncorrectPassword
            } else {
                DirectoryError::UserNotFound
            });
        }

        let revoked = LogoutAllUseCase::new(self.token_repo.clone())
            .execute(&user.user_id)
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            changed_by = %identity.subject_id,
            revoked,
            "Password changed"
        );

        Ok(revoked)
    }
}
