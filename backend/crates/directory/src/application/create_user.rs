//! Create User Use Case
//!
//! Admin-only account creation. Unlike self-registration the role is chosen
//! by the caller.

use std::sync::Arc;

use auth::application::NewUser;
use auth::domain::entity::User;
use auth::domain::repository::UserRepository;
use auth::domain::value_object::UserRole;
use auth::{AccessPolicy, AuthError, CredentialHasher, Identity};

use crate::error::DirectoryResult;

pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub role: Option<UserRole>,
}

pub struct CreateUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<CredentialHasher>,
}

impl<U> CreateUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: Arc<CredentialHasher>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn execute(&self, identity: &Identity, input: CreateUserInput) -> DirectoryResult<User> {
        identity.authorize(&AccessPolicy::ADMIN_ONLY, None)?;

        let new_user = NewUser::parse(&input.email, input.password, &input.full_name, &input.phone)?;

        if self.user_repo.exists_by_email(&new_user.email).await? {
            return Err(AuthError::EmailTaken.into());
        }

        let user = new_user.into_user(&self.hasher, input.role.unwrap_or_default())?;
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.user_role,
            created_by = %identity.subject_id,
            "User created"
        );

        Ok(user)
    }
}
