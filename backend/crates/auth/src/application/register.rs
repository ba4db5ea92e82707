//! Register Use Case
//!
//! Self-service signup. New accounts always get the `user` role.

use std::sync::Arc;

use crate::application::credentials::CredentialHasher;
use crate::application::validation::{MAX_NAME_LENGTH, MAX_PHONE_LENGTH, Validator};
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, RawPassword, UserRole};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

/// Fields of a new account after validation
pub struct NewUser {
    pub email: Email,
    pub password: RawPassword,
    pub full_name: String,
    pub phone: String,
}

impl NewUser {
    /// Validate every field, reporting all failures together
    pub fn parse(
        email: &str,
        password: String,
        full_name: &str,
        phone: &str,
    ) -> AuthResult<Self> {
        let mut v = Validator::new();
        let email = v.email("email", email);
        let password = v.new_password("password", password);
        let full_name = v.required_text("fullName", "Full name", full_name, MAX_NAME_LENGTH);
        let phone = v.required_text("phone", "Phone", phone, MAX_PHONE_LENGTH);

        match (email, password, full_name, phone) {
            (Some(email), Some(password), Some(full_name), Some(phone)) => Ok(Self {
                email,
                password,
                full_name,
                phone,
            }),
            _ => Err(v.into_error()),
        }
    }

    /// Hash the password and build the entity
    pub fn into_user(self, hasher: &CredentialHasher, role: UserRole) -> AuthResult<User> {
        let hash = hasher.hash(&self.password)?;
        Ok(User::new(self.email, hash, self.full_name, self.phone, role))
    }
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<CredentialHasher>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: Arc<CredentialHasher>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let new_user = NewUser::parse(&input.email, input.password, &input.full_name, &input.phone)?;

        if self.user_repo.exists_by_email(&new_user.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let user = new_user.into_user(&self.hasher, UserRole::User)?;
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(user)
    }
}
