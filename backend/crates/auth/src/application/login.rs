//! Login Use Case
//!
//! Authenticates an email/password pair and opens a refresh-token session.

use std::sync::Arc;

use chrono::Utc;

use crate::application::credentials::CredentialHasher;
use crate::application::validation::Validator;
use crate::domain::entity::{RefreshToken, UserSummary};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::token::TokenPair;
use crate::domain::value_object::{Email, RawPassword};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenCodec;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub tokens: TokenPair,
    pub user: UserSummary,
}

/// Login use case
pub struct LoginUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
}

impl<U, T> LoginUseCase<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        token_repo: Arc<T>,
        codec: Arc<TokenCodec>,
        hasher: Arc<CredentialHasher>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            codec,
            hasher,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let mut v = Validator::new();
        if input.email.trim().is_empty() {
            v.push("email", "Email is required");
        }
        if input.password.is_empty() {
            v.push("password", "Password is required");
        }
        v.finish()?;

        let password = RawPassword::for_login(input.password);

        // A malformed email cannot belong to anyone
        let user = match Email::new(&input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            self.hasher.verify_dummy(&password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&password, &user.password_hash) {
            tracing::warn!(user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            tracing::warn!(user_id = %user.user_id, status = %user.user_status, "Login refused for inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        let subject = user.user_id.to_string();
        let tokens = self.codec.issue_pair(&subject, user.user_role)?;

        let session = RefreshToken::new(
            user.user_id,
            &tokens.refresh.token,
            tokens.refresh.issued_at,
            tokens.refresh.expires_at,
        );
        self.token_repo.save(&session).await?;

        // Saved before `record_login`: a deactivation or password change
        // committed after the save revokes it, one committed before fails here.
        let now = Utc::now();
        let mut verified_hash = user.password_hash.clone();
        if self.hasher.needs_rehash(&user.password_hash) {
            let upgraded = self.hasher.hash(&password)?;
            if self
                .user_repo
                .replace_password(&user.user_id, Some(&user.password_hash), &upgraded, now)
                .await?
            {
                tracing::info!(user_id = %user.user_id, "Password hash upgraded");
                verified_hash = upgraded;
            }
        }

        if !self
            .user_repo
            .record_login(&user.user_id, &verified_hash, now)
            .await?
        {
            self.token_repo.revoke(&session.token_hash).await?;
            tracing::warn!(user_id = %user.user_id, "Account changed during login");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.user_id, role = %user.user_role, "User logged in");

        Ok(LoginOutput {
            tokens,
            user: user.summary(),
        })
    }
}
