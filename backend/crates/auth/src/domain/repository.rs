//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{RefreshToken, User, UserChanges};
use crate::domain::query::{UserPage, UserQuery};
use crate::domain::value_object::{Email, UserId, UserPassword};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. A duplicate email yields `AuthError::EmailTaken`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Stamp `last_login_at`, but only while the account is still active and
    /// its password hash is still `verified_hash`. Returns whether it applied.
    async fn record_login(
        &self,
        user_id: &UserId,
        verified_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Replace the password hash. With `expected`, the write only happens
    /// when the stored hash still equals it. Returns whether a row changed.
    async fn replace_password(
        &self,
        user_id: &UserId,
        expected: Option<&UserPassword>,
        new_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Write only the profile and status columns set in `changes`.
    /// Returns the stored user afterwards, or `None` when it does not exist.
    async fn apply_changes(
        &self,
        user_id: &UserId,
        changes: &UserChanges,
        at: DateTime<Utc>,
    ) -> AuthResult<Option<User>>;

    /// Returns whether a row was deleted
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;

    async fn list(&self, query: &UserQuery) -> AuthResult<UserPage>;
}

/// Refresh token store
///
/// Tokens are addressed by the SHA-256 of their value.
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> AuthResult<()>;

    async fn find_by_hash(&self, token_hash: &[u8]) -> AuthResult<Option<RefreshToken>>;

    /// Mark one record revoked. Idempotent; returns whether a record matched.
    async fn revoke(&self, token_hash: &[u8]) -> AuthResult<bool>;

    /// Revoke every live record of a user, returning how many changed
    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Atomically revoke `presented_hash` and store `replacement`.
    ///
    /// The revoke only applies to a record that is still usable at `now`, and
    /// the replacement is only stored when that revoke happened. Returns
    /// `false` when another caller already consumed the presented token.
    async fn rotate(
        &self,
        presented_hash: &[u8],
        replacement: &RefreshToken,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Delete records whose `expires_at` is before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
