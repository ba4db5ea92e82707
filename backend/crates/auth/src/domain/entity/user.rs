//! User Entity
//!
//! Directory entry for one account, including its credential hash.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_object::{Email, UserId, UserPassword, UserRole, UserStatus};

/// Avatar assigned when none is supplied
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// User entity
///
/// Not `Serialize`: responses go through [`UserSummary`] or a presentation
/// DTO so the password hash can never leak into a body.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, lower-cased login identifier
    pub email: Email,
    pub password_hash: UserPassword,
    pub full_name: String,
    pub phone: String,
    pub avatar: String,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user
    pub fn new(
        email: Email,
        password_hash: UserPassword,
        full_name: impl Into<String>,
        phone: impl Into<String>,
        user_role: UserRole,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            full_name: full_name.into(),
            phone: phone.into(),
            avatar: DEFAULT_AVATAR.to_string(),
            user_role,
            user_status: UserStatus::Active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }

    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    pub fn set_password(&mut self, password_hash: UserPassword, at: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.updated_at = at;
    }

    /// Apply the fields present in `changes`, leaving the rest untouched
    pub fn apply(&mut self, changes: &UserChanges, at: DateTime<Utc>) {
        if let Some(full_name) = &changes.full_name {
            self.full_name.clone_from(full_name);
        }
        if let Some(phone) = &changes.phone {
            self.phone.clone_from(phone);
        }
        if let Some(avatar) = &changes.avatar {
            self.avatar.clone_from(avatar);
        }
        if let Some(status) = changes.status {
            self.user_status = status;
        }
        self.updated_at = at;
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.user_id.to_string(),
            name: self.full_name.clone(),
            email: self.email.to_string(),
            role: self.user_role,
        }
    }
}

/// Partial profile edit. `None` leaves the stored column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
}

/// Public projection returned with a login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
