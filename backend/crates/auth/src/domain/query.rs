//! User listing query
//!
//! Paging, free-text search, filters and a whitelisted sort. Repositories
//! translate this into SQL (or an in-memory scan) without ever splicing
//! caller-provided text into a statement.

use crate::domain::entity::User;
use crate::domain::value_object::{UserId, UserRole, UserStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    FullName,
    Email,
    Role,
    Status,
    LastLoginAt,
}

impl SortField {
    /// Accepts camelCase and snake_case spellings
    pub fn parse(field: &str) -> Option<Self> {
        match field.trim() {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "fullName" | "full_name" | "name" => Some(Self::FullName),
            "email" => Some(Self::Email),
            "role" => Some(Self::Role),
            "status" => Some(Self::Status),
            "lastLoginAt" | "last_login_at" | "lastLogin" | "last_login" => {
                Some(Self::LastLoginAt)
            }
            _ => None,
        }
    }

    pub const fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Role => "role",
            Self::Status => "status",
            Self::LastLoginAt => "last_login_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl UserSort {
    /// Parse `field,asc|desc`. Unknown fields fall back to the default order.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ',');
        let field = parts
            .next()
            .and_then(SortField::parse)
            .unwrap_or_default();
        let direction = match parts.next().map(str::trim) {
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        Self { field, direction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// 0-based page index
    pub page: u32,
    pub page_size: u32,
    /// Case-insensitive substring over full name and email
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// Restricts the listing to one user (non-admin callers)
    pub only: Option<UserId>,
    pub sort: UserSort,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            role: None,
            status: None,
            only: None,
            sort: UserSort::default(),
        }
    }
}

impl UserQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }
}

/// One page of users plus counts over the whole filtered set
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            UserSort::parse("fullName,asc"),
            UserSort {
                field: SortField::FullName,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(UserSort::parse("email").direction, SortDirection::Desc);
        assert_eq!(UserSort::parse("email,ASC").direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_rejects_unknown_columns() {
        let sort = UserSort::parse("password_hash;DROP TABLE users,asc");
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.field.column(), "created_at");
    }

    #[test]
    fn test_offset() {
        let query = UserQuery {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        assert_eq!(query.offset(), 75);
    }
}
