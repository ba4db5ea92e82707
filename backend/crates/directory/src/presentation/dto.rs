//! API DTOs

use auth::domain::value_object::{UserRole, UserStatus};
use auth::models::UserResponse;
use serde::{Deserialize, Serialize};

use crate::application::ListUsersOutput;

/// `GET /users` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    /// `field,asc|desc`
    pub sort: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub role: Option<UserRole>,
}

/// Absent and empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Page of users in the Spring Data layout clients already consume
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPageResponse {
    pub content: Vec<UserResponse>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
    pub active_users: u64,
    pub inactive_users: u64,
}

impl From<ListUsersOutput> for UserPageResponse {
    fn from(out: ListUsersOutput) -> Self {
        let total_pages = out.page.total.div_ceil(u64::from(out.size.max(1)));
        let content: Vec<UserResponse> = out.page.users.iter().map(UserResponse::from).collect();

        Self {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            content,
            total_elements: out.page.total,
            total_pages,
            number: out.number,
            size: out.size,
            first: out.number == 0,
            last: u64::from(out.number) + 1 >= total_pages,
            active_users: out.page.active,
            inactive_users: out.page.inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::domain::query::UserPage;

    fn output(total: u64, number: u32, size: u32) -> ListUsersOutput {
        ListUsersOutput {
            page: UserPage {
                users: Vec::new(),
                total,
                active: total,
                inactive: 0,
            },
            number,
            size,
        }
    }

    #[test]
    fn test_page_arithmetic() {
        let page = UserPageResponse::from(output(25, 0, 10));
        assert_eq!(page.total_pages, 3);
        assert!(page.first);
        assert!(!page.last);

        let page = UserPageResponse::from(output(25, 2, 10));
        assert!(page.last);
        assert!(!page.first);

        let page = UserPageResponse::from(output(0, 0, 10));
        assert_eq!(page.total_pages, 0);
        assert!(page.empty);
        assert!(page.last);
    }
}
