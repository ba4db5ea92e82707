//! List Users Use Case

use std::sync::Arc;

use auth::domain::query::{UserPage, UserQuery, UserSort};
use auth::domain::repository::UserRepository;
use auth::domain::value_object::{UserId, UserRole, UserStatus};
use auth::{AccessPolicy, Identity};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Clone, Default)]
pub struct ListUsersInput {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug)]
pub struct ListUsersOutput {
    pub page: UserPage,
    pub number: u32,
    pub size: u32,
}

/// Empty and `all` mean no filter
fn filter_value(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

pub struct ListUsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<DirectoryConfig>,
}

impl<U> ListUsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<DirectoryConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        input: ListUsersInput,
    ) -> DirectoryResult<ListUsersOutput> {
        let requested = filter_value(input.id.as_deref());
        identity.authorize(&AccessPolicy::OWNER_OR_ADMIN, requested)?;

        // Non-admins only ever see themselves
        let only = match requested {
            Some(id) => Some(
                id.parse::<UserId>()
                    .map_err(|_| DirectoryError::InvalidQuery("id"))?,
            ),
            None if identity.is_admin() => None,
            None => Some(identity.user_id()?),
        };

        let role = filter_value(input.role.as_deref())
            .map(|r| {
                UserRole::from_code(&r.to_ascii_lowercase())
                    .ok_or(DirectoryError::InvalidQuery("role"))
            })
            .transpose()?;
        let status = filter_value(input.status.as_deref())
            .map(|s| {
                UserStatus::from_code(&s.to_ascii_lowercase())
                    .ok_or(DirectoryError::InvalidQuery("status"))
            })
            .transpose()?;

        let size = input
            .page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);

        let query = UserQuery {
            page: input.page.unwrap_or(0),
            page_size: size,
            search: input
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            role,
            status,
            only,
            sort: input.sort.as_deref().map(UserSort::parse).unwrap_or_default(),
        };

        let page = self.user_repo.list(&query).await?;

        tracing::debug!(
            subject = %identity.subject_id,
            total = page.total,
            returned = page.users.len(),
            "Listed users"
        );

        Ok(ListUsersOutput {
            page,
            number: query.page,
            size,
        })
    }
}
