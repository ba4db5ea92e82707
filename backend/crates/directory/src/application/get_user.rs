//! Get User Use Case

use std::sync::Arc;

use auth::domain::entity::User;
use auth::domain::repository::UserRepository;
use auth::domain::value_object::UserId;
use auth::{AccessPolicy, Identity};

use crate::error::DirectoryResult;

pub struct GetUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> GetUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// `None` when no user has this id, including ids that are not UUIDs
    pub async fn execute(&self, identity: &Identity, id: &str) -> DirectoryResult<Option<User>> {
        identity.authorize(&AccessPolicy::OWNER_OR_ADMIN, Some(id))?;

        let Ok(user_id) = id.parse::<UserId>() else {
            return Ok(None);
        };

        Ok(self.user_repo.find_by_id(&user_id).await?)
    }
}
