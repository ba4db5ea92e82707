//! In-Memory Repository
//!
//! Process-local store implementing both repository traits. Backs the test
//! suites and local runs without a database. One lock covers users and
//! tokens, so `rotate` is atomic.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::entity::{RefreshToken, User, UserChanges};
use crate::domain::query::{SortDirection, SortField, UserPage, UserQuery};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{Email, UserId, UserPassword, UserStatus};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    tokens: Vec<RefreshToken>,
}

#[derive(Default)]
pub struct InMemoryAuthRepository {
    state: Mutex<State>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored refresh token records, revoked ones included
    pub async fn token_count(&self) -> usize {
        self.state.lock().await.tokens.len()
    }
}

fn matches_query(user: &User, query: &UserQuery) -> bool {
    if let Some(only) = &query.only
        && &user.user_id != only
    {
        return false;
    }
    if let Some(role) = query.role
        && user.user_role != role
    {
        return false;
    }
    if let Some(status) = query.status
        && user.user_status != status
    {
        return false;
    }
    match query.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            user.full_name.to_lowercase().contains(&needle)
                || user.email.as_str().contains(&needle)
        }
        _ => true,
    }
}

fn compare(a: &User, b: &User, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::FullName => a.full_name.cmp(&b.full_name),
        SortField::Email => a.email.as_str().cmp(b.email.as_str()),
        SortField::Role => a.user_role.code().cmp(b.user_role.code()),
        SortField::Status => a.user_status.code().cmp(b.user_status.code()),
        SortField::LastLoginAt => a.last_login_at.cmp(&b.last_login_at),
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock().await;
        Ok(state.users.values().any(|u| &u.email == email))
    }

    async fn record_login(
        &self,
        user_id: &UserId,
        verified_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(user_id) {
            Some(user) if user.can_login() && &user.password_hash == verified_hash => {
                user.record_login(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        expected: Option<&UserPassword>,
        new_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(user_id) {
            Some(user) if expected.is_none_or(|e| &user.password_hash == e) => {
                user.set_password(new_hash.clone(), at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_changes(
        &self,
        user_id: &UserId,
        changes: &UserChanges,
        at: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            user.apply(changes, at);
            user.clone()
        }))
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.users.remove(user_id).is_some();
        if removed {
            state.tokens.retain(|t| &t.user_id != user_id);
        }
        Ok(removed)
    }

    async fn list(&self, query: &UserQuery) -> AuthResult<UserPage> {
        let state = self.state.lock().await;
        let mut matched: Vec<&User> = state
            .users
            .values()
            .filter(|u| matches_query(u, query))
            .collect();

        let active = matched
            .iter()
            .filter(|u| u.user_status == UserStatus::Active)
            .count() as u64;
        let total = matched.len() as u64;

        matched.sort_by(|a, b| {
            let ord = compare(a, b, query.sort.field)
                .then_with(|| a.user_id.as_uuid().cmp(b.user_id.as_uuid()));
            match query.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let users = matched
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(UserPage {
            users,
            total,
            active,
            inactive: total - active,
        })
    }
}

impl RefreshTokenRepository for InMemoryAuthRepository {
    async fn save(&self, token: &RefreshToken) -> AuthResult<()> {
        self.state.lock().await.tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &[u8]) -> AuthResult<Option<RefreshToken>> {
        let state = self.state.lock().await;
        Ok(state.tokens.iter().find(|t| t.matches(token_hash)).cloned())
    }

    async fn revoke(&self, token_hash: &[u8]) -> AuthResult<bool> {
        let mut state = self.state.lock().await;
        match state.tokens.iter_mut().find(|t| t.matches(token_hash)) {
            Some(record) => {
                record.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let mut revoked = 0;
        for record in state
            .tokens
            .iter_mut()
            .filter(|t| &t.user_id == user_id && !t.revoked)
        {
            record.revoke();
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn rotate(
        &self,
        presented_hash: &[u8],
        replacement: &RefreshToken,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.state.lock().await;
        let Some(record) = state
            .tokens
            .iter_mut()
            .find(|t| t.matches(presented_hash) && t.is_usable(now))
        else {
            return Ok(false);
        };
        record.revoke();
        state.tokens.push(replacement.clone());
        Ok(true)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|t| t.expires_at >= now);
        Ok((before - state.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::UserSort;
    use crate::domain::value_object::{RawPassword, UserPassword, UserRole};
    use chrono::Duration;
    use platform::password::HashingPolicy;

    fn user(email: &str, name: &str) -> User {
        let raw = RawPassword::for_login("Granite-Meadow-7".to_string());
        let hash = UserPassword::from_raw(&raw, None, &HashingPolicy::insecure_fast()).unwrap();
        User::new(Email::new(email).unwrap(), hash, name, "555-0100", UserRole::User)
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryAuthRepository::new();
        repo.create(&user("a@example.com", "A")).await.unwrap();
        let err = repo.create(&user("A@example.com", "B")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_rotate_consumes_once() {
        let repo = InMemoryAuthRepository::new();
        let owner = UserId::new();
        let now = Utc::now();
        let original = RefreshToken::new(owner, "first", now, now + Duration::hours(1));
        repo.save(&original).await.unwrap();

        let second = RefreshToken::new(owner, "second", now, now + Duration::hours(1));
        let third = RefreshToken::new(owner, "third", now, now + Duration::hours(1));
        assert!(repo.rotate(&original.token_hash, &second, now).await.unwrap());
        assert!(!repo.rotate(&original.token_hash, &third, now).await.unwrap());

        assert_eq!(repo.token_count().await, 2);
        let stored = repo.find_by_hash(&original.token_hash).await.unwrap().unwrap();
        assert!(stored.revoked);
    }

    #[tokio::test]
    async fn test_rotate_refuses_expired() {
        let repo = InMemoryAuthRepository::new();
        let owner = UserId::new();
        let now = Utc::now();
        let stale = RefreshToken::new(owner, "stale", now - Duration::hours(2), now);
        repo.save(&stale).await.unwrap();
        let next = RefreshToken::new(owner, "next", now, now + Duration::hours(1));
        assert!(!repo.rotate(&stale.token_hash, &next, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_keeps_live_records() {
        let repo = InMemoryAuthRepository::new();
        let owner = UserId::new();
        let now = Utc::now();
        repo.save(&RefreshToken::new(owner, "old", now - Duration::days(2), now - Duration::days(1)))
            .await
            .unwrap();
        repo.save(&RefreshToken::new(owner, "live", now, now + Duration::days(1)))
            .await
            .unwrap();

        assert_eq!(repo.purge_expired(now).await.unwrap(), 1);
        assert_eq!(repo.token_count().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_all_counts_live_only() {
        let repo = InMemoryAuthRepository::new();
        let owner = UserId::new();
        let now = Utc::now();
        for token in ["a", "b"] {
            repo.save(&RefreshToken::new(owner, token, now, now + Duration::hours(1)))
                .await
                .unwrap();
        }
        repo.revoke(&RefreshToken::hash_token("a")).await.unwrap();
        assert_eq!(repo.revoke_all_for_user(&owner).await.unwrap(), 1);
        assert_eq!(repo.revoke_all_for_user(&owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_login_requires_active_and_same_hash() {
        let repo = InMemoryAuthRepository::new();
        let stored = user("ada@example.com", "Ada");
        repo.create(&stored).await.unwrap();
        let now = Utc::now();

        assert!(repo.record_login(&stored.user_id, &stored.password_hash, now).await.unwrap());
        let reloaded = repo.find_by_id(&stored.user_id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_login_at, Some(now));

        let other = user("other@example.com", "Other").password_hash;
        assert!(repo.replace_password(&stored.user_id, None, &other, now).await.unwrap());
        assert!(!repo.record_login(&stored.user_id, &stored.password_hash, now).await.unwrap());

        repo.apply_changes(
            &stored.user_id,
            &UserChanges {
                status: Some(UserStatus::Inactive),
                ..UserChanges::default()
            },
            now,
        )
        .await
        .unwrap();
        assert!(!repo.record_login(&stored.user_id, &other, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_password_checks_expected_hash() {
        let repo = InMemoryAuthRepository::new();
        let stored = user("ada@example.com", "Ada");
        repo.create(&stored).await.unwrap();
        let first = user("x@example.com", "X").password_hash;
        let second = user("y@example.com", "Y").password_hash;
        let now = Utc::now();

        assert!(repo
            .replace_password(&stored.user_id, Some(&stored.password_hash), &first, now)
            .await
            .unwrap());
        // Stale expectation no longer matches
        assert!(!repo
            .replace_password(&stored.user_id, Some(&stored.password_hash), &second, now)
            .await
            .unwrap());
        let reloaded = repo.find_by_id(&stored.user_id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, first);
    }

    #[tokio::test]
    async fn test_apply_changes_on_missing_user() {
        let repo = InMemoryAuthRepository::new();
        let changes = UserChanges {
            full_name: Some("Nobody".into()),
            ..UserChanges::default()
        };
        assert!(repo
            .apply_changes(&UserId::new(), &changes, Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let repo = InMemoryAuthRepository::new();
        for (email, name) in [
            ("carol@example.com", "Carol"),
            ("alice@example.com", "Alice"),
            ("bob@example.com", "Bob"),
        ] {
            repo.create(&user(email, name)).await.unwrap();
        }
        let mut inactive = user("dave@example.com", "Dave");
        inactive.user_status = UserStatus::Inactive;
        repo.create(&inactive).await.unwrap();

        let query = UserQuery {
            page: 0,
            page_size: 2,
            sort: UserSort::parse("fullName,asc"),
            ..UserQuery::default()
        };
        let page = repo.list(&query).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.active, 3);
        assert_eq!(page.inactive, 1);
        let names: Vec<&str> = page.users.iter().map(|u| u.full_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let query = UserQuery {
            search: Some("CAR".into()),
            ..UserQuery::default()
        };
        let page = repo.list(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].full_name, "Carol");

        let query = UserQuery {
            status: Some(UserStatus::Inactive),
            ..UserQuery::default()
        };
        assert_eq!(repo.list(&query).await.unwrap().users[0].full_name, "Dave");
    }
}
