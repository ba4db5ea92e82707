use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::*;
use crate::domain::entity::{RefreshToken, User, UserChanges};
use crate::domain::query::{UserPage, UserQuery};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::token::TokenKind;
use crate::domain::value_object::{
    Email, RawPassword, UserId, UserPassword, UserRole, UserStatus,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::{InMemoryAuthRepository, TokenCodec};

const PASSWORD: &str = "Granite-Meadow-7";

struct Harness {
    repo: Arc<InMemoryAuthRepository>,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
}

impl Harness {
    fn new() -> Self {
        let config = AuthConfig::for_tests();
        Self {
            repo: Arc::new(InMemoryAuthRepository::new()),
            codec: Arc::new(TokenCodec::new(&config).unwrap()),
            hasher: Arc::new(CredentialHasher::new(&config).unwrap()),
        }
    }

    async fn register(&self, email: &str) -> crate::domain::entity::User {
        RegisterUseCase::new(self.repo.clone(), self.hasher.clone())
            .execute(RegisterInput {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                full_name: "Ada Lovelace".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap()
    }

    fn login_use_case(&self) -> LoginUseCase<InMemoryAuthRepository, InMemoryAuthRepository> {
        LoginUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.codec.clone(),
            self.hasher.clone(),
        )
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, AuthError> {
        self.login_use_case()
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    fn refresh(&self) -> RefreshUseCase<InMemoryAuthRepository> {
        RefreshUseCase::new(self.repo.clone(), self.codec.clone())
    }
}

fn deactivate() -> UserChanges {
    UserChanges {
        status: Some(UserStatus::Inactive),
        ..UserChanges::default()
    }
}

/// When the competing admin write lands relative to the login
#[derive(Clone, Copy)]
enum Strike {
    /// Right after the login read the user
    AfterRead,
    /// Right after the login was recorded
    AfterRecord,
}

/// Delegates to the shared store and runs an admin write (profile changes,
/// password reset, then sign-out everywhere) in the middle of a login.
struct InterleavedAdminWrite {
    inner: Arc<InMemoryAuthRepository>,
    changes: UserChanges,
    new_password: Option<UserPassword>,
    strike: Strike,
}

impl InterleavedAdminWrite {
    async fn run(&self, user_id: &UserId) {
        let now = Utc::now();
        self.inner
            .apply_changes(user_id, &self.changes, now)
            .await
            .unwrap();
        if let Some(hash) = &self.new_password {
            self.inner
                .replace_password(user_id, None, hash, now)
                .await
                .unwrap();
        }
        self.inner.revoke_all_for_user(user_id).await.unwrap();
    }
}

impl UserRepository for InterleavedAdminWrite {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.inner.create(user).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.inner.find_by_id(user_id).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let snapshot = self.inner.find_by_email(email).await?;
        if let (Some(user), Strike::AfterRead) = (&snapshot, self.strike) {
            self.run(&user.user_id).await;
        }
        Ok(snapshot)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.inner.exists_by_email(email).await
    }

    async fn record_login(
        &self,
        user_id: &UserId,
        verified_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let recorded = self.inner.record_login(user_id, verified_hash, at).await?;
        if let Strike::AfterRecord = self.strike {
            self.run(user_id).await;
        }
        Ok(recorded)
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        expected: Option<&UserPassword>,
        new_hash: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        self.inner
            .replace_password(user_id, expected, new_hash, at)
            .await
    }

    async fn apply_changes(
        &self,
        user_id: &UserId,
        changes: &UserChanges,
        at: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        self.inner.apply_changes(user_id, changes, at).await
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        self.inner.delete(user_id).await
    }

    async fn list(&self, query: &UserQuery) -> AuthResult<UserPage> {
        self.inner.list(query).await
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let h = Harness::new();
    let user = h.register("Ada@Example.com").await;
    assert_eq!(user.user_role, UserRole::User);
    assert_eq!(user.user_status, UserStatus::Active);
    assert_eq!(user.email.as_str(), "ada@example.com");

    let out = h.login("ada@example.com", PASSWORD).await.unwrap();
    assert_eq!(out.user.id, user.user_id.to_string());
    assert_eq!(out.user.email, "ada@example.com");

    let claims = h.codec.verify(&out.tokens.access.token, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, user.user_id.to_string());
    assert_eq!(claims.role, UserRole::User);

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
    assert_eq!(h.repo.token_count().await, 1);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let h = Harness::new();
    h.register("ada@example.com").await;

    let wrong = h.login("ada@example.com", "Wrong-Password-1").await.unwrap_err();
    let unknown = h.login("nobody@example.com", PASSWORD).await.unwrap_err();
    let malformed = h.login("not-an-email", PASSWORD).await.unwrap_err();

    for err in [&wrong, &unknown, &malformed] {
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;
    h.repo
        .apply_changes(&user.user_id, &deactivate(), Utc::now())
        .await
        .unwrap();

    let err = h.login("ada@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_requires_fields() {
    let h = Harness::new();
    let Err(AuthError::Validation(errors)) = h.login(" ", "").await else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let h = Harness::new();
    h.register("ada@example.com").await;
    let err = RegisterUseCase::new(h.repo.clone(), h.hasher.clone())
        .execute(RegisterInput {
            email: "ADA@example.com".into(),
            password: PASSWORD.into(),
            full_name: "Someone Else".into(),
            phone: "555-0101".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn test_register_reports_all_invalid_fields() {
    let h = Harness::new();
    let err = RegisterUseCase::new(h.repo.clone(), h.hasher.clone())
        .execute(RegisterInput {
            email: "bad".into(),
            password: "short".into(),
            full_name: String::new(),
            phone: String::new(),
        })
        .await
        .unwrap_err();
    let AuthError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 4);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let h = Harness::new();
    h.register("ada@example.com").await;
    let first = h.login("ada@example.com", PASSWORD).await.unwrap().tokens;

    let second = h.refresh().execute(&first.refresh.token).await.unwrap();
    assert_ne!(second.refresh.token, first.refresh.token);
    let claims = h.codec.verify(&second.access.token, TokenKind::Access).unwrap();
    assert_eq!(claims.role, UserRole::User);

    let err = h.refresh().execute(&first.refresh.token).await.unwrap_err();
    assert!(matches!(err, AuthError::RevokedToken));

    // The replacement is still good
    assert!(h.refresh().execute(&second.refresh.token).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let h = Harness::new();
    h.register("ada@example.com").await;
    let tokens = h.login("ada@example.com", PASSWORD).await.unwrap().tokens;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let use_case = h.refresh();
        let token = tokens.refresh.token.clone();
        handles.push(tokio::spawn(async move { use_case.execute(&token).await }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(err) => assert!(matches!(err, AuthError::RevokedToken)),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_garbage() {
    let h = Harness::new();
    h.register("ada@example.com").await;
    let tokens = h.login("ada@example.com", PASSWORD).await.unwrap().tokens;

    let err = h.refresh().execute(&tokens.access.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    let err = h.refresh().execute("garbage").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    let err = h.refresh().execute("").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn test_refresh_requires_stored_record() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;
    // Validly signed, never persisted
    let orphan = h
        .codec
        .issue(&user.user_id.to_string(), UserRole::User, TokenKind::Refresh)
        .unwrap();
    let err = h.refresh().execute(&orphan.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_expired_refresh_token() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;
    let issued_at = Utc::now() - chrono::Duration::days(2);
    let stale = h
        .codec
        .issue_at(&user.user_id.to_string(), UserRole::User, TokenKind::Refresh, issued_at)
        .unwrap();
    h.repo
        .save(&RefreshToken::new(user.user_id, &stale.token, stale.issued_at, stale.expires_at))
        .await
        .unwrap();

    let err = h.refresh().execute(&stale.token).await.unwrap_err();
    assert!(matches!(err, AuthError::ExpiredToken));
}

#[tokio::test]
async fn test_logout_revokes_one_token() {
    let h = Harness::new();
    h.register("ada@example.com").await;
    let a = h.login("ada@example.com", PASSWORD).await.unwrap().tokens;
    let b = h.login("ada@example.com", PASSWORD).await.unwrap().tokens;

    let logout = LogoutUseCase::new(h.repo.clone());
    logout.execute(&a.refresh.token).await.unwrap();
    // Revoking again still finds the record
    logout.execute(&a.refresh.token).await.unwrap();
    assert!(matches!(
        logout.execute("never-issued").await,
        Err(AuthError::InvalidToken)
    ));

    assert!(matches!(
        h.refresh().execute(&a.refresh.token).await,
        Err(AuthError::RevokedToken)
    ));
    assert!(h.refresh().execute(&b.refresh.token).await.is_ok());
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;
    let mut sessions = Vec::new();
    for _ in 0..3 {
        sessions.push(h.login("ada@example.com", PASSWORD).await.unwrap().tokens);
    }

    let revoked = LogoutAllUseCase::new(h.repo.clone())
        .execute(&user.user_id)
        .await
        .unwrap();
    assert_eq!(revoked, 3);

    for tokens in sessions {
        assert!(matches!(
            h.refresh().execute(&tokens.refresh.token).await,
            Err(AuthError::RevokedToken)
        ));
    }

    // A fresh login still works afterwards
    assert!(h.login("ada@example.com", PASSWORD).await.is_ok());
    assert!(h.repo.find_by_email(&Email::new("ada@example.com").unwrap()).await.unwrap().is_some());
}

impl Harness {
    async fn login_during(&self, admin_write: InterleavedAdminWrite) -> AuthResult<LoginOutput> {
        LoginUseCase::new(
            Arc::new(admin_write),
            self.repo.clone(),
            self.codec.clone(),
            self.hasher.clone(),
        )
        .execute(LoginInput {
            email: "ada@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
    }

    fn reset_hash(&self) -> UserPassword {
        self.hasher
            .hash(&RawPassword::for_login("Harbor-Lantern-42".to_string()))
            .unwrap()
    }
}

#[tokio::test]
async fn test_deactivation_during_login_is_kept() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;

    let err = h
        .login_during(InterleavedAdminWrite {
            inner: h.repo.clone(),
            changes: deactivate(),
            new_password: Some(h.reset_hash()),
            strike: Strike::AfterRead,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert_eq!(stored.user_status, UserStatus::Inactive);
    assert!(stored.last_login_at.is_none());
    assert!(!h
        .hasher
        .verify(&RawPassword::for_login(PASSWORD.to_string()), &stored.password_hash));

    // The session saved by the interrupted login is already revoked
    assert_eq!(h.repo.token_count().await, 1);
    assert_eq!(h.repo.revoke_all_for_user(&user.user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_password_reset_during_login_fails_login() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;
    let reset = h.reset_hash();

    let err = h
        .login_during(InterleavedAdminWrite {
            inner: h.repo.clone(),
            changes: UserChanges::default(),
            new_password: Some(reset.clone()),
            strike: Strike::AfterRead,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert_eq!(stored.user_status, UserStatus::Active);
    assert_eq!(stored.password_hash, reset);
    assert_eq!(h.repo.revoke_all_for_user(&user.user_id).await.unwrap(), 0);

    let err = h.login("ada@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(h.login("ada@example.com", "Harbor-Lantern-42").await.is_ok());
}

#[tokio::test]
async fn test_deactivation_after_login_revokes_new_session() {
    let h = Harness::new();
    let user = h.register("ada@example.com").await;

    let out = h
        .login_during(InterleavedAdminWrite {
            inner: h.repo.clone(),
            changes: deactivate(),
            new_password: None,
            strike: Strike::AfterRecord,
        })
        .await
        .unwrap();

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert_eq!(stored.user_status, UserStatus::Inactive);
    assert!(matches!(
        h.refresh().execute(&out.tokens.refresh.token).await,
        Err(AuthError::RevokedToken)
    ));
}
