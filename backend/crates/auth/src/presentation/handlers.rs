//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    CredentialHasher, LoginInput, LoginUseCase, LogoutAllUseCase, LogoutUseCase, RefreshUseCase,
    RegisterInput, RegisterUseCase,
};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenCodec;
use crate::presentation::dto::{
    LoginRequest, LoginResponse, LogoutAllResponse, MessageResponse, RefreshRequest,
    RegisterRequest, RegisterResponse, TokenResponse, UserResponse,
};
use crate::presentation::extract::ValidatedJson;
use crate::presentation::guard::Identity;

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub hasher: Arc<CredentialHasher>,
}

impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            codec: self.codec.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.hasher.clone());

    let user = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            phone: req.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.codec.clone(),
        state.hasher.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        access_token: output.tokens.access.token,
        refresh_token: output.tokens.refresh.token,
        user: output.user,
    }))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let use_case = RefreshUseCase::new(state.repo.clone(), state.codec.clone());
    let tokens = use_case.execute(&req.refresh_token).await?;

    Ok(Json(TokenResponse {
        access_token: tokens.access.token,
        refresh_token: tokens.refresh.token,
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
///
/// Always 200, whatever the body holds.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Json<MessageResponse>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let token = body.map(|Json(req)| req.refresh_token).unwrap_or_default();

    if !token.is_empty() {
        let use_case = LogoutUseCase::new(state.repo.clone());
        match use_case.execute(&token).await {
            Ok(()) | Err(AuthError::InvalidToken) => {}
            Err(e) => tracing::error!(error = %e, "Logout failed to revoke token"),
        }
    }

    Json(MessageResponse::new("Logged out successfully"))
}

/// POST /auth/logout-all
pub async fn logout_all<R>(
    State(state): State<AuthAppState<R>>,
    identity: Identity,
) -> AuthResult<Json<LogoutAllResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let user_id = identity.user_id()?;
    let revoked = LogoutAllUseCase::new(state.repo.clone())
        .execute(&user_id)
        .await?;

    Ok(Json(LogoutAllResponse {
        message: "Logged out from all sessions".to_string(),
        revoked,
    }))
}
