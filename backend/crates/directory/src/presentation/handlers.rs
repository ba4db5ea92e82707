//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::models::{MessageResponse, UserResponse};
use auth::{CredentialHasher, Identity, ValidatedJson, ValidatedQuery};

use crate::application::{
    ChangePasswordInput, ChangePasswordUseCase, CreateUserInput, CreateUserUseCase,
    DeleteUserUseCase, GetUserUseCase, ListUsersInput, ListUsersUseCase, UpdateUserInput,
    UpdateUserUseCase,
};
use crate::config::{DirectoryConfig, MissingUserPolicy};
use crate::error::{DirectoryError, DirectoryResult};
use crate::presentation::dto::{
    ChangePasswordRequest, CreateUserRequest, ListUsersQuery, UpdateUserRequest, UserPageResponse,
};

/// Shared state for directory handlers
pub struct DirectoryAppState<R>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub hasher: Arc<CredentialHasher>,
    pub config: Arc<DirectoryConfig>,
}

impl<R> Clone for DirectoryAppState<R>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            hasher: self.hasher.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /users
pub async fn list_users<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> DirectoryResult<Json<UserPageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let output = ListUsersUseCase::new(state.repo.clone(), state.config.clone())
        .execute(
            &identity,
            ListUsersInput {
                page: query.page,
                page_size: query.page_size,
                search: query.search,
                sort: query.sort,
                role: query.role,
                status: query.status,
                id: query.id,
            },
        )
        .await?;

    Ok(Json(UserPageResponse::from(output)))
}

/// POST /users
pub async fn create_user<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> DirectoryResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let user = CreateUserUseCase::new(state.repo.clone(), state.hasher.clone())
        .execute(
            &identity,
            CreateUserInput {
                email: req.email,
                password: req.password,
                full_name: req.full_name,
                phone: req.phone,
                role: req.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /users/{id}
pub async fn get_user<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
) -> DirectoryResult<Response>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let user = GetUserUseCase::new(state.repo.clone())
        .execute(&identity, &id)
        .await?;

    match (user, state.config.missing_user) {
        (Some(user), _) => Ok(Json(UserResponse::from(&user)).into_response()),
        (None, MissingUserPolicy::EmptyOk) => {
            tracing::info!(requested = %id, "User not found, answering empty");
            Ok(StatusCode::OK.into_response())
        }
        (None, MissingUserPolicy::NotFound) => Err(DirectoryError::UserNotFound),
    }
}

/// PUT /users/{id}
pub async fn update_user<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> DirectoryResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let user = UpdateUserUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(
            &identity,
            &id,
            UpdateUserInput {
                full_name: req.full_name,
                phone: req.phone,
                avatar: req.avatar,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
) -> DirectoryResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    DeleteUserUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(&identity, &id)
        .await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// PUT /users/{id}/change-password
pub async fn change_password<R>(
    State(state): State<DirectoryAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> DirectoryResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    ChangePasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.hasher.clone())
        .execute(
            &identity,
            &id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
