//! Directory Router
//!
//! Every route sits behind the bearer guard. Paths are absolute so the
//! router merges at the root.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::{CredentialHasher, TokenCodec, require_bearer};

use crate::config::DirectoryConfig;
use crate::presentation::handlers::{self, DirectoryAppState};

/// Create the Directory router for any repository implementation
pub fn directory_router<R>(
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
    config: DirectoryConfig,
) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let state = DirectoryAppState {
        repo,
        hasher,
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/users",
            get(handlers::list_users::<R>).post(handlers::create_user::<R>),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user::<R>)
                .put(handlers::update_user::<R>)
                .delete(handlers::delete_user::<R>),
        )
        .route(
            "/users/{id}/change-password",
            put(handlers::change_password::<R>),
        )
        .route_layer(middleware::from_fn_with_state(codec, require_bearer))
        .with_state(state)
}
