//! Auth Router

use std::sync::Arc;

use axum::{Router, middleware, routing::post};

use crate::application::CredentialHasher;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::infra::jwt::TokenCodec;
use crate::presentation::guard::require_bearer;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any repository implementation
pub fn auth_router<R>(
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo,
        codec: codec.clone(),
        hasher,
    };

    let protected = Router::new()
        .route("/logout-all", post(handlers::logout_all::<R>))
        .route_layer(middleware::from_fn_with_state(codec, require_bearer));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .merge(protected)
        .with_state(state)
}
