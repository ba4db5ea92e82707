//! Router assembly and background tasks

use std::sync::Arc;

use auth::domain::repository::{RefreshTokenRepository, UserRepository};
use auth::{CredentialHasher, TokenCodec, auth_router};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use chrono::Utc;
use directory::{DirectoryConfig, directory_router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub const WELCOME: &str = "Welcome to the User Service!";

/// GET /health
async fn health() -> &'static str {
    WELCOME
}

/// CORS for the configured origins. `*` allows any origin without credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(allowed).allow_credentials(true)
}

/// Full application router over any repository implementation
pub fn build_router<R>(
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    hasher: Arc<CredentialHasher>,
    directory: DirectoryConfig,
    origins: &[String],
) -> Router
where
    R: UserRepository + RefreshTokenRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .nest(
            "/auth",
            auth_router(repo.clone(), codec.clone(), hasher.clone()),
        )
        .merge(directory_router(repo, codec, hasher, directory))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
}

/// Delete expired refresh tokens once. Failures are logged, not fatal.
pub async fn purge_once<R>(repo: &R)
where
    R: RefreshTokenRepository,
{
    match repo.purge_expired(Utc::now()).await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Refresh token purge completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Refresh token purge failed, continuing anyway");
        }
    }
}

/// Purge on a fixed interval for the life of the process
pub fn spawn_purge_task<R>(repo: Arc<R>, every: std::time::Duration) -> tokio::task::JoinHandle<()>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick fires immediately and startup already purged
        ticker.tick().await;
        loop {
            ticker.tick().await;
            purge_once(repo.as_ref()).await;
        }
    })
}
