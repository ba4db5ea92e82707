//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token claims, repository traits
//! - `application/` - Use cases (login, register, refresh, logout)
//! - `infra/` - JWT codec, PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, access guard, router
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - HS256 access tokens (1h) and refresh tokens (24h) with separate secrets
//! - Refresh tokens are single-use and stored only as SHA-256 digests
//! - Role-based access (User, Admin) with owner scoping for user records

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError};
pub use application::credentials::CredentialHasher;
pub use error::{AuthError, AuthResult};
pub use infra::jwt::TokenCodec;
pub use infra::memory::InMemoryAuthRepository;
pub use infra::postgres::PgAuthRepository;
pub use presentation::extract::{ValidatedJson, ValidatedQuery};
pub use presentation::guard::{AccessPolicy, Identity, require_bearer};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
