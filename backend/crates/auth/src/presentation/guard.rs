//! Access Guard
//!
//! Bearer-token authentication middleware plus the role and ownership
//! checks handlers run against the resulting [`Identity`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::token::TokenKind;
use crate::domain::value_object::{UserId, UserRole};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenCodec;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub role: UserRole,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Subject as a user id. Every token we issue carries one.
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.subject_id
            .parse()
            .map_err(|_| AuthError::Unauthenticated)
    }

    /// Whether the requested id names this caller
    fn owns(&self, requested: &str) -> bool {
        if self.subject_id == requested {
            return true;
        }
        match (self.subject_id.parse::<UserId>(), requested.parse::<UserId>()) {
            (Ok(own), Ok(other)) => own == other,
            _ => false,
        }
    }

    /// Role check, then ownership check when the policy is owner-scoped
    pub fn authorize(&self, policy: &AccessPolicy, requested: Option<&str>) -> AuthResult<()> {
        if !policy.roles.contains(&self.role) {
            tracing::info!(subject = %self.subject_id, role = %self.role, "Role not allowed");
            return Err(AuthError::Forbidden);
        }

        if !policy.owner_scoped || self.is_admin() {
            return Ok(());
        }

        match requested {
            None => Ok(()),
            Some(id) if self.owns(id) => Ok(()),
            Some(id) => {
                tracing::info!(subject = %self.subject_id, requested = %id, "Ownership check failed");
                Err(AuthError::Forbidden)
            }
        }
    }
}

/// Which roles may call an endpoint, and whether non-admins are limited to
/// their own record
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    pub roles: &'static [UserRole],
    pub owner_scoped: bool,
}

impl AccessPolicy {
    pub const AUTHENTICATED: Self = Self {
        roles: &[UserRole::User, UserRole::Admin],
        owner_scoped: false,
    };

    pub const OWNER_OR_ADMIN: Self = Self {
        roles: &[UserRole::User, UserRole::Admin],
        owner_scoped: true,
    };

    pub const ADMIN_ONLY: Self = Self {
        roles: &[UserRole::Admin],
        owner_scoped: false,
    };
}

/// Token from `Authorization: Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that requires a valid access token
pub async fn require_bearer(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingBearer)?;

    let claims = codec.verify(token, TokenKind::Access).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        AuthError::Unauthenticated
    })?;

    req.extensions_mut()
        .insert(Identity::new(claims.sub, claims.role));

    Ok(next.run(req).await)
}
