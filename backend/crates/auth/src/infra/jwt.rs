//! JWT Token Codec
//!
//! HS256 tokens with a separate secret per [`TokenKind`]. Verification pins
//! the algorithm, checks the signature first and only then looks at expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::application::config::{AuthConfig, ConfigError};
use crate::domain::token::{Claims, IssuedToken, TokenError, TokenKind, TokenPair};
use crate::domain::value_object::UserRole;
use crate::error::{AuthError, AuthResult};

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(
        name: &'static str,
        secret: &[u8],
        ttl: std::time::Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::from_std(ttl).map_err(|_| ConfigError::TtlOutOfRange(name))?,
        })
    }
}

/// Issues and verifies signed tokens
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    issuer: String,
}

impl TokenCodec {
    /// Validates the configuration before taking its keys
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            access: KeyPair::new("access", &config.access_secret, config.access_token_ttl)?,
            refresh: KeyPair::new("refresh", &config.refresh_secret, config.refresh_token_ttl)?,
            issuer: config.issuer.clone(),
        })
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue(&self, subject: &str, role: UserRole, kind: TokenKind) -> AuthResult<IssuedToken> {
        self.issue_at(subject, role, kind, Utc::now())
    }

    /// Issue with an explicit issuance instant
    pub fn issue_at(
        &self,
        subject: &str,
        role: UserRole,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let keys = self.keys(kind);
        let expires_at = issued_at + keys.ttl;

        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(
            |e| AuthError::Internal(format!("Failed to sign {} token: {e}", kind.as_str())),
        )?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Access + refresh for the same subject and role, issued together
    pub fn issue_pair(&self, subject: &str, role: UserRole) -> AuthResult<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.issue_at(subject, role, TokenKind::Access, now)?,
            refresh: self.issue_at(subject, role, TokenKind::Refresh, now)?,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        self.verify_at(token, kind, Utc::now())
    }

    /// Verify against an explicit clock. Expired iff `now >= exp`.
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below with our own clock and no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let data = decode::<Claims>(token, &self.keys(kind).decoding, &validation).map_err(
            |e| match e.kind() {
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
