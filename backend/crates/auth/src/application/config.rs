//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared behind an `Arc`; nothing below this layer reads the environment.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub use platform::password::HashingPolicy;

/// Minimum accepted length of a signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} signing secret is empty")]
    EmptySecret(&'static str),

    #[error("{0} signing secret must be at least {MIN_SECRET_LENGTH} bytes")]
    ShortSecret(&'static str),

    #[error("access and refresh signing secrets must differ")]
    SharedSecret,

    #[error("{0} token lifetime must be greater than zero")]
    ZeroTtl(&'static str),

    #[error("{0} token lifetime is out of range")]
    TtlOutOfRange(&'static str),
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_secret: Vec<u8>,
    /// HMAC secret for refresh tokens
    pub refresh_secret: Vec<u8>,
    /// Access token lifetime (1 hour)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (24 hours)
    pub refresh_token_ttl: Duration,
    /// `iss` claim written and required on every token
    pub issuer: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost for new hashes
    pub hashing: HashingPolicy,
    /// How often expired refresh tokens are purged
    pub purge_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: Vec::new(),
            refresh_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(3600),   // 1 hour
            refresh_token_ttl: Duration::from_secs(86400), // 24 hours
            issuer: "user-service".to_string(),
            password_pepper: None,
            hashing: HashingPolicy::default(),
            purge_interval: Duration::from_secs(3600),
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets
    pub fn with_random_secrets() -> Self {
        Self {
            access_secret: platform::crypto::random_bytes(MIN_SECRET_LENGTH),
            refresh_secret: platform::crypto::random_bytes(MIN_SECRET_LENGTH),
            ..Default::default()
        }
    }

    /// Create config for development. Tokens do not survive a restart.
    pub fn development() -> Self {
        Self::with_random_secrets()
    }

    /// Random secrets and the cheapest Argon2 parameters, for tests
    pub fn for_tests() -> Self {
        Self {
            hashing: HashingPolicy::insecure_fast(),
            ..Self::with_random_secrets()
        }
    }

    /// Reject configurations that would make tokens forgeable or useless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secret) in [
            ("access", &self.access_secret),
            ("refresh", &self.refresh_secret),
        ] {
            if secret.is_empty() {
                return Err(ConfigError::EmptySecret(name));
            }
            if secret.len() < MIN_SECRET_LENGTH {
                return Err(ConfigError::ShortSecret(name));
            }
        }

        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        if self.access_token_ttl.is_zero() {
            return Err(ConfigError::ZeroTtl("access"));
        }
        if self.refresh_token_ttl.is_zero() {
            return Err(ConfigError::ZeroTtl("refresh"));
        }

        Ok(())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("issuer", &self.issuer)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("hashing", &self.hashing)
            .field("purge_interval", &self.purge_interval)
            .finish()
    }
}
