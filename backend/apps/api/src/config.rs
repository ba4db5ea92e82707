//! Server configuration from the environment
//!
//! Read once at startup. Business crates receive typed config structs and
//! never touch the environment themselves.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use directory::{DirectoryConfig, MissingUserPolicy};

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    /// `*` allows any origin
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub directory: DirectoryConfig,
}

/// Parse `name` when present, otherwise `default`
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> anyhow::Result<Duration> {
    parse_or(lookup, name, default).map(Duration::from_secs)
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Self::build(&lookup, cfg!(debug_assertions))
    }

    /// `allow_dev_secrets` lets debug builds run without configured secrets
    fn build(
        lookup: &impl Fn(&str) -> Option<String>,
        allow_dev_secrets: bool,
    ) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut auth = match (lookup("ACCESS_SECRET_KEY"), lookup("REFRESH_SECRET_KEY")) {
            (Some(access), Some(refresh)) => AuthConfig {
                access_secret: access.into_bytes(),
                refresh_secret: refresh.into_bytes(),
                ..AuthConfig::default()
            },
            _ if allow_dev_secrets => {
                tracing::warn!("Signing secrets not set, using random development secrets");
                AuthConfig::development()
            }
            _ => bail!("ACCESS_SECRET_KEY and REFRESH_SECRET_KEY must be set"),
        };

        auth.access_token_ttl = secs(lookup, "ACCESS_TOKEN_TTL_SECS", 3600)?;
        auth.refresh_token_ttl = secs(lookup, "REFRESH_TOKEN_TTL_SECS", 86400)?;
        auth.purge_interval = secs(lookup, "TOKEN_PURGE_INTERVAL_SECS", 3600)?;
        if let Some(issuer) = lookup("TOKEN_ISSUER").filter(|s| !s.trim().is_empty()) {
            auth.issuer = issuer;
        }
        auth.password_pepper = lookup("PASSWORD_PEPPER")
            .filter(|s| !s.is_empty())
            .map(String::into_bytes);
        auth.validate().context("invalid auth configuration")?;
        if auth.purge_interval.is_zero() {
            bail!("TOKEN_PURGE_INTERVAL_SECS must be greater than zero");
        }

        let directory = DirectoryConfig {
            missing_user: parse_or(lookup, "MISSING_USER_POLICY", MissingUserPolicy::default())?,
            ..DirectoryConfig::default()
        };
        directory.validate().context("invalid directory configuration")?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url,
            max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parse_or(lookup, "PORT", DEFAULT_PORT)?,
            frontend_origins,
            auth,
            directory,
        })
    }
}
