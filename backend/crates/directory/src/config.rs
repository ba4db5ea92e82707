//! Directory Configuration

use std::str::FromStr;

use auth::domain::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use thiserror::Error;

/// What `GET /users/{id}` answers for an id with no user behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingUserPolicy {
    /// 200 with an empty body
    #[default]
    EmptyOk,
    /// 404 problem response
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryConfigError {
    #[error("unknown missing-user policy `{0}` (expected `empty` or `not_found`)")]
    UnknownPolicy(String),

    #[error("page size bounds are invalid: default {default}, max {max}")]
    PageSize { default: u32, max: u32 },
}

impl FromStr for MissingUserPolicy {
    type Err = DirectoryConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" | "empty_ok" => Ok(Self::EmptyOk),
            "not_found" | "404" => Ok(Self::NotFound),
            other => Err(DirectoryConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub missing_user: MissingUserPolicy,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            missing_user: MissingUserPolicy::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<(), DirectoryConfigError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(DirectoryConfigError::PageSize {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}
