//! User Directory
//!
//! Administration of user records behind the bearer guard from `auth`:
//! paged listing, lookup, creation, profile updates, deletion and password
//! changes. Shares the user store and credential hasher with `auth`.

pub mod application;
pub mod config;
pub mod error;
pub mod presentation;


pub use config::{DirectoryConfig, DirectoryConfigError, MissingUserPolicy};
pub use error::{DirectoryError, DirectoryResult};
pub use presentation::router::directory_router;
