//! Domain Layer
//!
//! Contains entities, value objects, token vocabulary, and repository traits.

pub mod entity;
pub mod query;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{RefreshToken, User, UserChanges, UserSummary};
pub use query::{SortDirection, SortField, UserPage, UserQuery, UserSort};
pub use repository::{RefreshTokenRepository, UserRepository};
pub use token::{Claims, IssuedToken, TokenError, TokenKind, TokenPair};
