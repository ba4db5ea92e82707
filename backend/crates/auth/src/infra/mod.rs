//! Infrastructure Layer
//!
//! Token signing and repository implementations.

pub mod jwt;
pub mod memory;
pub mod postgres;

pub use jwt::TokenCodec;
pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
