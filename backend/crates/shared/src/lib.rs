//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary shared by
//! the auth and directory crates:
//! - Common error types and result aliases (RFC 7807 responses)
//! - Field-level validation errors
//! - Typed entity identifiers

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
