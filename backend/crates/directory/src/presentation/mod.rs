//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::DirectoryAppState;
pub use router::directory_router;
