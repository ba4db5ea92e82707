//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, the access guard and the router.

pub mod dto;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod router;

pub use extract::{ValidatedJson, ValidatedQuery};
pub use guard::{AccessPolicy, Identity, bearer_token, require_bearer};
pub use handlers::AuthAppState;
pub use router::auth_router;
