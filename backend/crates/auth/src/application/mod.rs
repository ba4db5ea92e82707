//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod credentials;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod validation;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::AuthConfig;
pub use credentials::CredentialHasher;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::{LogoutAllUseCase, LogoutUseCase};
pub use refresh::RefreshUseCase;
pub use register::{NewUser, RegisterInput, RegisterUseCase};
pub use validation::Validator;
