//! Value Object Module

pub mod email;
pub mod user_password;
pub mod user_role;
pub mod user_status;

pub use email::{Email, EmailError};
pub use kernel::id::UserId;
pub use user_password::{RawPassword, UserPassword};
pub use user_role::UserRole;
pub use user_status::UserStatus;
