//! Application Layer
//!
//! Use cases for administering the user directory.

pub mod change_password;
pub mod create_user;
pub mod delete_user;
pub mod get_user;
pub mod list_users;
pub mod update_user;


pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use create_user::{CreateUserInput, CreateUserUseCase};
pub use delete_user::DeleteUserUseCase;
pub use get_user::GetUserUseCase;
pub use list_users::{ListUsersInput, ListUsersOutput, ListUsersUseCase};
pub use update_user::{UpdateUserInput, UpdateUserUseCase};
